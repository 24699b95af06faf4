use crate::cli::GlobalArgs;
use crate::support::{Context, EXIT_FATAL, EXIT_PARTIAL, load_context_or_exit, print_json};
use locsync_core::{SelfRefReport, audit_self_refs};
use locsync_store::{Applied, CatalogFailure, CatalogRun, FailureStage, Persist};
use serde_json::json;

const KIND: &str = "locsync.selfrefs.v1";

pub struct Args {
    pub target: Option<String>,
    pub dry_run: bool,
    pub json: bool,
}

pub fn execute(
    ctx: &Context,
    target: Option<&str>,
    dry_run: bool,
) -> Result<CatalogRun<SelfRefReport>, CatalogFailure> {
    let name = target.unwrap_or(&ctx.config.reference);
    let persist = if dry_run {
        Persist::Discard
    } else {
        Persist::InPlace
    };
    ctx.batch().run_single(name, &persist, |mut catalog| {
        let report = audit_self_refs(catalog.root_mut());
        if report.changed() {
            Applied::rewrite(report, catalog.into_root())
        } else {
            Applied::keep(report)
        }
    })
}

pub fn run(global: GlobalArgs, args: Args) {
    let ctx = load_context_or_exit(&global);
    let run = execute(&ctx, args.target.as_deref(), args.dry_run).unwrap_or_else(|failure| {
        eprintln!("error: {}: {}", failure.name, failure.message);
        let code = match failure.stage {
            FailureStage::Parse => EXIT_PARTIAL,
            _ => EXIT_FATAL,
        };
        std::process::exit(code);
    });

    if args.json {
        print_json(KIND, json!({"dryRun": args.dry_run, "run": run}));
    } else {
        println!(
            "[selfrefs] {}: replaced {} self-references",
            run.name,
            run.outcome.repaired.len()
        );
        for repair in &run.outcome.repaired {
            println!("  {} -> {:?}", repair.path, repair.replacement);
        }
    }
}
