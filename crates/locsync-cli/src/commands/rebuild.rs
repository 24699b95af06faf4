use crate::cli::GlobalArgs;
use crate::support::{
    Context, EXIT_FATAL, exit_on_failures, load_context_or_exit, load_reference, print_failures,
    print_json, write_report,
};
use locsync_core::rebuild_with_outcome;
use locsync_store::{Applied, BatchReport, Persist, RebuildSummary};
use serde_json::json;
use std::path::PathBuf;

const KIND: &str = "locsync.rebuild.v1";
pub const SYNCED_SUFFIX: &str = "synced";

pub struct Args {
    pub in_place: bool,
    pub dry_run: bool,
    pub json: bool,
}

pub struct RebuildRun {
    /// Per catalog: whether the rebuilt tree differs from the input.
    pub report: BatchReport<bool>,
    pub summary: RebuildSummary,
    pub summary_path: Option<PathBuf>,
}

pub fn execute(ctx: &Context, in_place: bool, dry_run: bool) -> Result<RebuildRun, String> {
    let batch = ctx.batch();
    let reference = load_reference(&batch)?;
    let targets = batch.targets().map_err(|e| e.to_string())?;
    let persist = match (dry_run, in_place) {
        (true, _) => Persist::Discard,
        (false, true) => Persist::InPlace,
        (false, false) => Persist::Sibling(SYNCED_SUFFIX.to_string()),
    };

    let report = batch.run(&targets, &persist, |catalog| {
        let outcome = rebuild_with_outcome(reference.root(), catalog.root());
        // Sibling output is produced for every target; in-place only rewrites
        // what changed.
        if outcome.changed || !in_place {
            Applied::rewrite(outcome.changed, outcome.tree)
        } else {
            Applied::keep(false)
        }
    });

    let summary = RebuildSummary::from_report(&report);
    let mut summary_path = None;
    if !dry_run {
        let path = ctx.config.reports.path(&ctx.config.reports.sync_summary);
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("failed to render rebuild summary: {e}"))?;
        write_report(&path, &text)?;
        summary_path = Some(path);
    }

    Ok(RebuildRun {
        report,
        summary,
        summary_path,
    })
}

pub fn run(global: GlobalArgs, args: Args) {
    let ctx = load_context_or_exit(&global);
    let outcome = execute(&ctx, args.in_place, args.dry_run).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    });

    if args.json {
        print_json(
            KIND,
            json!({
                "dryRun": args.dry_run,
                "inPlace": args.in_place,
                "produced": outcome.summary.produced,
                "invalid": outcome.summary.invalid,
                "summary": outcome.summary_path.as_ref().map(|p| p.display().to_string()),
            }),
        );
    } else {
        for run in &outcome.report.runs {
            let state = if run.outcome { "rebuilt" } else { "already in sync" };
            match &run.written {
                Some(written) => println!("[rebuild] {}: {state} -> {written}", run.name),
                None => println!("[rebuild] {}: {state}", run.name),
            }
        }
        print_failures("rebuild", &outcome.report.failures);
        if let Some(path) = &outcome.summary_path {
            println!("summary: {}", path.display());
        }
    }

    exit_on_failures(&outcome.report);
}
