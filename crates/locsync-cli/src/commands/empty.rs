use crate::cli::GlobalArgs;
use crate::support::{
    Context, EXIT_FATAL, exit_on_failures, load_context_or_exit, print_failures, print_json,
    write_report,
};
use locsync_core::{KeyPath, audit_empty};
use locsync_store::{Applied, BatchReport, CatalogStore, EmptyRow, Persist, empty_csv};
use serde_json::json;
use std::path::PathBuf;

const KIND: &str = "locsync.empty.v1";

pub struct Args {
    pub export: Option<String>,
    pub json: bool,
}

pub struct EmptyOutcome {
    pub report: BatchReport<Vec<KeyPath>>,
    pub rows: Vec<EmptyRow>,
    pub export_path: PathBuf,
}

/// Audits every listed catalog, the reference included.
pub fn execute(ctx: &Context, export: Option<&str>) -> Result<EmptyOutcome, String> {
    let batch = ctx.batch();
    let names = ctx.store.list().map_err(|e| e.to_string())?;
    let report = batch.run(&names, &Persist::Discard, |catalog| {
        Applied::keep(audit_empty(catalog.root()))
    });

    let rows: Vec<EmptyRow> = report
        .runs
        .iter()
        .flat_map(|run| {
            run.outcome.iter().map(|path| EmptyRow {
                locale: run.locale.clone(),
                key_path: path.clone(),
            })
        })
        .collect();

    let export_path = ctx.report_path(export, &ctx.config.reports.empty_csv);
    write_report(&export_path, &empty_csv(&rows))?;

    Ok(EmptyOutcome {
        report,
        rows,
        export_path,
    })
}

pub fn run(global: GlobalArgs, args: Args) {
    let ctx = load_context_or_exit(&global);
    let outcome = execute(&ctx, args.export.as_deref()).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    });

    if args.json {
        print_json(
            KIND,
            json!({
                "rows": outcome.rows,
                "failures": outcome.report.failures,
                "export": outcome.export_path.display().to_string(),
            }),
        );
    } else {
        for run in &outcome.report.runs {
            println!("[empty] {}: {} empty strings", run.name, run.outcome.len());
        }
        print_failures("empty", &outcome.report.failures);
        println!("wrote {}", outcome.export_path.display());
    }

    exit_on_failures(&outcome.report);
}
