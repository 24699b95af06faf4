use crate::cli::GlobalArgs;
use crate::support::{
    Context, EXIT_FATAL, exit_on_failures, load_context_or_exit, load_reference, print_failures,
    print_json, write_report,
};
use locsync_core::{Insertion, pending};
use locsync_store::{Applied, BatchReport, Persist, TranslationRow, translation_csv};
use serde_json::json;
use std::path::PathBuf;

const KIND: &str = "locsync.pending.v1";

pub struct Args {
    pub export: Option<String>,
    pub json: bool,
}

pub struct PendingOutcome {
    pub report: BatchReport<Vec<Insertion>>,
    pub rows: Vec<TranslationRow>,
    pub export_path: Option<PathBuf>,
}

pub fn execute(ctx: &Context, export: Option<&str>) -> Result<PendingOutcome, String> {
    let batch = ctx.batch();
    let reference = load_reference(&batch)?;
    let targets = batch.targets().map_err(|e| e.to_string())?;
    let report = batch.run(&targets, &Persist::Discard, |catalog| {
        Applied::keep(pending(reference.root(), catalog.root()))
    });

    let rows: Vec<TranslationRow> = report
        .runs
        .iter()
        .flat_map(|run| {
            run.outcome
                .iter()
                .map(|item| TranslationRow::from_insertion(&run.locale, item))
        })
        .collect();

    let mut export_path = None;
    if !rows.is_empty() {
        let path = ctx.report_path(export, &ctx.config.reports.pending_csv);
        write_report(&path, &translation_csv(reference.locale(), &rows))?;
        export_path = Some(path);
    }

    Ok(PendingOutcome {
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
                "export": outcome.export_path.as_ref().map(|p| p.display().to_string()),
            }),
        );
    } else {
        for run in &outcome.report.runs {
            println!("[pending] {}: {} blank translations", run.name, run.outcome.len());
        }
        print_failures("pending", &outcome.report.failures);
        if let Some(path) = &outcome.export_path {
            println!("worklist: {}", path.display());
        }
    }

    exit_on_failures(&outcome.report);
}
