use crate::cli::GlobalArgs;
use crate::support::{
    Context, EXIT_FATAL, EXIT_PARTIAL, load_context_or_exit, load_reference, print_json,
    write_report,
};
use locsync_core::diff;
use locsync_store::{Applied, DiffRow, Persist, diff_rows};
use serde_json::json;
use std::path::PathBuf;

const KIND: &str = "locsync.diff.v1";

pub struct Args {
    pub report: Option<String>,
    pub allow_drift: bool,
    pub json: bool,
}

pub struct DiffOutcome {
    pub rows: Vec<DiffRow>,
    pub report_path: PathBuf,
    pub failed: bool,
}

impl DiffOutcome {
    pub fn drifted(&self) -> bool {
        self.rows.iter().any(DiffRow::has_drift)
    }
}

pub fn execute(ctx: &Context, report: Option<&str>) -> Result<DiffOutcome, String> {
    let batch = ctx.batch();
    let reference = load_reference(&batch)?;
    let targets = batch.targets().map_err(|e| e.to_string())?;

    let batch_report = batch.run(&targets, &Persist::Discard, |catalog| {
        Applied::keep(diff(reference.root(), catalog.root()))
    });
    let rows = diff_rows(&batch_report);

    let report_path = ctx.report_path(report, &ctx.config.reports.diff_json);
    let text = serde_json::to_string_pretty(&rows)
        .map_err(|e| format!("failed to render diff report: {e}"))?;
    write_report(&report_path, &text)?;

    Ok(DiffOutcome {
        rows,
        report_path,
        failed: !batch_report.succeeded(),
    })
}

pub fn run(global: GlobalArgs, args: Args) {
    let ctx = load_context_or_exit(&global);
    let outcome = execute(&ctx, args.report.as_deref()).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    });

    if args.json {
        print_json(
            KIND,
            json!({
                "reference": ctx.config.reference,
                "report": outcome.report_path.display().to_string(),
                "drift": outcome.drifted(),
                "rows": outcome.rows,
            }),
        );
    } else {
        for row in &outcome.rows {
            match row {
                DiffRow::Compared {
                    file,
                    missing_count,
                    extra_count,
                    missing_keys,
                    extra_keys,
                } => {
                    let status = if missing_count + extra_count == 0 { "OK" } else { "DRIFT" };
                    println!("[diff] {status} {file}: {missing_count} missing, {extra_count} extra");
                    for key in missing_keys {
                        println!("  - missing {key}");
                    }
                    for key in extra_keys {
                        println!("  + extra {key}");
                    }
                }
                DiffRow::Failed { file, error } => println!("[diff] SKIP {file}: {error}"),
            }
        }
        println!("report: {}", outcome.report_path.display());
    }

    if outcome.failed || (outcome.drifted() && !args.allow_drift) {
        std::process::exit(EXIT_PARTIAL);
    }
}
