use crate::cli::GlobalArgs;
use crate::support::{
    Context, EXIT_FATAL, exit_on_failures, load_context_or_exit, load_reference, print_failures,
    print_json, write_report,
};
use locsync_core::{FillReport, fill};
use locsync_store::{Applied, BatchReport, Persist, TranslationRow, translation_csv};
use serde_json::json;
use std::path::PathBuf;

const KIND: &str = "locsync.fill.v1";

pub struct Args {
    pub export: Option<String>,
    pub dry_run: bool,
    pub json: bool,
}

pub struct FillOutcome {
    pub reference_locale: String,
    pub report: BatchReport<FillReport>,
    pub rows: Vec<TranslationRow>,
    /// Translator CSV, when one was written.
    pub export_path: Option<PathBuf>,
}

pub fn execute(ctx: &Context, export: Option<&str>, dry_run: bool) -> Result<FillOutcome, String> {
    let batch = ctx.batch();
    let reference = load_reference(&batch)?;
    let targets = batch.targets().map_err(|e| e.to_string())?;
    let persist = if dry_run {
        Persist::Discard
    } else {
        Persist::InPlace
    };

    let report = batch.run(&targets, &persist, |mut catalog| {
        let outcome = fill(reference.root(), catalog.root_mut());
        if outcome.changed() {
            Applied::rewrite(outcome, catalog.into_root())
        } else {
            Applied::keep(outcome)
        }
    });

    let rows: Vec<TranslationRow> = report
        .runs
        .iter()
        .flat_map(|run| {
            run.outcome
                .inserted
                .iter()
                .map(|insertion| TranslationRow::from_insertion(&run.locale, insertion))
        })
        .collect();

    let mut export_path = None;
    if !dry_run && !rows.is_empty() {
        let path = ctx.report_path(export, &ctx.config.reports.missing_csv);
        write_report(&path, &translation_csv(reference.locale(), &rows))?;
        export_path = Some(path);
    }

    Ok(FillOutcome {
        reference_locale: reference.locale().to_string(),
        report,
        rows,
        export_path,
    })
}

pub fn run(global: GlobalArgs, args: Args) {
    let ctx = load_context_or_exit(&global);
    let outcome = execute(&ctx, args.export.as_deref(), args.dry_run).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    });

    if args.json {
        print_json(
            KIND,
            json!({
                "dryRun": args.dry_run,
                "referenceLocale": outcome.reference_locale,
                "report": outcome.report,
                "rows": outcome.rows,
                "export": outcome.export_path.as_ref().map(|p| p.display().to_string()),
            }),
        );
    } else {
        for run in &outcome.report.runs {
            if run.outcome.changed() {
                println!(
                    "[fill] {}: added {} missing keys",
                    run.name,
                    run.outcome.inserted.len()
                );
            } else {
                println!("[fill] {}: up to date", run.name);
            }
        }
        print_failures("fill", &outcome.report.failures);
        match &outcome.export_path {
            Some(path) => println!("translator CSV: {}", path.display()),
            None if outcome.rows.is_empty() => println!("no missing keys; CSV not created"),
            None => println!("dry run: {} rows not exported", outcome.rows.len()),
        }
    }

    exit_on_failures(&outcome.report);
}
