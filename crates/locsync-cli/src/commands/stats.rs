use crate::cli::GlobalArgs;
use crate::support::{
    Context, EXIT_FATAL, exit_on_failures, load_context_or_exit, load_reference, print_failures,
    print_json,
};
use locsync_core::{CatalogStats, stats};
use locsync_store::{Applied, BatchReport, CatalogStore, Persist};
use serde_json::json;

const KIND: &str = "locsync.stats.v1";

pub fn execute(ctx: &Context) -> Result<BatchReport<CatalogStats>, String> {
    let batch = ctx.batch();
    let reference = load_reference(&batch)?;
    let names = ctx.store.list().map_err(|e| e.to_string())?;
    Ok(batch.run(&names, &Persist::Discard, |catalog| {
        Applied::keep(stats(reference.root(), catalog.root()))
    }))
}

pub fn run(global: GlobalArgs, json_output: bool) {
    let ctx = load_context_or_exit(&global);
    let report = execute(&ctx).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    });

    if json_output {
        let catalogs: Vec<_> = report
            .runs
            .iter()
            .map(|run| {
                json!({
                    "name": run.name,
                    "locale": run.locale,
                    "totalKeys": run.outcome.total_keys,
                    "presentKeys": run.outcome.present_keys,
                    "emptyKeys": run.outcome.empty_keys,
                    "missingKeys": run.outcome.missing_keys(),
                    "coverage": run.outcome.coverage(),
                })
            })
            .collect();
        print_json(
            KIND,
            json!({
                "reference": report.reference,
                "catalogs": catalogs,
                "failures": report.failures,
            }),
        );
    } else {
        for run in &report.runs {
            let s = &run.outcome;
            println!(
                "{}: keys={}, present={}, empty={}, coverage={:.1}%",
                run.name,
                s.total_keys,
                s.present_keys,
                s.empty_keys,
                s.coverage() * 100.0
            );
        }
        print_failures("stats", &report.failures);
    }

    exit_on_failures(&report);
}
