use crate::cli::GlobalArgs;
use crate::config::{SeedConfig, SeedEntry};
use crate::support::{
    Context, EXIT_FATAL, exit_on_failures, load_context_or_exit, print_failures, print_json,
};
use locsync_core::{KeyPath, seed_value};
use locsync_store::{Applied, BatchReport, CatalogStore, Persist};
use serde_json::{Value, json};

const KIND: &str = "locsync.seed.v1";

/// Seed every configured entry into every listed catalog. Returns, per
/// catalog, the key paths that were written.
pub fn execute(ctx: &Context, dry_run: bool) -> Result<BatchReport<Vec<KeyPath>>, String> {
    let seed: &SeedConfig = &ctx.config.seed;
    if seed.entries.is_empty() {
        return Err("no [[seed.entries]] configured".to_string());
    }
    let entries: Vec<(KeyPath, &SeedEntry)> = seed
        .entries
        .iter()
        .map(|entry| (KeyPath::parse(&entry.key), entry))
        .collect();

    let names = ctx.store.list().map_err(|e| e.to_string())?;
    let persist = if dry_run {
        Persist::Discard
    } else {
        Persist::InPlace
    };
    Ok(ctx.batch().run(&names, &persist, |mut catalog| {
        let locale = catalog.locale().to_string();
        let mut written = Vec::new();
        for (path, entry) in &entries {
            let Some(value) = entry.value_for(&locale, &seed.fallback_locale) else {
                continue;
            };
            if seed_value(catalog.root_mut(), path, &Value::String(value.to_string())) {
                written.push(path.clone());
            }
        }
        if written.is_empty() {
            Applied::keep(written)
        } else {
            Applied::rewrite(written, catalog.into_root())
        }
    }))
}

pub fn run(global: GlobalArgs, dry_run: bool, json_output: bool) {
    let ctx = load_context_or_exit(&global);
    let report = execute(&ctx, dry_run).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    });

    if json_output {
        print_json(KIND, json!({"dryRun": dry_run, "report": report}));
    } else {
        for run in &report.runs {
            if run.outcome.is_empty() {
                println!("[seed] {}: nothing to seed", run.name);
            } else {
                println!("[seed] {}: seeded {} keys", run.name, run.outcome.len());
            }
        }
        print_failures("seed", &report.failures);
    }

    exit_on_failures(&report);
}
