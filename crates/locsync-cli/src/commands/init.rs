use crate::cli::GlobalArgs;
use crate::support::{Context, EXIT_FATAL, load_context_or_exit, load_reference, print_json};
use locsync_core::{Catalog, skeleton};
use locsync_store::{CatalogStore, render};
use serde_json::json;

const KIND: &str = "locsync.init.v1";

#[derive(Debug, Clone)]
pub struct InitOutcome {
    pub name: String,
    pub keys: usize,
}

fn valid_locale(locale: &str) -> bool {
    !locale.is_empty()
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn execute(ctx: &Context, locale: &str) -> Result<InitOutcome, String> {
    if !valid_locale(locale) {
        return Err(format!("invalid locale identifier: {locale:?}"));
    }
    let name = format!("{locale}.json");
    if ctx.store.exists(&name) {
        return Err(format!("catalog already exists: {name}"));
    }

    let batch = ctx.batch();
    let reference = load_reference(&batch)?;
    let catalog = Catalog::new(locale, skeleton(reference.root()));
    let keys = catalog.leaf_count();
    let text = render(catalog.root()).map_err(|e| e.to_string())?;
    ctx.store
        .write(&name, text.as_bytes())
        .map_err(|e| e.to_string())?;
    Ok(InitOutcome { name, keys })
}

pub fn run(global: GlobalArgs, locale: String, json_output: bool) {
    let ctx = load_context_or_exit(&global);
    let outcome = execute(&ctx, &locale).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    });

    if json_output {
        print_json(
            KIND,
            json!({
                "locale": locale,
                "catalog": outcome.name,
                "keys": outcome.keys,
            }),
        );
    } else {
        println!("locsync init {locale}");
        println!();
        println!("  catalog: {}", ctx.store.root().join(&outcome.name).display());
        println!("  blank keys: {}", outcome.keys);
    }
}
