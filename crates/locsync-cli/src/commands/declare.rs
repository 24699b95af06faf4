use crate::cli::GlobalArgs;
use crate::support::{Context, EXIT_FATAL, load_context_or_exit, print_json};
use locsync_core::{KeyPath, declare};
use locsync_store::{Applied, CatalogRun, Persist};
use regex::Regex;
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::fs;
use std::sync::OnceLock;

const KIND: &str = "locsync.declare.v1";

pub struct Args {
    pub keys_file: String,
    pub value: String,
    pub dry_run: bool,
    pub json: bool,
}

fn quote_trim_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^'+|'+$").expect("quote-trim regex must compile"))
}

/// One dotted key path per line. Surrounding single quotes (as left by
/// grepping template sources) are stripped; blank lines and repeats are
/// skipped.
pub fn parse_keys(text: &str) -> Vec<KeyPath> {
    let mut seen = BTreeSet::new();
    text.lines()
        .map(|line| quote_trim_re().replace_all(line.trim(), "").into_owned())
        .filter(|line| !line.is_empty())
        .map(|line| KeyPath::parse(&line))
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

pub fn execute(
    ctx: &Context,
    keys_file: &str,
    value: &str,
    dry_run: bool,
) -> Result<(usize, CatalogRun<Vec<KeyPath>>), String> {
    let text =
        fs::read_to_string(keys_file).map_err(|e| format!("failed to read {keys_file}: {e}"))?;
    let keys = parse_keys(&text);
    let value = Value::String(value.to_string());
    let persist = if dry_run {
        Persist::Discard
    } else {
        Persist::InPlace
    };

    let run = ctx
        .batch()
        .run_single(&ctx.config.reference, &persist, |mut catalog| {
            let written = declare(catalog.root_mut(), &keys, &value);
            if written.is_empty() {
                Applied::keep(written)
            } else {
                Applied::rewrite(written, catalog.into_root())
            }
        })
        .map_err(|failure| {
            format!(
                "reference catalog unusable: {}: {}",
                failure.name, failure.message
            )
        })?;
    Ok((keys.len(), run))
}

pub fn run(global: GlobalArgs, args: Args) {
    let ctx = load_context_or_exit(&global);
    let (requested, run) = execute(&ctx, &args.keys_file, &args.value, args.dry_run)
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(EXIT_FATAL);
        });

    if args.json {
        print_json(
            KIND,
            json!({
                "dryRun": args.dry_run,
                "requested": requested,
                "run": run,
            }),
        );
    } else {
        println!(
            "[declare] {}: added {} of {requested} keys",
            run.name,
            run.outcome.len()
        );
        for path in &run.outcome {
            println!("  + {path}");
        }
    }
}
