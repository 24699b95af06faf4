use crate::cli::GlobalArgs;
use crate::config::Config;
use chrono::{SecondsFormat, Utc};
use locsync_core::Catalog;
use locsync_store::{Batch, BatchReport, CatalogFailure, FsStore, write_atomic};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

pub const JSON_SCHEMA: u64 = 1;

/// Exit status for fatal errors, including a missing reference.
pub const EXIT_FATAL: i32 = 1;
/// Exit status when some catalog failed or drift was found.
pub const EXIT_PARTIAL: i32 = 2;

/// Resolved configuration plus the store it describes.
pub struct Context {
    pub config: Config,
    pub store: FsStore,
}

impl Context {
    pub fn load(global: &GlobalArgs) -> Result<Self, String> {
        let mut config =
            Config::load(global.config.as_deref().map(Path::new)).map_err(|e| e.to_string())?;
        if let Some(locales) = &global.locales {
            config.locales_dir = PathBuf::from(locales);
        }
        if let Some(reference) = &global.reference {
            config.reference = reference.clone();
        }
        if !config.locales_dir.is_dir() {
            return Err(format!(
                "locales directory not found: {}",
                config.locales_dir.display()
            ));
        }
        let store = FsStore::with_options(&config.locales_dir, config.store_options());
        Ok(Self { config, store })
    }

    pub fn batch(&self) -> Batch<'_, FsStore> {
        Batch::new(&self.store, self.config.reference.clone()).parallel(self.config.parallel)
    }

    /// Report destination: the explicit flag, else the configured file name.
    pub fn report_path(&self, explicit: Option<&str>, configured: &str) -> PathBuf {
        explicit
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.reports.path(configured))
    }
}

pub fn load_context_or_exit(global: &GlobalArgs) -> Context {
    Context::load(global).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FATAL);
    })
}

pub fn load_reference(batch: &Batch<'_, FsStore>) -> Result<Catalog, String> {
    batch.load_reference().map_err(|e| e.to_string())
}

pub fn write_report(path: &Path, text: &str) -> Result<(), String> {
    write_atomic(path, text.as_bytes())
        .map_err(|e| format!("failed to write report {}: {e}", path.display()))?;
    tracing::info!(report = %path.display(), "wrote report");
    Ok(())
}

/// Wrap a payload in the standard envelope and print it.
pub fn print_json(kind: &str, body: Value) {
    let mut payload = json!({
        "schema": JSON_SCHEMA,
        "kind": kind,
        "generatedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    });
    if let (Some(target), Value::Object(fields)) = (payload.as_object_mut(), body) {
        target.extend(fields);
    }
    let rendered = serde_json::to_string_pretty(&payload).unwrap_or_else(|err| {
        eprintln!("error: failed to render {kind} payload: {err}");
        std::process::exit(EXIT_PARTIAL);
    });
    println!("{rendered}");
}

pub fn print_failures(tag: &str, failures: &[CatalogFailure]) {
    for failure in failures {
        println!("[{tag}] SKIP {}: {}", failure.name, failure.message);
    }
}

/// Exit with [`EXIT_PARTIAL`] when any catalog failed.
pub fn exit_on_failures<T>(report: &BatchReport<T>) {
    if !report.succeeded() {
        std::process::exit(EXIT_PARTIAL);
    }
}
