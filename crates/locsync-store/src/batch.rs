//! Batch driver: load the reference, fan an operation out over target
//! catalogs, persist what changed.
//!
//! Per-catalog problems (unreadable, unparseable, failed backup or write)
//! are recorded in [`BatchReport::failures`] and never stop the other
//! targets. Only a missing reference is fatal.

use crate::codec::{parse_catalog, render};
use crate::store::{Backup, CatalogStore, StoreError};
use locsync_core::{Branch, Catalog};
use serde::Serialize;

/// What happens to a rewritten tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persist {
    /// Compute only.
    Discard,
    /// Back up the catalog, then overwrite it.
    InPlace,
    /// Write `<stem>.<suffix>.json` next to the catalog.
    Sibling(String),
}

/// `fr.json` + `synced` -> `fr.synced.json`.
pub fn sibling_name(name: &str, suffix: &str) -> String {
    let stem = name.strip_suffix(".json").unwrap_or(name);
    format!("{stem}.{suffix}.json")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Read,
    Parse,
    Backup,
    Write,
    Worker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFailure {
    pub name: String,
    pub stage: FailureStage,
    pub message: String,
}

impl CatalogFailure {
    fn new(name: &str, stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            stage,
            message: message.into(),
        }
    }
}

/// One processed catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRun<T> {
    pub name: String,
    pub locale: String,
    pub outcome: T,
    /// Store name that received the rewritten tree, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<Backup>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport<T> {
    pub reference: String,
    pub runs: Vec<CatalogRun<T>>,
    pub failures: Vec<CatalogFailure>,
}

impl<T> BatchReport<T> {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of applying an operation to one catalog.
#[derive(Debug, Clone)]
pub struct Applied<T> {
    pub outcome: T,
    /// Tree to persist; `None` leaves the catalog untouched.
    pub rewrite: Option<Branch>,
}

impl<T> Applied<T> {
    pub fn keep(outcome: T) -> Self {
        Self {
            outcome,
            rewrite: None,
        }
    }

    pub fn rewrite(outcome: T, tree: Branch) -> Self {
        Self {
            outcome,
            rewrite: Some(tree),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("reference catalog {name} unavailable: {reason}")]
    MissingReference { name: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Batch<'s, S: CatalogStore + ?Sized> {
    store: &'s S,
    reference: String,
    parallel: bool,
}

impl<'s, S: CatalogStore + ?Sized> Batch<'s, S> {
    pub fn new(store: &'s S, reference: impl Into<String>) -> Self {
        Self {
            store,
            reference: reference.into(),
            parallel: true,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Every listed catalog except the reference.
    pub fn targets(&self) -> Result<Vec<String>, BatchError> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|name| name != &self.reference)
            .collect())
    }

    pub fn load_reference(&self) -> Result<Catalog, BatchError> {
        self.load(&self.reference)
            .map_err(|failure| BatchError::MissingReference {
                name: failure.name,
                reason: failure.message,
            })
    }

    pub fn load(&self, name: &str) -> Result<Catalog, CatalogFailure> {
        let bytes = self
            .store
            .read(name)
            .map_err(|e| CatalogFailure::new(name, FailureStage::Read, e.to_string()))?;
        parse_catalog(name, &bytes)
            .map_err(|e| CatalogFailure::new(name, FailureStage::Parse, e.to_string()))
    }

    /// Apply `op` to each target. Results keep the order of `targets`.
    pub fn run<T, F>(&self, targets: &[String], persist: &Persist, op: F) -> BatchReport<T>
    where
        T: Send,
        F: Fn(Catalog) -> Applied<T> + Sync,
    {
        let op = &op;
        let results: Vec<Result<CatalogRun<T>, CatalogFailure>> = if self.parallel && targets.len() > 1
        {
            std::thread::scope(|scope| {
                let handles: Vec<_> = targets
                    .iter()
                    .map(|name| {
                        let handle = scope.spawn(move || self.process(name, persist, op));
                        (name, handle)
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|(name, handle)| {
                        handle.join().unwrap_or_else(|_| {
                            Err(CatalogFailure::new(
                                name,
                                FailureStage::Worker,
                                "worker thread panicked",
                            ))
                        })
                    })
                    .collect()
            })
        } else {
            targets
                .iter()
                .map(|name| self.process(name, persist, op))
                .collect()
        };

        let mut report = BatchReport {
            reference: self.reference.clone(),
            runs: Vec::new(),
            failures: Vec::new(),
        };
        for result in results {
            match result {
                Ok(run) => report.runs.push(run),
                Err(failure) => {
                    tracing::warn!(
                        catalog = %failure.name,
                        stage = ?failure.stage,
                        "skipping catalog: {}",
                        failure.message
                    );
                    report.failures.push(failure);
                }
            }
        }
        report
    }

    /// Apply `op` to one named catalog, the reference included.
    pub fn run_single<T>(
        &self,
        name: &str,
        persist: &Persist,
        op: impl FnOnce(Catalog) -> Applied<T>,
    ) -> Result<CatalogRun<T>, CatalogFailure> {
        self.process(name, persist, op)
    }

    fn process<T>(
        &self,
        name: &str,
        persist: &Persist,
        op: impl FnOnce(Catalog) -> Applied<T>,
    ) -> Result<CatalogRun<T>, CatalogFailure> {
        let catalog = self.load(name)?;
        let locale = catalog.locale().to_string();
        let applied = op(catalog);
        let (written, backup) = match &applied.rewrite {
            Some(tree) => self.persist(name, tree, persist)?,
            None => (None, None),
        };
        Ok(CatalogRun {
            name: name.to_string(),
            locale,
            outcome: applied.outcome,
            written,
            backup,
        })
    }

    fn persist(
        &self,
        name: &str,
        tree: &Branch,
        persist: &Persist,
    ) -> Result<(Option<String>, Option<Backup>), CatalogFailure> {
        let destination = match persist {
            Persist::Discard => return Ok((None, None)),
            Persist::InPlace => name.to_string(),
            Persist::Sibling(suffix) => sibling_name(name, suffix),
        };
        let text =
            render(tree).map_err(|e| CatalogFailure::new(name, FailureStage::Write, e.to_string()))?;

        let backup = match persist {
            Persist::InPlace => {
                let backup = self
                    .store
                    .backup(name)
                    .map_err(|e| CatalogFailure::new(name, FailureStage::Backup, e.to_string()))?;
                tracing::info!(catalog = name, backup = %backup.name, digest = %backup.digest, "backed up catalog");
                Some(backup)
            }
            _ => None,
        };

        self.store
            .write(&destination, text.as_bytes())
            .map_err(|e| CatalogFailure::new(name, FailureStage::Write, e.to_string()))?;
        tracing::info!(catalog = name, destination = %destination, "persisted catalog");
        Ok((Some(destination), backup))
    }
}
