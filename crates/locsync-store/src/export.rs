//! Report rows and their CSV / JSON renderings.

use crate::batch::{BatchReport, CatalogFailure};
use locsync_core::{DiffReport, Insertion, KeyPath, leaf_text};
use serde::Serialize;

/// One row of a translator worklist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRow {
    pub key_path: KeyPath,
    pub reference_value: String,
    pub locale: String,
}

impl TranslationRow {
    pub fn from_insertion(locale: &str, insertion: &Insertion) -> Self {
        Self {
            key_path: insertion.path.clone(),
            reference_value: leaf_text(&insertion.value),
            locale: locale.to_string(),
        }
    }
}

/// Quote one CSV field, doubling embedded quotes.
pub fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// `key,<reference locale>,locale,translation`, every field quoted and
/// the translation column left blank.
pub fn translation_csv(reference_locale: &str, rows: &[TranslationRow]) -> String {
    let mut out = format!("key,{reference_locale},locale,translation\n");
    for row in rows {
        let fields = [
            csv_field(&row.key_path.dotted()),
            csv_field(&row.reference_value),
            csv_field(&row.locale),
            csv_field(""),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyRow {
    pub locale: String,
    pub key_path: KeyPath,
}

pub fn empty_csv(rows: &[EmptyRow]) -> String {
    let mut out = String::from("locale,key\n");
    for row in rows {
        out.push_str(&row.locale);
        out.push(',');
        out.push_str(&csv_field(&row.key_path.dotted()));
        out.push('\n');
    }
    out
}

/// One entry of the diff report file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DiffRow {
    #[serde(rename_all = "camelCase")]
    Compared {
        file: String,
        missing_count: usize,
        extra_count: usize,
        missing_keys: Vec<KeyPath>,
        extra_keys: Vec<KeyPath>,
    },
    Failed { file: String, error: String },
}

impl DiffRow {
    pub fn has_drift(&self) -> bool {
        match self {
            DiffRow::Compared {
                missing_count,
                extra_count,
                ..
            } => missing_count + extra_count > 0,
            DiffRow::Failed { .. } => true,
        }
    }
}

/// Flatten a diff batch into report rows, successes and failures in
/// catalog-name order.
pub fn diff_rows(report: &BatchReport<DiffReport>) -> Vec<DiffRow> {
    let mut rows: Vec<DiffRow> = report
        .runs
        .iter()
        .map(|run| DiffRow::Compared {
            file: run.name.clone(),
            missing_count: run.outcome.missing.len(),
            extra_count: run.outcome.extra.len(),
            missing_keys: run.outcome.missing.clone(),
            extra_keys: run.outcome.extra.clone(),
        })
        .chain(report.failures.iter().map(failed_row))
        .collect();
    rows.sort_by(|a, b| row_file(a).cmp(row_file(b)));
    rows
}

fn failed_row(failure: &CatalogFailure) -> DiffRow {
    DiffRow::Failed {
        file: failure.name.clone(),
        error: failure.message.clone(),
    }
}

fn row_file(row: &DiffRow) -> &str {
    match row {
        DiffRow::Compared { file, .. } | DiffRow::Failed { file, .. } => file,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidCatalog {
    pub file: String,
    pub error: String,
}

/// Outcome of a rebuild batch: catalogs written and catalogs skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    pub produced: Vec<String>,
    pub invalid: Vec<InvalidCatalog>,
}

impl RebuildSummary {
    pub fn from_report<T>(report: &BatchReport<T>) -> Self {
        Self {
            produced: report
                .runs
                .iter()
                .filter_map(|run| run.written.clone())
                .collect(),
            invalid: report
                .failures
                .iter()
                .map(|failure| InvalidCatalog {
                    file: failure.name.clone(),
                    error: failure.message.clone(),
                })
                .collect(),
        }
    }
}
