//! `locsync.toml` loading.
//!
//! Every field is optional; a missing default config file means defaults.

use locsync_store::{DEFAULT_BACKUP_SUFFIX, DEFAULT_IGNORE_SUFFIXES, FsStoreOptions};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "locsync.toml";
pub const DEFAULT_LOCALES_DIR: &str = "locales";
pub const DEFAULT_REFERENCE: &str = "en.default.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Read { path: String, message: String },

    #[error("invalid toml at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub locales_dir: PathBuf,
    pub reference: String,
    pub official: Vec<String>,
    pub ignore_suffixes: Vec<String>,
    pub backup_suffix: String,
    pub parallel: bool,
    pub reports: ReportsConfig,
    pub promote: PromoteConfig,
    pub seed: SeedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locales_dir: PathBuf::from(DEFAULT_LOCALES_DIR),
            reference: DEFAULT_REFERENCE.to_string(),
            official: Vec::new(),
            ignore_suffixes: DEFAULT_IGNORE_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            parallel: true,
            reports: ReportsConfig::default(),
            promote: PromoteConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

/// Where report files land, relative to `dir`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportsConfig {
    pub dir: PathBuf,
    pub missing_csv: String,
    pub empty_csv: String,
    pub diff_json: String,
    pub sync_summary: String,
    pub pending_csv: String,
    pub promoted_csv: String,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            missing_csv: "i18n-missing-export.csv".to_string(),
            empty_csv: "i18n-empty-strings.csv".to_string(),
            diff_json: "locale_key_report.json".to_string(),
            sync_summary: "sync_summary.json".to_string(),
            pending_csv: "i18n-pending.csv".to_string(),
            promoted_csv: "i18n-promoted.csv".to_string(),
        }
    }
}

impl ReportsConfig {
    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PromoteConfig {
    /// Store name of the donor catalog.
    pub donor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    /// Locale whose value is used when an entry has none for a catalog.
    pub fallback_locale: String,
    pub entries: Vec<SeedEntry>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            fallback_locale: "en".to_string(),
            entries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedEntry {
    pub key: String,
    /// Locale -> value.
    pub values: BTreeMap<String, String>,
}

impl SeedEntry {
    pub fn value_for<'a>(&'a self, locale: &str, fallback_locale: &str) -> Option<&'a str> {
        self.values
            .get(locale)
            .or_else(|| self.values.get(fallback_locale))
            .map(String::as_str)
    }
}

impl Config {
    /// Load `path`, or `locsync.toml` in the working directory when no path
    /// is given. Only the implicit default may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&path.display().to_string(), &text)
    }

    pub fn parse(path: &str, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn store_options(&self) -> FsStoreOptions {
        FsStoreOptions {
            official: self.official.clone(),
            ignore_suffixes: self.ignore_suffixes.clone(),
            backup_suffix: self.backup_suffix.clone(),
        }
    }
}
