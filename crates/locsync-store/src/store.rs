//! The catalog store boundary.
//!
//! The engine never sees paths. A store lists catalog names, hands out
//! bytes, accepts new bytes, and snapshots the old bytes before a
//! mutating write.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Errors raised by store implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("catalog not found: {0}")]
    NotFound(String),

    #[error("invalid catalog name: {0}")]
    InvalidName(String),

    #[error("{name}: I/O error: {message}")]
    Io { name: String, message: String },
}

/// Where the pre-mutation bytes of a catalog were saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub name: String,
    /// `sha256:<hex>` of the saved bytes.
    pub digest: String,
}

pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

/// A named collection of catalogs.
///
/// `Sync` so the batch driver can process targets on scoped threads; each
/// target only ever touches its own names.
pub trait CatalogStore: Sync {
    /// Catalog names eligible for processing, sorted.
    fn list(&self) -> Result<Vec<String>, StoreError>;

    fn exists(&self, name: &str) -> bool;

    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError>;

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Sibling name that receives a catalog's backup.
    fn backup_name(&self, name: &str) -> String {
        format!("{name}.bak")
    }

    /// Copy the current bytes of `name` to its backup name.
    fn backup(&self, name: &str) -> Result<Backup, StoreError> {
        let bytes = self.read(name)?;
        let backup_name = self.backup_name(name);
        self.write(&backup_name, &bytes)?;
        Ok(Backup {
            name: backup_name,
            digest: content_digest(&bytes),
        })
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(self, name: &str, text: &str) -> Self {
        self.insert(name, text.as_bytes().to_vec());
        self
    }

    pub fn insert(&self, name: &str, bytes: Vec<u8>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), bytes);
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Every stored name, backups included.
    pub fn names(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl CatalogStore for MemoryStore {
    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .names()
            .into_iter()
            .filter(|name| name.ends_with(".json"))
            .collect())
    }

    fn exists(&self, name: &str) -> bool {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.insert(name, bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_copies_bytes_and_digests_them() {
        let store = MemoryStore::new().with_catalog("fr.json", "{\"a\": \"b\"}");
        let backup = store.backup("fr.json").expect("backup should succeed");

        assert_eq!(backup.name, "fr.json.bak");
        assert_eq!(store.text("fr.json.bak").as_deref(), Some("{\"a\": \"b\"}"));
        assert_eq!(backup.digest, content_digest(b"{\"a\": \"b\"}"));
        assert!(backup.digest.starts_with("sha256:"));
        assert_eq!(backup.digest.len(), "sha256:".len() + 64);
    }

    #[test]
    fn list_skips_backups() {
        let store = MemoryStore::new()
            .with_catalog("en.default.json", "{}")
            .with_catalog("fr.json", "{}")
            .with_catalog("fr.json.bak", "{}");
        assert_eq!(
            store.list().expect("list"),
            vec!["en.default.json".to_string(), "fr.json".to_string()]
        );
    }

    #[test]
    fn backup_of_missing_catalog_fails() {
        let store = MemoryStore::new();
        assert_eq!(
            store.backup("nope.json"),
            Err(StoreError::NotFound("nope.json".to_string()))
        );
    }
}
