//! Directory-backed catalog store.

use crate::store::{CatalogStore, StoreError};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_IGNORE_SUFFIXES: &[&str] =
    &[".schema.json", ".synced.json", ".sorted.json", ".bak.json"];
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";

/// Listing and backup policy for an [`FsStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsStoreOptions {
    /// When non-empty, only these names are listed.
    pub official: Vec<String>,
    pub ignore_suffixes: Vec<String>,
    pub backup_suffix: String,
}

impl Default for FsStoreOptions {
    fn default() -> Self {
        Self {
            official: Vec::new(),
            ignore_suffixes: DEFAULT_IGNORE_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

/// One directory of catalogs; names are file names inside it.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    options: FsStoreOptions,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_options(root, FsStoreOptions::default())
    }

    pub fn with_options(root: impl Into<PathBuf>, options: FsStoreOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> Result<PathBuf, StoreError> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    fn is_listed(&self, name: &str) -> bool {
        if !name.ends_with(".json") {
            return false;
        }
        if self
            .options
            .ignore_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
        {
            return false;
        }
        self.options.official.is_empty() || self.options.official.iter().any(|o| o == name)
    }
}

impl CatalogStore for FsStore {
    fn list(&self) -> Result<Vec<String>, StoreError> {
        let io_err = |e: std::io::Error| StoreError::Io {
            name: self.root.display().to_string(),
            message: e.to_string(),
        };
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if !entry.file_type().map_err(io_err)?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!(file = ?entry.file_name(), "skipping non-UTF-8 file name");
                continue;
            };
            if self.is_listed(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_ok_and(|path| path.is_file())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_of(name)?;
        fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => StoreError::Io {
                name: name.to_string(),
                message: e.to_string(),
            },
        })
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_of(name)?;
        write_atomic(&path, bytes).map_err(|message| StoreError::Io {
            name: name.to_string(),
            message,
        })?;
        tracing::info!(catalog = name, bytes = bytes.len(), "wrote catalog");
        Ok(())
    }

    fn backup_name(&self, name: &str) -> String {
        format!("{name}{}", self.options.backup_suffix)
    }
}

/// Replace `path` with `bytes` so that it holds either the old or the new
/// content, never a mix. Backup-then-overwrite relies on this: once the
/// backup exists, a failed write leaves the original catalog untouched.
///
/// The bytes go to a hidden temporary sibling (same directory, so the
/// rename cannot cross filesystems, and never listed as a catalog), are
/// fsynced, renamed over `path`, and the directory entry is fsynced.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), String> {
    let context = |at: &Path, e: std::io::Error| format!("{}: {e}", at.display());
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(|e| context(dir, e))?;

    let staged = staging_path(path);
    let staged_result = File::create(&staged).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(e) = staged_result {
        let _ = fs::remove_file(&staged);
        return Err(context(&staged, e));
    }

    if let Err(e) = fs::rename(&staged, path) {
        let _ = fs::remove_file(&staged);
        return Err(format!("{} -> {}: {e}", staged.display(), path.display()));
    }

    File::open(dir)
        .and_then(|handle| handle.sync_all())
        .map_err(|e| context(dir, e))
}

/// `<dir>/.<file>.<pid>-<nanos>.partial`
fn staging_path(path: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut file_name = OsString::from(".");
    file_name.push(path.file_name().unwrap_or_default());
    file_name.push(format!(".{}-{nanos}.partial", std::process::id()));
    path.with_file_name(file_name)
}
