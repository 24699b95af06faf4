//! # locsync-store
//!
//! Everything between catalog bytes and the pure engine in
//! `locsync-core`.
//!
//! This crate provides:
//! - the catalog codec (relaxed JSON in, strict JSON out)
//! - the `CatalogStore` boundary with directory and in-memory stores
//! - the batch driver (reference loading, per-target fan-out, backup then
//!   overwrite)
//! - report rows for CSV and JSON export
//!
//! ## Data flow
//!
//! ```text
//! locales/*.json
//!     ↕  FsStore (list / read / backup / atomic write)
//! codec (parse_catalog / render)
//!     ↕
//! Batch::run ──► core operation per target ──► BatchReport ──► export
//! ```

pub mod batch;
pub mod codec;
pub mod export;
pub mod fs_store;
pub mod store;

pub use batch::{
    Applied, Batch, BatchError, BatchReport, CatalogFailure, CatalogRun, FailureStage, Persist,
    sibling_name,
};
pub use codec::{CodecError, parse_catalog, render, strip_relaxed_syntax};
pub use export::{
    DiffRow, EmptyRow, InvalidCatalog, RebuildSummary, TranslationRow, csv_field, diff_rows,
    empty_csv, translation_csv,
};
pub use fs_store::{
    DEFAULT_BACKUP_SUFFIX, DEFAULT_IGNORE_SUFFIXES, FsStore, FsStoreOptions, write_atomic,
};
pub use store::{Backup, CatalogStore, MemoryStore, StoreError, content_digest};
