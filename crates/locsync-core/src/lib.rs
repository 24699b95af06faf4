//! # locsync-core
//!
//! Structural reconciliation of hierarchical locale catalogs against a
//! canonical reference catalog.
//!
//! Every operation is a pure in-memory tree transformation built on one
//! walker:
//!
//! ```text
//! Catalog / KeyPath / Slot     ← model and addressing
//!     │
//! walk / walk_paired / walk_into   ← traversal, driven by one side
//!     │
//! diff · fill · rebuild · promote · audit · stats · seed
//! ```
//!
//! Nothing here touches the filesystem. Loading, backups and persistence
//! live in `locsync-store`.

pub mod audit;
pub mod catalog;
pub mod diff;
pub mod error;
pub mod fill;
pub mod promote;
pub mod rebuild;
pub mod seed;
pub mod stats;
pub mod walk;

pub use audit::{Repair, SelfRefReport, audit_empty, audit_self_refs, humanize, is_self_reference};
pub use catalog::{
    Branch, Catalog, KeyPath, Slot, dotted_leaves, identical, is_vacant, leaf_text, locale_from_name, lookup,
};
pub use diff::{DiffReport, diff};
pub use error::CatalogError;
pub use fill::{FillReport, Insertion, fill};
pub use promote::{PromoteReport, promote};
pub use rebuild::{RebuildOutcome, rebuild, rebuild_with_outcome};
pub use seed::{declare, pending, seed_value, skeleton};
pub use stats::{CatalogStats, stats};
pub use walk::{Drive, MergeVisitor, Visitor, for_each_leaf, walk, walk_into, walk_paired};
