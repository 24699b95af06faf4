//! Error types for catalog construction.

/// Errors raised when a decoded tree cannot serve as a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The decoded document is a scalar or array instead of an object.
    #[error("catalog `{locale}` root must be an object, found {found}")]
    RootNotBranch { locale: String, found: &'static str },
}
