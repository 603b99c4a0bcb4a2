//! Unified error handling for the catalog engine.
//!
//! Provides a single `CatalogError` type covering the failure taxonomy of
//! the engine. All service operations return `Result<T, CatalogError>`.
//! Out-of-range pagination is deliberately *not* an error: it is a
//! corrective outcome carried by [`crate::pagination::PagePlan`].

use thiserror::Error;

use crate::db::RepositoryError;

/// Engine-level error type for the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required field was missing or malformed. Rejected before slug
    /// resolution or persistence; never retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A persisted write violated slug uniqueness even after re-resolution.
    /// Fatal to the request; the caller must retry the whole create/update.
    #[error("Slug conflict: {0}")]
    SlugConflict(String),

    /// The text-search backend errored. Distinct from a legitimate
    /// zero-result response; surfaced, not retried.
    #[error("Search unavailable: {0}")]
    SearchUnavailable(#[source] RepositoryError),

    /// Generic backend I/O or timeout failure, surfaced unchanged. Retry
    /// policy, if any, belongs to the calling layer.
    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Result type alias for `CatalogError`.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_surfaced_verbatim() {
        let err = CatalogError::Validation("You must supply an address".to_string());
        assert_eq!(err.to_string(), "Validation failed: You must supply an address");
    }

    #[test]
    fn repository_errors_convert_to_persistence() {
        let err: CatalogError = RepositoryError::NotFound.into();
        assert!(matches!(err, CatalogError::Persistence(_)));
    }
}
