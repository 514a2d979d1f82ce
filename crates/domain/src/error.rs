//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`QuotebookError`] via `#[from]` or an explicit `From` impl.

/// Top-level error returned by services and repository ports.
#[derive(Debug, thiserror::Error)]
pub enum QuotebookError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Opaque failure from a persistence adapter.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant or input violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("quote content must not be empty")]
    EmptyContent,

    #[error("quote must reference an author")]
    MissingAuthor,

    #[error("name must not be empty")]
    EmptyName,

    #[error("slug must be lowercase alphanumerics separated by dashes, got {0:?}")]
    InvalidSlug(String),

    #[error("tag name {0:?} must not contain ',' or '|'")]
    InvalidTagName(String),

    #[error("unknown sort field {0:?}")]
    InvalidSortField(String),

    #[error("unknown sort order {0:?}")]
    InvalidSortOrder(String),

    #[error("page must be at least 1")]
    InvalidPage,

    #[error("limit must be between 1 and {max}, got {value}")]
    InvalidLimit { value: u32, max: u32 },

    #[error("invalid identifier {0:?}")]
    InvalidId(String),
}

/// A required record does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
