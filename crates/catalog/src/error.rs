//! Collaborator error model.
//!
//! The distribution engine sorts failures into four buckets: fatal to the
//! whole call, fatal to one variant, fatal to one target channel, and
//! benign. The variants here are the wire-level carriers for that triage;
//! the engine decides the bucket based on which operation raised them.

use thiserror::Error;

/// Result type for catalog store / channel directory operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error raised by a [`CatalogStore`](crate::CatalogStore) or
/// [`ChannelDirectory`](crate::ChannelDirectory) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A required relation was not hydrated on the entity.
    #[error("missing relation: {0}")]
    MissingRelation(String),

    /// A uniqueness collision on insert. Treated as benign by the engine:
    /// a concurrent pass already converged this edge.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// The collaborator itself is unreachable or failed wholesale.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure scoped to a single operation.
    #[error("backend error: {0}")]
    Backend(String),
}

impl CatalogError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn missing_relation(msg: impl Into<String>) -> Self {
        Self::MissingRelation(msg.into())
    }

    pub fn duplicate_key(msg: impl Into<String>) -> Self {
        Self::DuplicateKey(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Whether this error indicates a concurrent pass already did the work.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey(_))
    }
}
