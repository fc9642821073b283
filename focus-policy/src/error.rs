//! Error types for the policy layer.
//!
//! Policy mutations never return errors: rejections are ordinary outcomes and
//! storage failures are logged. These types cover the collaborator seams and
//! configuration.

use thiserror::Error;

/// Result type for policy configuration.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors raised while building the policy engine.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Configuration document could not be parsed.
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration values are out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors reported by an [`AppCatalog`](crate::AppCatalog).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The platform has no app catalog (e.g. a web preview build).
    #[error("app catalog is not supported on this platform")]
    Unsupported,

    /// The native catalog call failed.
    #[error("app catalog unavailable: {0}")]
    Unavailable(String),
}
