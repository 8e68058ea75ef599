//! Error types for the Lattice build pipeline.
//!
//! Every error is terminal for the build that raised it: the builder never
//! retries internally and never returns a partial graph.

use thiserror::Error;

/// Result type alias for Lattice operations.
pub type Result<T> = std::result::Result<T, LatticeError>;

/// Main error type for the Lattice build pipeline.
#[derive(Debug, Error)]
pub enum LatticeError {
    /// Schema text failed to parse or validate
    #[error("Schema error: {0}")]
    Schema(String),

    /// Missing or inconsistent module-join configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No module or link module could be resolved for an entity
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Zero or multiple intermediate-entity paths found for an indirect link
    #[error("Ambiguous path: {0}")]
    AmbiguousPath(String),
}

impl LatticeError {
    /// Create a new schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a new ambiguous path error
    pub fn ambiguous_path(msg: impl Into<String>) -> Self {
        Self::AmbiguousPath(msg.into())
    }

    /// Check if this is a schema error
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is a resolution error
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }

    /// Check if this is an ambiguous path error
    pub fn is_ambiguous_path(&self) -> bool {
        matches!(self, Self::AmbiguousPath(_))
    }
}
