/// Convenience result type used across dotboard.
pub type DotboardResult<T> = Result<T, DotboardError>;

/// Top-level error taxonomy shared by producers, layers and the compositor.
#[derive(thiserror::Error, Debug)]
pub enum DotboardError {
    /// Malformed update or configuration value. Rejected, previous state kept.
    #[error("validation error: {0}")]
    Validation(String),

    /// Transient failure of an external source (network, API, decode).
    #[error("source error: {0}")]
    Source(String),

    /// Source setup that cannot succeed by retrying (e.g. no usable stream format).
    #[error("setup error: {0}")]
    Setup(String),

    /// The owning producer was asked to stop.
    #[error("stopped")]
    Stopped,

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DotboardError {
    /// Create a [`DotboardError::Validation`] error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a [`DotboardError::Source`] error.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a [`DotboardError::Setup`] error.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Create a [`DotboardError::Serde`] error.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether a producer should retry after a backoff instead of halting.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Source(_) | Self::Other(_))
    }
}

impl From<serde_json::Error> for DotboardError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
