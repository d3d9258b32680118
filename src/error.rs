//! Error types for the explode engine.

use crate::config::SettingsError;

/// Errors that can occur while exploding a row into XUnits.
///
/// Fatal variants abort the row and surface to the caller. Transient
/// variants (see [`ExplodeError::is_transient`]) only ever affect a single
/// combination candidate: the engine logs them and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum ExplodeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{mode} explode requires a '{dimension}' dimension")]
    MissingRequiredDimension {
        mode: &'static str,
        dimension: &'static str,
    },

    #[error("{required} required dimensions exceed the maximum depth of {max_depth}")]
    UnsatisfiableDepth { required: usize, max_depth: usize },

    #[error("Malformed dimension '{name}': {names} attribute names vs {values} attribute values")]
    MalformedDimension {
        name: String,
        names: usize,
        values: usize,
    },

    #[error("Combination references unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("Combination candidate has no dimensions")]
    EmptyCandidate,

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl ExplodeError {
    /// Whether this error only invalidates one combination candidate.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ExplodeError::MalformedDimension { .. }
                | ExplodeError::UnknownDimension(_)
                | ExplodeError::EmptyCandidate
        )
    }
}

pub type ExplodeResult<T> = Result<T, ExplodeError>;
