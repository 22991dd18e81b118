//! # Engine Error Types
//!
//! All errors that can surface out of the engine lifecycle.

use lumen_particles::ParticleError;
use thiserror::Error;

/// Errors that can occur in the animation engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// An image or particle texture could not be loaded. Fatal for `init`.
    #[error("failed to load asset {path}: {reason}")]
    AssetLoad {
        /// Resolved resource path.
        path: String,
        /// Backend-provided reason.
        reason: String,
    },

    /// The drawing surface could not be created.
    #[error("drawing surface unavailable: {0}")]
    Surface(String),

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Engine configuration text is not valid TOML.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The particle subsystem rejected its configuration.
    #[error("particle subsystem: {0}")]
    Particles(#[from] ParticleError),

    /// The task running `init` was cancelled or panicked.
    #[error("init task did not complete: {0}")]
    InitAborted(String),
}

impl EngineError {
    /// Builds an [`EngineError::AssetLoad`].
    pub fn asset(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
