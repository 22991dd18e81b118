//! # Particle Error Types

use thiserror::Error;

/// Errors that can occur while building an emitter.
#[derive(Error, Debug)]
pub enum ParticleError {
    /// The configuration parsed but is not usable.
    #[error("invalid emitter configuration: {0}")]
    InvalidConfig(String),

    /// The configuration text is not valid TOML for an emitter.
    #[error("failed to parse emitter configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A behaviour refers to a texture that was not supplied.
    #[error("texture not supplied to emitter: {0}")]
    MissingTexture(String),

    /// The emitter was created without any texture.
    #[error("emitter needs at least one texture")]
    NoTextures,
}

/// Result type for particle operations.
pub type ParticleResult<T> = Result<T, ParticleError>;
