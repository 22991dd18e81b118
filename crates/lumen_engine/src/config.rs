//! # Engine Configuration
//!
//! Construction input for one engine instance, plus the demo presets the
//! host page cycles through.
//!
//! ```toml
//! image_path = "img/pic-b.jpg"
//! enable_particles = true
//! base_path = "/assets"
//! ```

use std::time::Duration;

use lumen_particles::EmitterConfig;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

fn default_particle_texture() -> String {
    "img/dot.png".to_owned()
}

fn default_max_pixel_ratio() -> f32 {
    2.0
}

/// Construction input for an [`crate::AnimEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimConfig {
    /// Background image, relative to `base_path`.
    pub image_path: String,
    /// Spawn the particle field.
    #[serde(default)]
    pub enable_particles: bool,
    /// Prefix every resource path is resolved against.
    #[serde(default)]
    pub base_path: String,
    /// Particle sprite, relative to `base_path`.
    #[serde(default = "default_particle_texture")]
    pub particle_texture: String,
    /// Upper bound on the surface resolution.
    #[serde(default = "default_max_pixel_ratio")]
    pub max_pixel_ratio: f32,
    /// Quiet period for resize notifications; 0 fires at the next idle opportunity.
    #[serde(default)]
    pub resize_debounce_ms: u64,
    /// Fixed seed for the engine's random streams.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Emitter override; the built-in config is used when absent.
    #[serde(default)]
    pub emitter: Option<EmitterConfig>,
}

impl AnimConfig {
    /// A config for `image_path` with every other field defaulted.
    #[must_use]
    pub fn new(image_path: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            enable_particles: false,
            base_path: String::new(),
            particle_texture: default_particle_texture(),
            max_pixel_ratio: default_max_pixel_ratio(),
            resize_debounce_ms: 0,
            seed: None,
            emitter: None,
        }
    }

    /// Enables or disables the particle field.
    #[must_use]
    pub fn with_particles(mut self, enable: bool) -> Self {
        self.enable_particles = enable;
        self
    }

    /// Sets the resource base path.
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Fixes the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parses and validates a TOML config.
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the fields that have a valid range.
    pub fn validate(&self) -> EngineResult<()> {
        if self.image_path.trim().is_empty() {
            return Err(EngineError::InvalidConfig("image_path is empty".into()));
        }
        if !(self.max_pixel_ratio >= 1.0 && self.max_pixel_ratio.is_finite()) {
            return Err(EngineError::InvalidConfig(format!(
                "max_pixel_ratio must be >= 1, got {}",
                self.max_pixel_ratio
            )));
        }
        if self.enable_particles && self.particle_texture.trim().is_empty() {
            return Err(EngineError::InvalidConfig("particle_texture is empty".into()));
        }
        if let Some(emitter) = &self.emitter {
            emitter.validate()?;
        }
        Ok(())
    }

    /// Resolves a resource path against `base_path`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        let base = self.base_path.trim_end_matches('/');
        if base.is_empty() {
            return path.to_owned();
        }
        format!("{base}/{}", path.trim_start_matches('/'))
    }

    /// Resolved background image path.
    #[must_use]
    pub fn image_url(&self) -> String {
        self.resolve(&self.image_path)
    }

    /// Resolved particle sprite path.
    #[must_use]
    pub fn particle_texture_url(&self) -> String {
        self.resolve(&self.particle_texture)
    }

    /// Resize debounce window.
    #[must_use]
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// The emitter config to use, with its texture keyed to the resolved sprite path.
    pub fn emitter_config(&self) -> EngineResult<EmitterConfig> {
        let mut config = match &self.emitter {
            Some(config) => config.clone(),
            None => EmitterConfig::builtin()?,
        };
        let url = self.particle_texture_url();
        for behavior in &mut config.behaviors {
            if let lumen_particles::BehaviorConfig::TextureSingle { texture } = behavior {
                texture.clone_from(&url);
            }
        }
        Ok(config)
    }
}

/// The layouts the demo page can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemoMode {
    /// One full-window instance.
    Fullscreen,
    /// Four small instances side by side.
    Multi,
    /// One instance with the particle field.
    #[default]
    Particles,
}

impl DemoMode {
    /// Every mode, in selector order.
    pub const ALL: [Self; 3] = [Self::Fullscreen, Self::Multi, Self::Particles];

    /// Selector label.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fullscreen => "fullscreen",
            Self::Multi => "multi",
            Self::Particles => "particles",
        }
    }

    /// Looks a mode up by its selector label.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Configs for the engine instances this mode mounts.
    #[must_use]
    pub fn configs(self) -> Vec<AnimConfig> {
        match self {
            Self::Fullscreen => vec![AnimConfig::new("img/pic-a.jpg")],
            Self::Multi => ["img/pic-b.jpg", "img/pic-a.jpg", "img/pic-b.jpg", "img/pic-a.jpg"]
                .into_iter()
                .map(AnimConfig::new)
                .collect(),
            Self::Particles => vec![AnimConfig::new("img/pic-b.jpg").with_particles(true)],
        }
    }
}
