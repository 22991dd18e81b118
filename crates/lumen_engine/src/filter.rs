//! # Post-processing Filters
//!
//! A single CRT filter applied to the background. Parameters are plain
//! uniforms; the backend owns the programs that consume them.

/// Stable name of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    /// The CRT filter.
    Crt,
}

/// Scanlines, curvature, noise and vignette.
#[derive(Debug, Clone, PartialEq)]
pub struct CrtFilter {
    /// Barrel distortion strength.
    pub curvature: f32,
    /// Scanline width in pixels.
    pub line_width: f32,
    /// Scanline contrast (0-1).
    pub line_contrast: f32,
    /// Draw vertical instead of horizontal lines.
    pub vertical_line: bool,
    /// Noise opacity; may go negative under modulation.
    pub noise: f32,
    /// Noise grain size.
    pub noise_size: f32,
    /// Noise seed.
    pub seed: f32,
    /// Vignette radius.
    pub vignetting: f32,
    /// Vignette opacity.
    pub vignetting_alpha: f32,
    /// Vignette edge blur.
    pub vignetting_blur: f32,
    /// Scanline animation time.
    pub time: f32,
    destroyed: bool,
    programs_destroyed: bool,
}

impl Default for CrtFilter {
    fn default() -> Self {
        Self {
            curvature: 1.0,
            line_width: 1.0,
            line_contrast: 0.25,
            vertical_line: false,
            noise: 0.0,
            noise_size: 1.0,
            seed: 0.0,
            vignetting: 0.3,
            vignetting_alpha: 1.0,
            vignetting_blur: 0.3,
            time: 0.0,
            destroyed: false,
            programs_destroyed: false,
        }
    }
}

impl CrtFilter {
    /// Default parameters with the given scanline contrast and width.
    #[must_use]
    pub fn with_lines(line_contrast: f32, line_width: f32) -> Self {
        Self {
            line_contrast,
            line_width,
            ..Self::default()
        }
    }

    /// Releases the filter. Shared programs survive unless `destroy_programs`.
    pub fn destroy(&mut self, destroy_programs: bool) {
        self.destroyed = true;
        self.programs_destroyed |= destroy_programs;
    }

    /// Whether [`CrtFilter::destroy`] ran.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether the shared programs were destroyed with it.
    #[must_use]
    pub fn programs_destroyed(&self) -> bool {
        self.programs_destroyed
    }
}

/// Every filter of one engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filters {
    /// The CRT filter.
    pub crt: CrtFilter,
}

impl Filters {
    /// Keys of every filter.
    pub const KEYS: [FilterKey; 1] = [FilterKey::Crt];

    /// A filter by key.
    #[must_use]
    pub fn get(&self, key: FilterKey) -> &CrtFilter {
        match key {
            FilterKey::Crt => &self.crt,
        }
    }

    /// Destroys every filter. Returns how many were live.
    pub fn destroy(&mut self, destroy_programs: bool) -> usize {
        let mut destroyed = 0;
        for key in Self::KEYS {
            let filter = match key {
                FilterKey::Crt => &mut self.crt,
            };
            if !filter.is_destroyed() {
                filter.destroy(destroy_programs);
                destroyed += 1;
            }
        }
        destroyed
    }

    /// Number of filters not yet destroyed.
    #[must_use]
    pub fn live_count(&self) -> usize {
        Self::KEYS
            .iter()
            .filter(|key| !self.get(**key).is_destroyed())
            .count()
    }
}
