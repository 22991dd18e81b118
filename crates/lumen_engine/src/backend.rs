//! # Rendering Backend Seam
//!
//! The engine never talks to a GPU API directly. It describes the surface it
//! wants, asks the backend to load textures, and hands it a [`Frame`] per
//! tick. Everything concrete lives behind [`RenderBackend`].

use std::future::Future;

use lumen_core::{Color, Size};
use lumen_particles::Emitter;

use crate::error::EngineResult;
use crate::filter::Filters;
use crate::scene::Scene;

/// Opaque handle to a created drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// A loaded texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    /// Resolved resource path the texture was loaded from.
    pub path: String,
    /// Native size in pixels.
    pub size: Size,
}

impl TextureInfo {
    /// Creates a texture record.
    #[must_use]
    pub fn new(path: impl Into<String>, size: Size) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// How the drawing surface is set up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOptions {
    /// Clear colour.
    pub background: Color,
    /// Clear alpha.
    pub background_alpha: f32,
    /// Scale the backing store by `resolution`, keep CSS size unchanged.
    pub auto_density: bool,
    /// Backing-store pixels per device-independent pixel.
    pub resolution: f32,
    /// Multisample anti-aliasing.
    pub antialias: bool,
    /// Surface follows the host element's size.
    pub resize_to_host: bool,
}

impl SurfaceOptions {
    /// Options for a device pixel ratio, clamped to `max_ratio`.
    ///
    /// Anti-aliasing is only enabled when the clamped ratio is at most 1.
    #[must_use]
    pub fn for_pixel_ratio(device_ratio: f32, max_ratio: f32) -> Self {
        let ratio = if device_ratio.is_finite() && device_ratio > 0.0 {
            device_ratio
        } else {
            1.0
        };
        let resolution = ratio.min(max_ratio);
        Self {
            background: Color::BLACK,
            background_alpha: 1.0,
            auto_density: true,
            resolution,
            antialias: resolution <= 1.0,
            resize_to_host: true,
        }
    }
}

/// What surface teardown releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestroyOptions {
    /// Detach the surface's view from the host.
    pub remove_view: bool,
    /// Destroy every child of the stage.
    pub children: bool,
    /// Destroy textures used by children.
    pub texture: bool,
    /// Destroy texture sources.
    pub texture_source: bool,
    /// Destroy graphics contexts.
    pub context: bool,
}

impl DestroyOptions {
    /// Remove the view and children. Keep textures, sources and contexts,
    /// since other instances may share them.
    pub const ENGINE: Self = Self {
        remove_view: true,
        children: true,
        texture: false,
        texture_source: false,
        context: false,
    };
}

impl Default for DestroyOptions {
    fn default() -> Self {
        Self::ENGINE
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Viewport dimensions.
    pub size: Size,
    /// The drawables.
    pub scene: &'a Scene,
    /// Filters referenced by the drawables.
    pub filters: &'a Filters,
    /// Live particles, when the particle field is enabled.
    pub particles: Option<&'a Emitter>,
}

impl Frame<'_> {
    /// Drawables in paint order plus live particles.
    #[must_use]
    pub fn drawable_count(&self) -> usize {
        self.scene.paint_order().len() + self.particles.map_or(0, Emitter::particle_count)
    }
}

/// A drawing-surface implementation.
pub trait RenderBackend: Send + 'static {
    /// Creates the surface.
    fn init_surface(
        &mut self,
        options: &SurfaceOptions,
        initial: Size,
    ) -> impl Future<Output = EngineResult<SurfaceId>> + Send;

    /// Loads a texture from a resolved path.
    fn load_texture(&mut self, path: &str) -> impl Future<Output = EngineResult<TextureInfo>> + Send;

    /// Matches the surface to new host dimensions.
    fn resize_surface(&mut self, surface: SurfaceId, size: Size);

    /// Draws one frame.
    fn render(&mut self, surface: SurfaceId, frame: &Frame<'_>) -> EngineResult<()>;

    /// Tears the surface down.
    fn destroy_surface(
        &mut self,
        surface: SurfaceId,
        options: &DestroyOptions,
    ) -> impl Future<Output = ()> + Send;
}

/// The runtime an engine is created in.
pub trait Environment {
    /// Backend this environment produces.
    type Backend: RenderBackend;

    /// Device pixel ratio of the display.
    fn device_pixel_ratio(&self) -> f32;

    /// A backend, or `None` when nothing can draw here.
    fn create_backend(&self) -> Option<Self::Backend>;
}
