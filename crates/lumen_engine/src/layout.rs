//! # Layout Engine
//!
//! Recomputes positions and scales from the viewport size. Runs on every
//! settled resize, after the scene exists.

use lumen_core::{contain_scale, cover_scale, Size, Vec2};
use lumen_particles::{Emitter, SpawnShape};

use crate::scene::Scene;

/// Design size of the shape artboard.
pub const ARTBOARD_SIZE: Size = Size::new(600.0, 800.0);

/// Applies viewport-dependent layout.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    passes: u64,
}

impl LayoutEngine {
    /// A layout engine that has not run yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lays the scene out for `viewport`.
    pub fn apply(&mut self, viewport: Size, scene: &mut Scene, emitter: Option<&mut Emitter>) {
        let center = viewport.center();

        scene.artboard.scale = contain_scale(
            ARTBOARD_SIZE.width,
            ARTBOARD_SIZE.height,
            viewport.width,
            viewport.height,
        );
        scene.artboard.position = center;

        scene.background.position = center;
        let native = scene.background.texture.size();
        if native.is_positive() {
            let scale = cover_scale(native.width, native.height, viewport.width, viewport.height);
            scene.background.scale = Vec2::splat(scale);
        } else {
            tracing::warn!(?native, "background texture has no area, scale unchanged");
        }

        for mark in [&mut scene.registration_h, &mut scene.registration_v] {
            let (w, h) = (mark.width(), mark.height());
            mark.position = Vec2::new(viewport.width - w, viewport.height - h);
        }

        if let Some(emitter) = emitter {
            emitter.update_spawn_pos(center.x, center.y);
            for behavior in emitter.init_behaviors_mut() {
                if let Some(rect) = behavior.shape_mut().and_then(SpawnShape::as_rect_mut) {
                    rect.x = -viewport.width * 0.5;
                    rect.y = -viewport.height * 0.5;
                    rect.width = viewport.width;
                    rect.height = viewport.height * 0.5;
                }
            }
        }

        self.passes += 1;
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            artboard_scale = scene.artboard.scale,
            pass = self.passes,
            "layout applied"
        );
    }

    /// Layout passes run so far.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }
}
