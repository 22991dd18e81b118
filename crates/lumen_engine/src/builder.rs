//! # Scene Builder
//!
//! Runs once, on the first settled size. Creates every drawable, the CRT
//! filter, the optional emitter and the two start-up tweens.

use lumen_core::{Color, Vec2};
use lumen_particles::{Emitter, EmitterConfig};
use rand::Rng;

use crate::animation::{Easing, Repeat, Tween, TweenProperty, Tweens};
use crate::backend::TextureInfo;
use crate::error::EngineResult;
use crate::filter::{CrtFilter, FilterKey, Filters};
use crate::scene::{Container, NodeKey, Scene, Sprite, TextureRef};

/// Side of both animated shapes.
pub const BOX_SIZE: f32 = 90.0;

/// Diamond tint.
pub const DIAMOND_TINT: u32 = 0xff_3300;

/// Square tint.
pub const SQUARE_TINT: u32 = 0x1c_81ff;

/// Horizontal registration mark size.
pub const REGISTRATION_H: (f32, f32) = (50.0, 10.0);

/// Vertical registration mark size.
pub const REGISTRATION_V: (f32, f32) = (10.0, 50.0);

/// Output of a build.
#[derive(Debug)]
pub struct BuiltScene {
    /// The drawables.
    pub scene: Scene,
    /// The filters.
    pub filters: Filters,
    /// The start-up tweens, already applied once.
    pub tweens: Tweens,
    /// The emitter, when particles are enabled.
    pub emitter: Option<Emitter>,
}

/// Builds the fixed scene.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    background: TextureInfo,
    particles: Option<(EmitterConfig, Vec<String>)>,
}

impl SceneBuilder {
    /// A builder for a scene over the given background image.
    #[must_use]
    pub fn new(background: TextureInfo) -> Self {
        Self {
            background,
            particles: None,
        }
    }

    /// Adds a particle container fed by an emitter.
    #[must_use]
    pub fn with_particles(mut self, config: EmitterConfig, textures: Vec<String>) -> Self {
        self.particles = Some((config, textures));
        self
    }

    /// Builds everything. `rng` picks the registration tint and seeds the emitter.
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> EngineResult<BuiltScene> {
        let mut stage = Vec::with_capacity(5);

        let mut background = Sprite::new(NodeKey::Background, TextureRef::Image(self.background));
        background.anchor = Vec2::splat(0.5);
        stage.push(NodeKey::Background);

        let mut emitter = None;
        let particles = match self.particles {
            Some((config, textures)) => {
                let mut e = Emitter::with_seed(config, textures, rng.gen())?;
                e.set_auto_update(false);
                e.set_emit(true);
                emitter = Some(e);
                stage.push(NodeKey::Particles);
                Some(Container::new(NodeKey::Particles))
            }
            None => None,
        };

        let mut artboard = Container::new(NodeKey::Artboard);
        stage.push(NodeKey::Artboard);

        let mut diamond = shape(NodeKey::Diamond, DIAMOND_TINT);
        diamond.angle = 45.0;
        artboard.add_child(NodeKey::Diamond);

        let tint = Color::hex_rgb(rng.gen_range(0..=0xff_ffff));
        let registration_h = mark(NodeKey::RegistrationH, REGISTRATION_H, tint);
        let registration_v = mark(NodeKey::RegistrationV, REGISTRATION_V, tint);
        stage.push(NodeKey::RegistrationH);
        stage.push(NodeKey::RegistrationV);

        // Added after the diamond, so it starts on top.
        let square = shape(NodeKey::Square, SQUARE_TINT);
        artboard.add_child(NodeKey::Square);

        let filters = Filters {
            crt: CrtFilter::with_lines(0.3, 4.0),
        };
        background.filters.push(FilterKey::Crt);

        let mut scene = Scene {
            background,
            particles,
            artboard,
            diamond,
            square,
            registration_h,
            registration_v,
            stage,
        };

        let mut tweens = Tweens::new();
        let alpha = TweenProperty::Alpha
            .read(&scene, NodeKey::Background)
            .unwrap_or(1.0);
        tweens.add(
            Tween::new(NodeKey::Background, TweenProperty::Alpha, 0.0, alpha, 5.0)
                .with_easing(Easing::SineOut),
            &mut scene,
        );
        tweens.add(
            Tween::new(NodeKey::Square, TweenProperty::X, -100.0, 100.0, 1.3)
                .with_delay(0.5)
                .with_easing(Easing::SineInOut)
                .with_yoyo(true)
                .with_repeat(Repeat::Infinite),
            &mut scene,
        );

        tracing::debug!(
            particles = emitter.is_some(),
            tint = tint.to_hex_rgb(),
            "scene built"
        );

        Ok(BuiltScene {
            scene,
            filters,
            tweens,
            emitter,
        })
    }
}

fn shape(key: NodeKey, tint: u32) -> Sprite {
    let mut sprite = Sprite::new(key, TextureRef::White);
    sprite.set_size(BOX_SIZE, BOX_SIZE);
    sprite.tint = Color::hex_rgb(tint);
    sprite.anchor = Vec2::splat(0.5);
    sprite
}

fn mark(key: NodeKey, (width, height): (f32, f32), tint: Color) -> Sprite {
    let mut sprite = Sprite::new(key, TextureRef::White);
    sprite.set_size(width, height);
    sprite.tint = tint;
    sprite
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Size;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn texture() -> TextureInfo {
        TextureInfo::new("img/pic-a.jpg", Size::new(1200.0, 800.0))
    }

    #[test]
    fn test_builds_fixed_shape_without_particles() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let built = SceneBuilder::new(texture()).build(&mut rng).expect("build");
        let scene = &built.scene;
        assert!(built.emitter.is_none());
        assert!(scene.particles.is_none());
        assert_eq!(
            scene.stage,
            vec![
                NodeKey::Background,
                NodeKey::Artboard,
                NodeKey::RegistrationH,
                NodeKey::RegistrationV
            ]
        );
        assert_eq!(scene.artboard.children, vec![NodeKey::Diamond, NodeKey::Square]);
        assert!((scene.diamond.angle - 45.0).abs() < f32::EPSILON);
        assert_eq!(scene.diamond.tint.to_hex_rgb(), DIAMOND_TINT);
        assert_eq!(scene.square.tint.to_hex_rgb(), SQUARE_TINT);
        assert_eq!(scene.registration_h.tint, scene.registration_v.tint);
        assert_eq!(scene.registration_h.anchor, Vec2::ZERO);
        assert!((scene.registration_v.height() - 50.0).abs() < 1e-4);
        assert_eq!(scene.background.filters, vec![FilterKey::Crt]);
        assert!(scene.square.filters.is_empty());
    }

    #[test]
    fn test_start_values_applied_immediately() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let built = SceneBuilder::new(texture()).build(&mut rng).expect("build");
        assert!(built.scene.background.alpha.abs() < f32::EPSILON);
        assert!((built.scene.square.position.x + 100.0).abs() < f32::EPSILON);
        assert_eq!(built.tweens.len(), 2);
    }

    #[test]
    fn test_particle_container_and_emitter() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = EmitterConfig::builtin().expect("builtin");
        let built = SceneBuilder::new(texture())
            .with_particles(config, vec!["img/dot.png".into()])
            .build(&mut rng)
            .expect("build");
        let emitter = built.emitter.expect("emitter");
        assert!(emitter.is_emitting());
        assert!(!emitter.auto_update());
        assert_eq!(built.scene.stage[1], NodeKey::Particles);
    }
}
