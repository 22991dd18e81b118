//! # Scene
//!
//! The fixed set of drawables one engine owns. Every drawable has a field
//! and a [`NodeKey`]; none is ever swapped for another while the engine
//! lives, and all of them are released together.
//!
//! ```text
//! stage
//! ├─ background        (image sprite, CRT filter)
//! ├─ particles?        (container, emitter output)
//! ├─ artboard          (container, contain-fit 600×800)
//! │  ├─ diamond
//! │  └─ square         (on top until the first swap)
//! ├─ registration_h
//! └─ registration_v
//! ```

use lumen_core::{depth, Color, Rect, Size, Vec2};

use crate::animation::Tweens;
use crate::backend::TextureInfo;
use crate::filter::FilterKey;

/// Stable name of a drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// Full-bleed image behind everything.
    Background,
    /// Particle container.
    Particles,
    /// Fixed-aspect container for the shapes.
    Artboard,
    /// The orbiting red shape.
    Diamond,
    /// The sliding blue shape.
    Square,
    /// Horizontal corner mark.
    RegistrationH,
    /// Vertical corner mark.
    RegistrationV,
}

impl NodeKey {
    /// Every key, in build order.
    pub const ALL: [Self; 7] = [
        Self::Background,
        Self::Particles,
        Self::Artboard,
        Self::Diamond,
        Self::Square,
        Self::RegistrationH,
        Self::RegistrationV,
    ];

    /// Short name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Background => "bg",
            Self::Particles => "particles",
            Self::Artboard => "artboard",
            Self::Diamond => "diamond",
            Self::Square => "square",
            Self::RegistrationH => "reg_h",
            Self::RegistrationV => "reg_v",
        }
    }
}

/// What a sprite samples.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureRef {
    /// The built-in 16×16 white texture, coloured by tint.
    White,
    /// A loaded image.
    Image(TextureInfo),
}

impl TextureRef {
    /// Side of the built-in white texture.
    pub const WHITE_SIZE: f32 = 16.0;

    /// Native size.
    #[must_use]
    pub fn size(&self) -> Size {
        match self {
            Self::White => Size::new(Self::WHITE_SIZE, Self::WHITE_SIZE),
            Self::Image(info) => info.size,
        }
    }
}

/// A textured quad.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Name of this drawable.
    pub key: NodeKey,
    /// Source texture.
    pub texture: TextureRef,
    /// Position of the anchor point in parent space.
    pub position: Vec2,
    /// Scale relative to the texture's native size.
    pub scale: Vec2,
    /// Normalised pivot; `(0.5, 0.5)` is the centre.
    pub anchor: Vec2,
    /// Rotation in degrees.
    pub angle: f32,
    /// Multiplicative colour.
    pub tint: Color,
    /// Opacity.
    pub alpha: f32,
    /// Post-processing filters applied to this sprite.
    pub filters: Vec<FilterKey>,
    destroyed: bool,
}

impl Sprite {
    /// A sprite at the origin with neutral properties.
    #[must_use]
    pub fn new(key: NodeKey, texture: TextureRef) -> Self {
        Self {
            key,
            texture,
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            anchor: Vec2::ZERO,
            angle: 0.0,
            tint: Color::WHITE,
            alpha: 1.0,
            filters: Vec::new(),
            destroyed: false,
        }
    }

    /// Scales the sprite to an on-screen size.
    pub fn set_size(&mut self, width: f32, height: f32) {
        let native = self.texture.size();
        if native.is_positive() {
            self.scale = Vec2::new(width / native.width, height / native.height);
        }
    }

    /// On-screen width.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.scale.x.abs() * self.texture.size().width
    }

    /// On-screen height.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.scale.y.abs() * self.texture.size().height
    }

    /// Unrotated bounds in parent space.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let (w, h) = (self.width(), self.height());
        Rect::new(
            self.position.x - self.anchor.x * w,
            self.position.y - self.anchor.y * h,
            w,
            h,
        )
    }

    /// Marks the sprite released.
    pub fn destroy(&mut self) {
        self.filters.clear();
        self.destroyed = true;
    }

    /// Whether [`Sprite::destroy`] ran.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// A group of drawables painted in `children` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    /// Name of this drawable.
    pub key: NodeKey,
    /// Origin in parent space.
    pub position: Vec2,
    /// Uniform scale applied to every child.
    pub scale: f32,
    /// Children, bottom to top.
    pub children: Vec<NodeKey>,
    /// Post-processing filters applied to the group.
    pub filters: Vec<FilterKey>,
    destroyed: bool,
}

impl Container {
    /// An empty container at the origin.
    #[must_use]
    pub fn new(key: NodeKey) -> Self {
        Self {
            key,
            position: Vec2::ZERO,
            scale: 1.0,
            children: Vec::new(),
            filters: Vec::new(),
            destroyed: false,
        }
    }

    /// Appends a child on top.
    pub fn add_child(&mut self, child: NodeKey) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    /// Moves a child to the top. Returns false if it is not a child.
    pub fn bring_to_front(&mut self, child: NodeKey) -> bool {
        depth::bring_to_front(&mut self.children, &child)
    }

    /// Whether `child` paints last.
    #[must_use]
    pub fn is_front(&self, child: NodeKey) -> bool {
        depth::is_front(&self.children, &child)
    }

    /// Marks the container released. Children are released by their owner.
    pub fn destroy(&mut self) {
        self.filters.clear();
        self.children.clear();
        self.destroyed = true;
    }

    /// Whether [`Container::destroy`] ran.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Every drawable of one engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Full-bleed image.
    pub background: Sprite,
    /// Particle container, when particles are enabled.
    pub particles: Option<Container>,
    /// Fixed-aspect shape container.
    pub artboard: Container,
    /// The orbiting shape.
    pub diamond: Sprite,
    /// The sliding shape.
    pub square: Sprite,
    /// Horizontal corner mark.
    pub registration_h: Sprite,
    /// Vertical corner mark.
    pub registration_v: Sprite,
    /// Top-level paint order.
    pub stage: Vec<NodeKey>,
}

impl Scene {
    /// A sprite by key. `None` for containers and absent nodes.
    #[must_use]
    pub fn sprite(&self, key: NodeKey) -> Option<&Sprite> {
        match key {
            NodeKey::Background => Some(&self.background),
            NodeKey::Diamond => Some(&self.diamond),
            NodeKey::Square => Some(&self.square),
            NodeKey::RegistrationH => Some(&self.registration_h),
            NodeKey::RegistrationV => Some(&self.registration_v),
            NodeKey::Particles | NodeKey::Artboard => None,
        }
    }

    /// A sprite by key, mutably.
    pub fn sprite_mut(&mut self, key: NodeKey) -> Option<&mut Sprite> {
        match key {
            NodeKey::Background => Some(&mut self.background),
            NodeKey::Diamond => Some(&mut self.diamond),
            NodeKey::Square => Some(&mut self.square),
            NodeKey::RegistrationH => Some(&mut self.registration_h),
            NodeKey::RegistrationV => Some(&mut self.registration_v),
            NodeKey::Particles | NodeKey::Artboard => None,
        }
    }

    /// A container by key.
    #[must_use]
    pub fn container(&self, key: NodeKey) -> Option<&Container> {
        match key {
            NodeKey::Artboard => Some(&self.artboard),
            NodeKey::Particles => self.particles.as_ref(),
            _ => None,
        }
    }

    /// A container by key, mutably.
    pub fn container_mut(&mut self, key: NodeKey) -> Option<&mut Container> {
        match key {
            NodeKey::Artboard => Some(&mut self.artboard),
            NodeKey::Particles => self.particles.as_mut(),
            _ => None,
        }
    }

    /// Keys of every node this scene holds.
    pub fn keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        NodeKey::ALL
            .into_iter()
            .filter(move |k| *k != NodeKey::Particles || self.particles.is_some())
    }

    /// Every node flattened bottom to top.
    #[must_use]
    pub fn paint_order(&self) -> Vec<NodeKey> {
        let mut order = Vec::with_capacity(NodeKey::ALL.len());
        for key in &self.stage {
            order.push(*key);
            if let Some(container) = self.container(*key) {
                order.extend(container.children.iter().copied());
            }
        }
        order
    }

    /// Releases every node: filters cleared and tweens killed first.
    ///
    /// Returns the number of nodes released by this call.
    pub fn release(&mut self, tweens: &mut Tweens) -> usize {
        let keys: Vec<NodeKey> = self.keys().collect();
        let mut released = 0;
        for key in keys {
            let killed = tweens.kill_tweens_of(key);
            if let Some(sprite) = self.sprite_mut(key) {
                if sprite.is_destroyed() {
                    continue;
                }
                sprite.destroy();
            } else if let Some(container) = self.container_mut(key) {
                if container.is_destroyed() {
                    continue;
                }
                container.destroy();
            }
            tracing::trace!(node = key.name(), killed, "released drawable");
            released += 1;
        }
        self.stage.clear();
        released
    }

    /// Whether every node has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.keys().all(|key| {
            self.sprite(key).map_or_else(
                || self.container(key).map_or(true, Container::is_destroyed),
                Sprite::is_destroyed,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_size_on_white_texture() {
        let mut sprite = Sprite::new(NodeKey::Square, TextureRef::White);
        sprite.set_size(90.0, 90.0);
        assert!((sprite.scale.x - 5.625).abs() < 1e-6);
        assert!((sprite.width() - 90.0).abs() < 1e-4);
        assert!((sprite.height() - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_anchor_centres_bounds() {
        let mut sprite = Sprite::new(NodeKey::Diamond, TextureRef::White);
        sprite.set_size(90.0, 90.0);
        sprite.anchor = Vec2::splat(0.5);
        sprite.position = Vec2::new(10.0, 20.0);
        let bounds = sprite.bounds();
        assert!((bounds.x + 35.0).abs() < 1e-4);
        assert!((bounds.y + 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_container_paint_order() {
        let mut artboard = Container::new(NodeKey::Artboard);
        artboard.add_child(NodeKey::Diamond);
        artboard.add_child(NodeKey::Square);
        artboard.add_child(NodeKey::Square);
        assert_eq!(artboard.children.len(), 2);
        assert!(artboard.is_front(NodeKey::Square));
        assert!(artboard.bring_to_front(NodeKey::Diamond));
        assert!(artboard.is_front(NodeKey::Diamond));
        assert!(!artboard.bring_to_front(NodeKey::Background));
    }

    #[test]
    fn test_image_texture_size() {
        let texture = TextureRef::Image(TextureInfo::new("img/pic-a.jpg", Size::new(1200.0, 800.0)));
        assert_eq!(texture.size(), Size::new(1200.0, 800.0));
    }
}
