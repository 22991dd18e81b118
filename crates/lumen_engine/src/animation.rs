//! Property tweens driven by the frame clock.
//!
//! A tween writes one numeric property of one drawable. Its start value is
//! written as soon as it is added, so nothing pops on the first frame.

use crate::scene::{NodeKey, Scene};

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Linear interpolation.
    #[default]
    Linear,
    /// Sine ease-out.
    SineOut,
    /// Sine ease-in-out.
    SineInOut,
}

impl Easing {
    /// Applies the easing function to a t value (0-1).
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        use std::f32::consts::{FRAC_PI_2, PI};

        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::SineOut => (t * FRAC_PI_2).sin(),
            Self::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// The property a tween writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenProperty {
    /// Opacity of a sprite.
    Alpha,
    /// Horizontal position.
    X,
}

impl TweenProperty {
    /// Current value on the target, if the target has this property.
    #[must_use]
    pub fn read(self, scene: &Scene, target: NodeKey) -> Option<f32> {
        match (self, scene.sprite(target)) {
            (Self::Alpha, Some(sprite)) => Some(sprite.alpha),
            (Self::X, Some(sprite)) => Some(sprite.position.x),
            (Self::Alpha, None) => None,
            (Self::X, None) => scene.container(target).map(|c| c.position.x),
        }
    }

    fn write(self, scene: &mut Scene, target: NodeKey, value: f32) {
        if let Some(sprite) = scene.sprite_mut(target) {
            match self {
                Self::Alpha => sprite.alpha = value,
                Self::X => sprite.position.x = value,
            }
        } else if let (Self::X, Some(container)) = (self, scene.container_mut(target)) {
            container.position.x = value;
        }
    }
}

/// How often a tween plays after the first pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    /// Extra passes after the first.
    Count(u32),
    /// Forever.
    #[default]
    Infinite,
}

/// A single animated property.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    target: NodeKey,
    property: TweenProperty,
    from: f32,
    to: f32,
    /// One pass, in seconds.
    duration: f32,
    delay: f32,
    easing: Easing,
    yoyo: bool,
    repeat: Repeat,
    /// Seconds since the tween was added, delay included.
    time: f64,
}

impl Tween {
    /// A single-pass tween with linear easing and no delay.
    #[must_use]
    pub fn new(target: NodeKey, property: TweenProperty, from: f32, to: f32, duration: f32) -> Self {
        Self {
            target,
            property,
            from,
            to,
            duration,
            delay: 0.0,
            easing: Easing::Linear,
            yoyo: false,
            repeat: Repeat::Count(0),
            time: 0.0,
        }
    }

    /// Waits `delay` seconds before the first pass.
    #[must_use]
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    /// Sets the easing.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Plays every other pass backwards.
    #[must_use]
    pub fn with_yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// Sets the repeat count.
    #[must_use]
    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// The drawable this tween writes.
    #[must_use]
    pub fn target(&self) -> NodeKey {
        self.target
    }

    /// The property this tween writes.
    #[must_use]
    pub fn property(&self) -> TweenProperty {
        self.property
    }

    /// Value at the tween's current time.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value_at(self.time)
    }

    /// Value at `time` seconds after the tween was added.
    #[must_use]
    pub fn value_at(&self, time: f64) -> f32 {
        let local = time - f64::from(self.delay);
        if local <= 0.0 {
            return self.from;
        }
        if self.duration <= 0.0 {
            return self.end_value();
        }

        let passes = local / f64::from(self.duration);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let cycle = passes.floor() as u64;
        if let Repeat::Count(extra) = self.repeat {
            if cycle > u64::from(extra) {
                return self.end_value();
            }
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let progress = (passes - cycle as f64) as f32;
        self.sample(cycle, progress)
    }

    fn sample(&self, cycle: u64, progress: f32) -> f32 {
        let p = if self.yoyo && cycle % 2 == 1 {
            1.0 - progress
        } else {
            progress
        };
        self.from + (self.to - self.from) * self.easing.apply(p)
    }

    fn end_value(&self) -> f32 {
        match self.repeat {
            Repeat::Count(extra) => self.sample(u64::from(extra), 1.0),
            Repeat::Infinite => self.to,
        }
    }

    /// Returns true once the last pass has played.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self.repeat {
            Repeat::Infinite => false,
            Repeat::Count(extra) => {
                let passes = f64::from(extra) + 1.0;
                self.time >= f64::from(self.delay) + f64::from(self.duration.max(0.0)) * passes
            }
        }
    }

    /// Advances by `dt` seconds and returns the new value.
    pub fn update(&mut self, dt: f32) -> f32 {
        self.time += f64::from(dt.max(0.0));
        self.value()
    }
}

/// Every live tween of one engine.
#[derive(Debug, Clone, Default)]
pub struct Tweens {
    list: Vec<Tween>,
}

impl Tweens {
    /// No tweens.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a tween and writes its start value immediately.
    pub fn add(&mut self, tween: Tween, scene: &mut Scene) {
        tween.property.write(scene, tween.target, tween.value());
        self.list.push(tween);
    }

    /// Advances every tween by `dt` seconds. Completed tweens are dropped
    /// after writing their final value.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        for tween in &mut self.list {
            let value = tween.update(dt);
            tween.property.write(scene, tween.target, value);
        }
        self.list.retain(|t| !t.is_complete());
    }

    /// Stops every tween of `target`. Returns how many were stopped.
    pub fn kill_tweens_of(&mut self, target: NodeKey) -> usize {
        let before = self.list.len();
        self.list.retain(|t| t.target != target);
        before - self.list.len()
    }

    /// Stops everything.
    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Number of live tweens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns true if nothing is animating.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Live tweens.
    pub fn iter(&self) -> impl Iterator<Item = &Tween> {
        self.list.iter()
    }
}
