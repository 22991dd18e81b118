//! # Motion Controller
//!
//! Everything that moves with time, advanced once per frame:
//!
//! ```text
//! tick ─▶ elapsed += raw seconds
//!      ├─ tweens      (capped delta)
//!      ├─ diamond     lissajous orbit around the artboard centre
//!      ├─ crt.noise   slow sine
//!      ├─ overlap     falling edge ─▶ toggle top shape ─▶ bring_to_front
//!      └─ emitter     (capped delta)
//! ```
//!
//! Overlap is an axis-aligned test against the diamond's circumscribed
//! radius plus half the square, not an exact polygon test.

use lumen_core::Vec2;
use lumen_particles::Emitter;

use crate::animation::Tweens;
use crate::builder::BOX_SIZE;
use crate::clock::FrameTick;
use crate::filter::Filters;
use crate::scene::{NodeKey, Scene};

/// Orbit amplitude multiplier and frequency multiplier.
const SPEED_FACTOR: f32 = 1.3;

/// Distance on both axes below which the shapes count as overlapping.
#[must_use]
pub fn min_distance(box_size: f32) -> f32 {
    let half = box_size * 0.5;
    (half * half * 2.0).sqrt() + half
}

/// Diamond offset from the artboard centre after `elapsed` seconds.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn diamond_offset(elapsed: f64) -> Vec2 {
    let amplitude = f64::from(BOX_SIZE * SPEED_FACTOR);
    let speed = f64::from(SPEED_FACTOR);
    Vec2::new(
        (amplitude * (elapsed * 2.5 * speed).sin()) as f32,
        (amplitude * (elapsed * 5.0 * speed).sin()) as f32,
    )
}

/// CRT noise after `elapsed` seconds.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn crt_noise(elapsed: f64) -> f32 {
    (0.5 * (elapsed * 0.5).sin()) as f32
}

/// Time-based state carried between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    /// Seconds accumulated from raw frame intervals.
    pub elapsed: f64,
    /// Whether the shapes overlapped on the previous frame.
    pub prev_overlap: bool,
    /// Whether the square currently paints over the diamond.
    pub square_on_top: bool,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            prev_overlap: true,
            square_on_top: true,
        }
    }
}

impl MotionState {
    /// Fresh state: overlapping, square on top.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds this frame's overlap. On a falling edge the top shape flips and
    /// the shape to bring to the front is returned.
    pub fn observe_overlap(&mut self, overlap: bool) -> Option<NodeKey> {
        let falling = self.prev_overlap && !overlap;
        self.prev_overlap = overlap;
        if !falling {
            return None;
        }
        self.square_on_top = !self.square_on_top;
        Some(if self.square_on_top {
            NodeKey::Square
        } else {
            NodeKey::Diamond
        })
    }
}

/// Advances motion once per frame.
#[derive(Debug, Clone)]
pub struct MotionController {
    state: MotionState,
    min_distance: f32,
    swaps: u64,
}

impl Default for MotionController {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionController {
    /// A controller at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: MotionState::new(),
            min_distance: min_distance(BOX_SIZE),
            swaps: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Depth swaps performed so far.
    #[must_use]
    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    /// Runs one frame.
    pub fn tick(
        &mut self,
        tick: FrameTick,
        scene: &mut Scene,
        filters: &mut Filters,
        tweens: &mut Tweens,
        emitter: Option<&mut Emitter>,
    ) {
        self.state.elapsed += tick.elapsed_secs();
        let elapsed = self.state.elapsed;

        tweens.update(tick.delta_secs(), scene);

        scene.diamond.position = diamond_offset(elapsed);
        filters.crt.noise = crt_noise(elapsed);

        let d = scene.diamond.position - scene.square.position;
        let overlap = d.x.abs() < self.min_distance && d.y.abs() < self.min_distance;
        if let Some(front) = self.state.observe_overlap(overlap) {
            scene.artboard.bring_to_front(front);
            self.swaps += 1;
            tracing::trace!(front = front.name(), elapsed, "depth swap");
        }

        if let Some(emitter) = emitter {
            emitter.update(tick.delta_secs());
        }
    }
}
