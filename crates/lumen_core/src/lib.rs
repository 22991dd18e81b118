//! # LUMEN Core
//!
//! Leaf utilities shared by the particle subsystem and the animation engine:
//! - 2D geometry in device-independent pixels
//! - Uniform contain/cover scale fitting
//! - A payload-keeping debouncer
//! - Paint-order manipulation
//!
//! Nothing in here owns a clock, a thread or a GPU resource. Callers pass
//! `Instant`s in explicitly so every function stays testable.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod color;
pub mod debounce;
pub mod depth;
pub mod geometry;
pub mod scale_fit;

pub use color::Color;
pub use debounce::Debounce;
pub use depth::bring_to_front;
pub use geometry::{Rect, Size, Vec2};
pub use scale_fit::{contain_scale, cover_scale, Fit};
