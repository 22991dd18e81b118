//! # LUMEN Engine
//!
//! A size-reactive animation controller. It attaches to a host element,
//! builds a fixed scene on the first settled size, re-lays it out on every
//! later size and evolves it once per frame.
//!
//! ```text
//! ┌─────────────┐  ResizeSink   ┌────────────────┐  pump()   ┌──────────────┐
//! │ HostElement │ ────────────▶ │ ResizeObserver │ ────────▶ │  AnimEngine  │
//! └─────────────┘               │  (debounced)   │           │              │
//!                               └────────────────┘           │ SceneBuilder │ once
//! ┌─────────────┐  FrameTick                                 │ LayoutEngine │ per size
//! │ FrameClock  │ ─────────────────────────────────────────▶ │ Motion       │ per frame
//! └─────────────┘                                            └──────┬───────┘
//!                                                                   │ Frame
//!                                                            ┌──────▼───────┐
//!                                                            │RenderBackend │
//!                                                            └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let engine = AnimEngine::create(AnimConfig::new("img/pic-a.jpg"), &env)?;
//! engine.init(host, || {}).await?;
//! // host idle loop
//! engine.pump(Instant::now());
//! // host vsync
//! engine.clock().advance(Instant::now());
//! // teardown
//! engine.destroy().await;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod backend;
pub mod builder;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod headless;
pub mod host;
pub mod layout;
pub mod motion;
pub mod mount;
pub mod scene;

pub use animation::{Easing, Repeat, Tween, TweenProperty, Tweens};
pub use backend::{DestroyOptions, Environment, Frame, RenderBackend, SurfaceId, SurfaceOptions, TextureInfo};
pub use builder::{BuiltScene, SceneBuilder, BOX_SIZE};
pub use clock::{FrameClock, FrameTick, Subscription};
pub use config::{AnimConfig, DemoMode};
pub use engine::{AnimEngine, EngineSnapshot, Phase};
pub use error::{EngineError, EngineResult};
pub use filter::{CrtFilter, FilterKey, Filters};
pub use host::{HostElement, ResizeObserver, ResizeSink, SizeRecord};
pub use layout::{LayoutEngine, ARTBOARD_SIZE};
pub use motion::{MotionController, MotionState};
pub use mount::AnimMount;
pub use scene::{Container, NodeKey, Scene, Sprite, TextureRef};
