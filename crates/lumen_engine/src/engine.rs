//! # Animation Engine
//!
//! Lifecycle of one animated surface:
//!
//! ```text
//!  create ──▶ init ─────────────────────────────▶ destroy
//!             │ surface, textures, attach,         │ unsubscribe, disconnect,
//!             │ observe, on_ready                  │ emitter, drawables,
//!             ▼                                    │ filters, surface
//!   AwaitingFirstLayout ──first size──▶ Running ───┴──▶ Released
//!                        build scene,     │ every size: layout
//!                        subscribe, tick  │ every frame: motion + render
//! ```
//!
//! `init` and `destroy` are serialised by an async mutex, so a `destroy`
//! issued while `init` is still loading waits for it. Scene state sits
//! behind a `parking_lot` mutex shared with the frame-clock listener and is
//! never held across an await.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use lumen_core::Size;
use lumen_particles::{Emitter, EmitterConfig};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::backend::{DestroyOptions, Environment, Frame, RenderBackend, SurfaceId, SurfaceOptions, TextureInfo};
use crate::builder::{BuiltScene, SceneBuilder};
use crate::clock::{FrameClock, FrameTick, Subscription};
use crate::config::AnimConfig;
use crate::error::{EngineError, EngineResult};
use crate::filter::Filters;
use crate::host::{HostElement, ResizeObserver};
use crate::layout::LayoutEngine;
use crate::motion::{MotionController, MotionState};
use crate::scene::Scene;

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

/// Where an engine is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the first settled size to build the scene.
    AwaitingFirstLayout,
    /// Scene built, ticking.
    Running,
    /// Torn down. Every call is a no-op.
    Released,
}

/// Point-in-time view of an engine, for tests and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    /// Lifecycle phase.
    pub phase: Phase,
    /// Last settled viewport size.
    pub size: Size,
    /// Times the scene was built.
    pub scene_builds: u32,
    /// Layout passes run.
    pub layout_passes: u64,
    /// Drawables in paint order.
    pub drawables: usize,
    /// Filters not yet destroyed.
    pub live_filters: usize,
    /// Tweens still running.
    pub tweens: usize,
    /// Live particles.
    pub particles: usize,
    /// Whether a frame-clock listener is registered.
    pub subscribed: bool,
    /// Whether the resize observer is connected.
    pub observing: bool,
    /// The live surface.
    pub surface: Option<SurfaceId>,
    /// Frames handed to the backend.
    pub frames_rendered: u64,
    /// Motion state.
    pub motion: MotionState,
    /// Depth swaps performed.
    pub swaps: u64,
}

/// Resources loaded by `init`.
#[derive(Debug)]
struct Loaded {
    surface: SurfaceId,
    background: TextureInfo,
    particles: Option<(EmitterConfig, TextureInfo)>,
}

/// State touched by the resize pump and the tick listener.
struct Live<B> {
    id: u64,
    phase: Phase,
    backend: Option<B>,
    surface: Option<SurfaceId>,
    background: Option<TextureInfo>,
    particles: Option<(EmitterConfig, TextureInfo)>,
    observer: Option<ResizeObserver>,
    subscription: Option<Subscription>,
    size: Size,
    world: Option<BuiltScene>,
    layout: LayoutEngine,
    motion: MotionController,
    rng: ChaCha8Rng,
    scene_builds: u32,
    frames_rendered: u64,
}

impl<B: RenderBackend> Live<B> {
    fn on_tick(&mut self, tick: FrameTick) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(world) = self.world.as_mut() else {
            return;
        };
        self.motion.tick(
            tick,
            &mut world.scene,
            &mut world.filters,
            &mut world.tweens,
            world.emitter.as_mut(),
        );

        if let (Some(backend), Some(surface)) = (self.backend.as_mut(), self.surface) {
            let frame = Frame {
                size: self.size,
                scene: &world.scene,
                filters: &world.filters,
                particles: world.emitter.as_ref(),
            };
            match backend.render(surface, &frame) {
                Ok(()) => self.frames_rendered += 1,
                Err(e) => tracing::warn!(engine = self.id, error = %e, "render failed"),
            }
        }
    }

    fn build_scene(&mut self) -> EngineResult<BuiltScene> {
        let background = self
            .background
            .clone()
            .ok_or_else(|| EngineError::asset("background", "not loaded"))?;
        let mut builder = SceneBuilder::new(background);
        if let Some((config, texture)) = &self.particles {
            builder = builder.with_particles(config.clone(), vec![texture.path.clone()]);
        }
        builder.build(&mut self.rng)
    }

    fn snapshot(&self) -> EngineSnapshot {
        let world = self.world.as_ref();
        EngineSnapshot {
            phase: self.phase,
            size: self.size,
            scene_builds: self.scene_builds,
            layout_passes: self.layout.passes(),
            drawables: world.map_or(0, |w| w.scene.paint_order().len()),
            live_filters: world.map_or(0, |w| w.filters.live_count()),
            tweens: world.map_or(0, |w| w.tweens.len()),
            particles: world
                .and_then(|w| w.emitter.as_ref())
                .map_or(0, Emitter::particle_count),
            subscribed: self.subscription.is_some(),
            observing: self.observer.as_ref().is_some_and(ResizeObserver::is_connected),
            surface: self.surface,
            frames_rendered: self.frames_rendered,
            motion: self.motion.state(),
            swaps: self.motion.swaps(),
        }
    }
}

/// State only `init` and `destroy` touch.
#[derive(Default)]
struct Lifecycle {
    init_started: bool,
    host: Option<Box<dyn HostElement>>,
    attached: Option<SurfaceId>,
}

/// One animated surface bound to one host element.
pub struct AnimEngine<B: RenderBackend> {
    id: u64,
    config: AnimConfig,
    surface_options: SurfaceOptions,
    clock: Arc<FrameClock>,
    lifecycle: tokio::sync::Mutex<Lifecycle>,
    live: Arc<Mutex<Live<B>>>,
}

impl<B: RenderBackend> std::fmt::Debug for AnimEngine<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimEngine")
            .field("id", &self.id)
            .field("image", &self.config.image_path)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl<B: RenderBackend> AnimEngine<B> {
    /// Creates an engine on the shared frame clock.
    ///
    /// Returns `None` when the environment cannot draw.
    pub fn create<E>(config: AnimConfig, env: &E) -> Option<Self>
    where
        E: Environment<Backend = B>,
    {
        Self::with_clock(config, env, FrameClock::shared())
    }

    /// Creates an engine driven by a specific clock.
    pub fn with_clock<E>(config: AnimConfig, env: &E, clock: Arc<FrameClock>) -> Option<Self>
    where
        E: Environment<Backend = B>,
    {
        let Some(backend) = env.create_backend() else {
            tracing::warn!(image = %config.image_path, "no drawing backend available");
            return None;
        };
        let id = NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed);
        let surface_options = SurfaceOptions::for_pixel_ratio(env.device_pixel_ratio(), config.max_pixel_ratio);
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        tracing::debug!(
            engine = id,
            resolution = surface_options.resolution,
            antialias = surface_options.antialias,
            "engine created"
        );

        let live = Live {
            id,
            phase: Phase::AwaitingFirstLayout,
            backend: Some(backend),
            surface: None,
            background: None,
            particles: None,
            observer: None,
            subscription: None,
            size: Size::ZERO,
            world: None,
            layout: LayoutEngine::new(),
            motion: MotionController::new(),
            rng,
            scene_builds: 0,
            frames_rendered: 0,
        };
        Some(Self {
            id,
            config,
            surface_options,
            clock,
            lifecycle: tokio::sync::Mutex::new(Lifecycle::default()),
            live: Arc::new(Mutex::new(live)),
        })
    }

    /// The construction config.
    #[must_use]
    pub fn config(&self) -> &AnimConfig {
        &self.config
    }

    /// Surface options derived at creation.
    #[must_use]
    pub fn surface_options(&self) -> &SurfaceOptions {
        &self.surface_options
    }

    /// The clock this engine subscribes to.
    #[must_use]
    pub fn clock(&self) -> &Arc<FrameClock> {
        &self.clock
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.live.lock().phase
    }

    /// Point-in-time view of the engine.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        self.live.lock().snapshot()
    }

    /// Runs `f` over the scene and filters, if the scene exists.
    pub fn inspect<R>(&self, f: impl FnOnce(&Scene, &Filters) -> R) -> Option<R> {
        let live = self.live.lock();
        live.world.as_ref().map(|w| f(&w.scene, &w.filters))
    }

    /// Runs `f` over the particle emitter, if the scene has one.
    pub fn inspect_emitter<R>(&self, f: impl FnOnce(&Emitter) -> R) -> Option<R> {
        let live = self.live.lock();
        live.world.as_ref().and_then(|w| w.emitter.as_ref()).map(f)
    }

    /// Creates the surface, loads resources, attaches to `host` and starts
    /// observing its size. `on_ready` runs once, after the observer is attached.
    ///
    /// A second call, or a call after [`AnimEngine::destroy`], is a no-op.
    pub async fn init<H, F>(&self, host: H, on_ready: F) -> EngineResult<()>
    where
        H: HostElement,
        F: FnOnce() + Send,
    {
        let mut lifecycle = self.lifecycle.lock().await;
        if self.phase() == Phase::Released {
            tracing::warn!(engine = self.id, "init after destroy ignored");
            return Ok(());
        }
        if lifecycle.init_started {
            tracing::warn!(engine = self.id, "engine already initialized");
            return Ok(());
        }
        lifecycle.init_started = true;

        self.config.validate()?;
        let emitter_config = if self.config.enable_particles {
            Some(self.config.emitter_config()?)
        } else {
            None
        };

        let mut host: Box<dyn HostElement> = Box::new(host);
        let initial = host.content_size();

        let taken = self.live.lock().backend.take();
        let Some(mut backend) = taken else {
            return Err(EngineError::Surface("backend unavailable".into()));
        };
        let loaded = self.load(&mut backend, initial, emitter_config).await;
        self.live.lock().backend = Some(backend);
        let loaded = loaded?;

        host.append_surface(loaded.surface);
        let (observer, sink) = ResizeObserver::new(self.config.resize_debounce());
        host.observe_content_box(sink);

        {
            let mut live = self.live.lock();
            live.background = Some(loaded.background);
            live.particles = loaded.particles;
            live.observer = Some(observer);
        }
        lifecycle.host = Some(host);
        lifecycle.attached = Some(loaded.surface);

        tracing::info!(engine = self.id, surface = loaded.surface.0, "engine ready");
        on_ready();
        Ok(())
    }

    async fn load(
        &self,
        backend: &mut B,
        initial: Size,
        emitter_config: Option<EmitterConfig>,
    ) -> EngineResult<Loaded> {
        let surface = backend.init_surface(&self.surface_options, initial).await?;
        // Recorded now so teardown releases it even if loading fails.
        self.live.lock().surface = Some(surface);

        let background = backend.load_texture(&self.config.image_url()).await?;
        let particles = match emitter_config {
            Some(config) => {
                let texture = backend.load_texture(&self.config.particle_texture_url()).await?;
                Some((config, texture))
            }
            None => None,
        };
        tracing::debug!(
            engine = self.id,
            image = %background.path,
            width = background.size.width,
            height = background.size.height,
            "resources loaded"
        );
        Ok(Loaded {
            surface,
            background,
            particles,
        })
    }

    /// Idle opportunity: delivers a settled resize, if any.
    ///
    /// The first settled size builds the scene, subscribes to the clock and
    /// runs one tick before the layout pass. Returns true if a layout pass ran.
    pub fn pump(&self, now: Instant) -> bool {
        let mut live = self.live.lock();
        if live.phase == Phase::Released {
            return false;
        }
        let Some(size) = live.observer.as_mut().and_then(|o| o.poll(now)) else {
            return false;
        };
        self.on_resize(&mut live, size)
    }

    fn on_resize(&self, live: &mut Live<B>, size: Size) -> bool {
        live.size = size;

        if live.phase == Phase::AwaitingFirstLayout {
            match live.build_scene() {
                Ok(built) => live.world = Some(built),
                Err(e) => {
                    tracing::error!(engine = self.id, error = %e, "scene build failed");
                    return false;
                }
            }
            live.scene_builds += 1;
            live.phase = Phase::Running;
            live.subscription = Some(self.subscribe());
            live.on_tick(FrameTick::ZERO);
            tracing::info!(engine = self.id, "engine started");
        }

        if let (Some(backend), Some(surface)) = (live.backend.as_mut(), live.surface) {
            backend.resize_surface(surface, size);
        }
        if let Some(world) = live.world.as_mut() {
            live.layout.apply(size, &mut world.scene, world.emitter.as_mut());
        }
        true
    }

    fn subscribe(&self) -> Subscription {
        let live: Weak<Mutex<Live<B>>> = Arc::downgrade(&self.live);
        self.clock.add(move |tick| {
            if let Some(live) = live.upgrade() {
                live.lock().on_tick(tick);
            }
        })
    }

    /// Tears everything down. Waits for an in-flight `init`. Idempotent.
    pub async fn destroy(&self) {
        let mut lifecycle = self.lifecycle.lock().await;

        let (backend, surface) = {
            let mut live = self.live.lock();
            if live.phase == Phase::Released {
                tracing::debug!(engine = self.id, "already destroyed");
                return;
            }

            if let Some(subscription) = live.subscription.take() {
                self.clock.remove(subscription);
            }
            if let Some(mut observer) = live.observer.take() {
                observer.disconnect();
            }
            if let Some(mut world) = live.world.take() {
                if let Some(emitter) = world.emitter.as_mut() {
                    emitter.destroy();
                }
                let released = world.scene.release(&mut world.tweens);
                let filters = world.filters.destroy(false);
                tracing::debug!(engine = self.id, released, filters, "scene released");
            }
            live.phase = Phase::Released;
            (live.backend.take(), live.surface.take())
        };

        if let (Some(mut backend), Some(surface)) = (backend, surface) {
            backend.destroy_surface(surface, &DestroyOptions::ENGINE).await;
            if lifecycle.attached.take() == Some(surface) {
                if let Some(host) = lifecycle.host.as_mut() {
                    host.remove_surface(surface);
                }
            }
        }
        lifecycle.host = None;
        tracing::info!(engine = self.id, "engine destroyed");
    }
}
