//! # Frame Clock
//!
//! One clock drives every engine instance that shares it. Each advance
//! produces a [`FrameTick`] and hands it to every registered listener.
//!
//! ```text
//!   host vsync ──▶ FrameClock::advance(now)
//!                     │  delta = now - last (capped)
//!                     ▼
//!               ┌───────────────┐
//!               │  listener 0   │  engine A tick
//!               │  listener 1   │  engine B tick
//!               │  ...          │
//!               └───────────────┘
//! ```
//!
//! Listeners are taken out of the registry for the duration of a dispatch,
//! so a listener may add or remove subscriptions (including its own)
//! without deadlocking. Additions made during a dispatch first run on the
//! next one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Longest frame interval fed to listeners as `delta_ms`.
pub const MAX_DELTA: Duration = Duration::from_millis(100);

static NEXT_CLOCK_ID: AtomicU64 = AtomicU64::new(1);

/// Timing of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTick {
    /// Frame interval in milliseconds, capped at [`MAX_DELTA`].
    pub delta_ms: f32,
    /// Raw frame interval in milliseconds.
    pub elapsed_ms: f32,
}

impl FrameTick {
    /// A tick that advances nothing.
    pub const ZERO: Self = Self {
        delta_ms: 0.0,
        elapsed_ms: 0.0,
    };

    /// Builds a tick from a raw frame interval.
    #[must_use]
    pub fn from_interval(interval: Duration) -> Self {
        Self {
            delta_ms: interval.min(MAX_DELTA).as_secs_f32() * 1000.0,
            elapsed_ms: interval.as_secs_f32() * 1000.0,
        }
    }

    /// Capped interval in seconds.
    #[must_use]
    pub fn delta_secs(&self) -> f32 {
        self.delta_ms * 0.001
    }

    /// Raw interval in seconds, widened for accumulation.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        f64::from(self.elapsed_ms) / 1000.0
    }
}

type Listener = Box<dyn FnMut(FrameTick) + Send>;

/// Handle for one registered listener.
///
/// Not `Clone`: [`FrameClock::remove`] consumes it, so a listener is removed
/// at most once.
#[derive(Debug)]
#[must_use = "dropping a Subscription leaks the listener until the clock is dropped"]
pub struct Subscription {
    clock: u64,
    id: u64,
}

impl Subscription {
    /// Id of the listener within its clock.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Default)]
struct Registry {
    listeners: Vec<(u64, Listener)>,
    /// Ids currently taken out for dispatch.
    in_flight: Vec<u64>,
    /// In-flight ids removed during the current dispatch.
    removed: Vec<u64>,
    dispatching: bool,
    next_id: u64,
}

/// A shared tick source.
pub struct FrameClock {
    id: u64,
    registry: Mutex<Registry>,
    last: Mutex<Option<Instant>>,
    frames: AtomicU64,
}

impl std::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameClock")
            .field("id", &self.id)
            .field("listeners", &self.listener_count())
            .field("frames", &self.frames())
            .finish()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Creates a clock with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_CLOCK_ID.fetch_add(1, Ordering::Relaxed),
            registry: Mutex::new(Registry::default()),
            last: Mutex::new(None),
            frames: AtomicU64::new(0),
        }
    }

    /// The process-wide clock.
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<FrameClock>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::new())))
    }

    /// Registers a listener.
    pub fn add<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(FrameTick) + Send + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Box::new(listener)));
        Subscription { clock: self.id, id }
    }

    /// Unregisters a listener. Returns false if the handle belongs to another clock.
    pub fn remove(&self, subscription: Subscription) -> bool {
        if subscription.clock != self.id {
            tracing::warn!(id = subscription.id, "subscription belongs to another clock");
            return false;
        }
        let mut registry = self.registry.lock();
        if let Some(pos) = registry.listeners.iter().position(|(id, _)| *id == subscription.id) {
            let _ = registry.listeners.remove(pos);
            return true;
        }
        if registry.in_flight.contains(&subscription.id) {
            registry.removed.push(subscription.id);
            return true;
        }
        false
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        let registry = self.registry.lock();
        registry.listeners.len() + registry.in_flight.len() - registry.removed.len()
    }

    /// Frames dispatched so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Advances to `now` and dispatches the resulting tick.
    ///
    /// The first call establishes the time base and dispatches [`FrameTick::ZERO`].
    pub fn advance(&self, now: Instant) -> FrameTick {
        let tick = {
            let mut last = self.last.lock();
            let tick = match *last {
                Some(prev) => FrameTick::from_interval(now.saturating_duration_since(prev)),
                None => FrameTick::ZERO,
            };
            *last = Some(now);
            tick
        };
        self.dispatch(tick);
        tick
    }

    /// Dispatches a tick to every listener. A nested or concurrent dispatch is skipped.
    pub fn dispatch(&self, tick: FrameTick) {
        let taken = {
            let mut registry = self.registry.lock();
            if registry.dispatching {
                tracing::trace!("dispatch already in progress, skipping");
                return;
            }
            registry.dispatching = true;
            let taken = std::mem::take(&mut registry.listeners);
            registry.in_flight = taken.iter().map(|(id, _)| *id).collect();
            taken
        };

        let mut restore = Restore { clock: self, taken };
        for (id, listener) in &mut restore.taken {
            // A listener removed earlier in this dispatch must not run.
            if self.registry.lock().removed.contains(id) {
                continue;
            }
            listener(tick);
        }
        drop(restore);

        self.frames.fetch_add(1, Ordering::Relaxed);
    }
}

/// Hands dispatched listeners back to the registry, also when one panics.
struct Restore<'a> {
    clock: &'a FrameClock,
    taken: Vec<(u64, Listener)>,
}

impl Drop for Restore<'_> {
    fn drop(&mut self) {
        let mut taken = std::mem::take(&mut self.taken);
        let mut registry = self.clock.registry.lock();
        let removed = std::mem::take(&mut registry.removed);
        taken.retain(|(id, _)| !removed.contains(id));
        taken.append(&mut registry.listeners);
        registry.listeners = taken;
        registry.in_flight.clear();
        registry.dispatching = false;
        if std::thread::panicking() {
            tracing::error!(listeners = registry.listeners.len(), "listener panicked during dispatch");
        }
    }
}
