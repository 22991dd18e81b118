//! # Host Binding
//!
//! The host element owns the engine's drawing surface on screen and reports
//! its content-box size. Size changes travel over a channel:
//!
//! ```text
//!   HostElement ──ResizeSink::notify(batch)──▶ channel ──▶ ResizeObserver
//!                                                              │ debounce
//!                                                              ▼
//!                                           AnimEngine::pump (idle opportunity)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use lumen_core::{Debounce, Size};

use crate::backend::SurfaceId;

/// One observed content-box size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeRecord {
    /// Content-box width in device-independent pixels.
    pub width: f32,
    /// Content-box height in device-independent pixels.
    pub height: f32,
}

impl SizeRecord {
    /// Creates a record.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The record as whole-pixel dimensions.
    #[must_use]
    pub fn rounded(&self) -> Size {
        Size::new(self.width, self.height).rounded()
    }
}

/// The element an engine attaches its surface to.
pub trait HostElement: Send + 'static {
    /// Current content-box size.
    fn content_size(&self) -> Size;

    /// Places the surface's view inside the element.
    fn append_surface(&mut self, surface: SurfaceId);

    /// Removes the surface's view from the element.
    fn remove_surface(&mut self, surface: SurfaceId);

    /// Starts delivering content-box changes to `sink`.
    fn observe_content_box(&mut self, sink: ResizeSink);
}

/// Sending half of a resize observer, held by the host.
#[derive(Debug, Clone)]
pub struct ResizeSink {
    tx: Sender<Vec<SizeRecord>>,
    connected: Arc<AtomicBool>,
}

impl ResizeSink {
    /// Delivers one batch of records. Returns false once the observer is disconnected.
    pub fn notify(&self, batch: Vec<SizeRecord>) -> bool {
        if !self.is_connected() {
            return false;
        }
        self.tx.send(batch).is_ok()
    }

    /// Whether the observer still listens.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

/// Receiving half: collapses bursts of notifications into one size.
#[derive(Debug)]
pub struct ResizeObserver {
    rx: Option<Receiver<Vec<SizeRecord>>>,
    debounce: Debounce<Vec<SizeRecord>>,
    connected: Arc<AtomicBool>,
    batches: u64,
}

impl ResizeObserver {
    /// Creates an observer and the sink to hand to the host.
    #[must_use]
    pub fn new(delay: Duration) -> (Self, ResizeSink) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let connected = Arc::new(AtomicBool::new(true));
        let sink = ResizeSink {
            tx,
            connected: Arc::clone(&connected),
        };
        let observer = Self {
            rx: Some(rx),
            debounce: Debounce::new(delay),
            connected,
            batches: 0,
        };
        (observer, sink)
    }

    /// Drains pending batches into the debouncer and returns the settled size, if any.
    ///
    /// Only the most recent batch survives a window; its first record, rounded,
    /// is the result. An empty batch yields nothing.
    pub fn poll(&mut self, now: Instant) -> Option<Size> {
        if let Some(rx) = &self.rx {
            loop {
                match rx.try_recv() {
                    Ok(batch) => {
                        self.batches += 1;
                        self.debounce.call(batch, now);
                    }
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                }
            }
        }
        let collapsed = self.debounce.collapsed();
        let batch = self.debounce.poll(now)?;
        let first = batch.first()?;
        tracing::trace!(collapsed, records = batch.len(), "resize settled");
        Some(first.rounded())
    }

    /// Whether a batch is waiting for its window to close.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Batches received so far.
    #[must_use]
    pub fn batches(&self) -> u64 {
        self.batches
    }

    /// Stops observing. Pending batches are dropped.
    pub fn disconnect(&mut self) {
        self.connected.store(false, Ordering::Release);
        self.rx = None;
        if self.debounce.is_pending() {
            tracing::debug!(collapsed = self.debounce.collapsed(), "pending resize dropped on disconnect");
        }
        self.debounce.cancel();
    }

    /// Whether [`ResizeObserver::disconnect`] has not been called.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.rx.is_some()
    }
}
