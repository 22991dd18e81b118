//! # Headless Runtime
//!
//! A backend, host and environment that draw nothing and record
//! everything. Used by the test suite and by embedders that want the
//! engine's timing without a display.
//!
//! All three are cheap handles over shared state: clone one, hand the clone
//! to the engine, and inspect the original.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use lumen_core::Size;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::backend::{DestroyOptions, Environment, Frame, RenderBackend, SurfaceId, SurfaceOptions, TextureInfo};
use crate::error::{EngineError, EngineResult};
use crate::host::{HostElement, ResizeSink, SizeRecord};

/// Native size reported for textures with no registered size.
pub const DEFAULT_TEXTURE_SIZE: Size = Size::new(1200.0, 800.0);

/// Everything a [`HeadlessBackend`] was asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendLog {
    /// Created surfaces and their options.
    pub surfaces: Vec<(SurfaceId, SurfaceOptions)>,
    /// Texture paths requested, in order.
    pub loads: Vec<String>,
    /// Surface resizes.
    pub resizes: Vec<(SurfaceId, Size)>,
    /// Frames rendered.
    pub frames: u64,
    /// Drawables in the last rendered frame.
    pub last_drawables: usize,
    /// Destroyed surfaces and the options used.
    pub destroyed: Vec<(SurfaceId, DestroyOptions)>,
}

#[derive(Debug, Default)]
struct BackendShared {
    log: BackendLog,
    next_surface: u64,
    sizes: HashMap<String, Size>,
    failing: HashSet<String>,
}

/// A backend that records calls instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    shared: Arc<Mutex<BackendShared>>,
    gate: Option<Arc<Notify>>,
}

impl HeadlessBackend {
    /// A backend that loads every texture at [`DEFAULT_TEXTURE_SIZE`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports `size` for textures loaded from `path`.
    #[must_use]
    pub fn with_texture(self, path: impl Into<String>, size: Size) -> Self {
        self.shared.lock().sizes.insert(path.into(), size);
        self
    }

    /// Makes loads of `path` fail.
    #[must_use]
    pub fn with_failing(self, path: impl Into<String>) -> Self {
        self.shared.lock().failing.insert(path.into());
        self
    }

    /// Holds every texture load until `gate` is notified once per load.
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Copy of the call log.
    #[must_use]
    pub fn log(&self) -> BackendLog {
        self.shared.lock().log.clone()
    }
}

impl RenderBackend for HeadlessBackend {
    async fn init_surface(&mut self, options: &SurfaceOptions, _initial: Size) -> EngineResult<SurfaceId> {
        let mut shared = self.shared.lock();
        shared.next_surface += 1;
        let id = SurfaceId(shared.next_surface);
        shared.log.surfaces.push((id, *options));
        Ok(id)
    }

    async fn load_texture(&mut self, path: &str) -> EngineResult<TextureInfo> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let mut shared = self.shared.lock();
        shared.log.loads.push(path.to_owned());
        if shared.failing.contains(path) {
            return Err(EngineError::asset(path, "not found"));
        }
        let size = shared.sizes.get(path).copied().unwrap_or(DEFAULT_TEXTURE_SIZE);
        Ok(TextureInfo::new(path, size))
    }

    fn resize_surface(&mut self, surface: SurfaceId, size: Size) {
        self.shared.lock().log.resizes.push((surface, size));
    }

    fn render(&mut self, _surface: SurfaceId, frame: &Frame<'_>) -> EngineResult<()> {
        let mut shared = self.shared.lock();
        shared.log.frames += 1;
        shared.log.last_drawables = frame.drawable_count();
        Ok(())
    }

    async fn destroy_surface(&mut self, surface: SurfaceId, options: &DestroyOptions) {
        self.shared.lock().log.destroyed.push((surface, *options));
    }
}

/// An environment handing out clones of one [`HeadlessBackend`].
#[derive(Debug, Clone)]
pub struct HeadlessEnvironment {
    pixel_ratio: f32,
    backend: Option<HeadlessBackend>,
}

impl Default for HeadlessEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessEnvironment {
    /// A unit-ratio environment with a default backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pixel_ratio: 1.0,
            backend: Some(HeadlessBackend::new()),
        }
    }

    /// An environment where nothing can draw.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            pixel_ratio: 1.0,
            backend: None,
        }
    }

    /// Sets the device pixel ratio.
    #[must_use]
    pub fn with_pixel_ratio(mut self, ratio: f32) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    /// Uses `backend` as the template for every engine.
    #[must_use]
    pub fn with_backend(mut self, backend: HeadlessBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// The backend template, if any.
    #[must_use]
    pub fn backend(&self) -> Option<&HeadlessBackend> {
        self.backend.as_ref()
    }
}

impl Environment for HeadlessEnvironment {
    type Backend = HeadlessBackend;

    fn device_pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn create_backend(&self) -> Option<HeadlessBackend> {
        self.backend.clone()
    }
}

#[derive(Debug, Default)]
struct HostState {
    size: Size,
    surfaces: Vec<SurfaceId>,
    removed: Vec<SurfaceId>,
    sink: Option<ResizeSink>,
}

/// A host element with a settable size.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    state: Arc<Mutex<HostState>>,
}

impl HeadlessHost {
    /// A host with the given content size.
    #[must_use]
    pub fn new(size: Size) -> Self {
        let host = Self::default();
        host.state.lock().size = size;
        host
    }

    /// Changes the content size and notifies the observer, if any.
    /// Returns true if the observer received it.
    pub fn resize(&self, width: f32, height: f32) -> bool {
        self.state.lock().size = Size::new(width, height);
        self.notify(vec![SizeRecord::new(width, height)])
    }

    /// Delivers a raw batch to the observer.
    pub fn notify(&self, batch: Vec<SizeRecord>) -> bool {
        let sink = self.state.lock().sink.clone();
        sink.is_some_and(|s| s.notify(batch))
    }

    /// Whether a connected observer is attached.
    #[must_use]
    pub fn is_observed(&self) -> bool {
        self.state.lock().sink.as_ref().is_some_and(ResizeSink::is_connected)
    }

    /// Surfaces currently attached.
    #[must_use]
    pub fn surfaces(&self) -> Vec<SurfaceId> {
        self.state.lock().surfaces.clone()
    }

    /// Surfaces detached so far.
    #[must_use]
    pub fn removed(&self) -> Vec<SurfaceId> {
        self.state.lock().removed.clone()
    }
}

impl HostElement for HeadlessHost {
    fn content_size(&self) -> Size {
        self.state.lock().size
    }

    fn append_surface(&mut self, surface: SurfaceId) {
        self.state.lock().surfaces.push(surface);
    }

    fn remove_surface(&mut self, surface: SurfaceId) {
        let mut state = self.state.lock();
        state.surfaces.retain(|s| *s != surface);
        state.removed.push(surface);
    }

    fn observe_content_box(&mut self, sink: ResizeSink) {
        self.state.lock().sink = Some(sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_backend_records_loads_and_failures() {
        let mut backend = HeadlessBackend::new()
            .with_texture("a.png", Size::new(4.0, 2.0))
            .with_failing("missing.png");
        let info = backend.load_texture("a.png").await.expect("load");
        assert_eq!(info.size, Size::new(4.0, 2.0));
        let other = backend.load_texture("b.png").await.expect("load");
        assert_eq!(other.size, DEFAULT_TEXTURE_SIZE);
        assert!(matches!(
            backend.load_texture("missing.png").await,
            Err(EngineError::AssetLoad { .. })
        ));
        assert_eq!(backend.log().loads.len(), 3);
    }

    #[test]
    fn test_host_without_observer_drops_resizes() {
        let host = HeadlessHost::new(Size::new(10.0, 10.0));
        assert!(!host.resize(20.0, 20.0));
        assert_eq!(host.content_size(), Size::new(20.0, 20.0));
        assert!(!host.is_observed());
    }
}
