//! Host-component binding: mount starts an engine, unmount tears it down
//! once its `init` has settled.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::backend::{Environment, RenderBackend};
use crate::config::AnimConfig;
use crate::engine::AnimEngine;
use crate::error::{EngineError, EngineResult};
use crate::host::HostElement;

/// A mounted engine and its in-flight `init`.
#[derive(Debug)]
pub struct AnimMount<B: RenderBackend> {
    engine: Option<Arc<AnimEngine<B>>>,
    init: Option<JoinHandle<EngineResult<()>>>,
}

impl<B: RenderBackend> AnimMount<B> {
    /// Creates an engine and spawns its `init` on the current tokio runtime.
    ///
    /// When the environment cannot draw, the mount is inert: nothing is
    /// spawned and [`AnimMount::unmount`] does nothing.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn mount<E, H, F>(config: AnimConfig, env: &E, host: H, on_ready: F) -> Self
    where
        E: Environment<Backend = B>,
        H: HostElement,
        F: FnOnce() + Send + 'static,
    {
        let Some(engine) = AnimEngine::create(config, env) else {
            return Self {
                engine: None,
                init: None,
            };
        };
        Self::spawn(Arc::new(engine), host, on_ready)
    }

    /// Mounts an already created engine.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<H, F>(engine: Arc<AnimEngine<B>>, host: H, on_ready: F) -> Self
    where
        H: HostElement,
        F: FnOnce() + Send + 'static,
    {
        let task = Arc::clone(&engine);
        let init = tokio::spawn(async move { task.init(host, on_ready).await });
        Self {
            engine: Some(engine),
            init: Some(init),
        }
    }

    /// The mounted engine, until unmount.
    #[must_use]
    pub fn engine(&self) -> Option<&Arc<AnimEngine<B>>> {
        self.engine.as_ref()
    }

    /// Whether an engine is mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.engine.is_some()
    }

    /// Drops the outward handle, waits for `init` to settle, then destroys.
    ///
    /// Returns the result of `init`. The engine is destroyed either way.
    pub async fn unmount(&mut self) -> EngineResult<()> {
        let Some(engine) = self.engine.take() else {
            return Ok(());
        };
        let result = match self.init.take() {
            Some(handle) => match handle.await {
                Ok(result) => result,
                Err(e) => Err(EngineError::InitAborted(e.to_string())),
            },
            None => Ok(()),
        };
        if let Err(e) = &result {
            tracing::warn!(error = %e, "init failed before unmount");
        }
        engine.destroy().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Phase;
    use crate::headless::{HeadlessEnvironment, HeadlessHost};
    use lumen_core::Size;

    #[tokio::test]
    async fn test_unavailable_environment_mounts_nothing() {
        let env = HeadlessEnvironment::unavailable();
        let host = HeadlessHost::new(Size::new(320.0, 240.0));
        let mut mount = AnimMount::mount(AnimConfig::new("img/pic-a.jpg"), &env, host, || {});
        assert!(!mount.is_mounted());
        assert!(mount.unmount().await.is_ok());
    }

    #[tokio::test]
    async fn test_unmount_waits_for_init_then_destroys() {
        let env = HeadlessEnvironment::new();
        let host = HeadlessHost::new(Size::new(320.0, 240.0));
        let mut mount = AnimMount::mount(AnimConfig::new("img/pic-b.jpg"), &env, host.clone(), || {});
        let engine = Arc::clone(mount.engine().expect("mounted"));
        mount.unmount().await.expect("init ok");
        assert!(!mount.is_mounted());
        assert_eq!(engine.phase(), Phase::Released);
        assert!(host.surfaces().is_empty());
        assert_eq!(host.removed().len(), 1);
    }
}
