//! # Engine Lifecycle Tests
//!
//! init → first layout → ticks → destroy, driven through the headless
//! runtime on a private clock.
//!
//! Run with: cargo test --package lumen_engine --test lifecycle

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lumen_core::Size;
use lumen_engine::headless::{HeadlessBackend, HeadlessEnvironment, HeadlessHost};
use lumen_engine::motion::crt_noise;
use lumen_engine::{
    AnimConfig, AnimEngine, DestroyOptions, EngineError, FrameClock, FrameTick, NodeKey, Phase,
};
use tokio::sync::Notify;

const FRAME: Duration = Duration::from_micros(16_667);

fn engine_on(
    config: AnimConfig,
    env: &HeadlessEnvironment,
) -> (AnimEngine<HeadlessBackend>, Arc<FrameClock>) {
    let clock = Arc::new(FrameClock::new());
    let engine = AnimEngine::with_clock(config, env, Arc::clone(&clock)).expect("backend available");
    (engine, clock)
}

// ============================================================================
// INIT
// ============================================================================

#[tokio::test]
async fn init_attaches_after_loading_and_reports_ready_once() {
    let env = HeadlessEnvironment::new();
    let (engine, _clock) = engine_on(AnimConfig::new("img/pic-a.jpg").with_base_path("/site"), &env);
    let host = HeadlessHost::new(Size::new(800.0, 600.0));
    let ready = Arc::new(AtomicUsize::new(0));

    let r = Arc::clone(&ready);
    engine
        .init(host.clone(), move || {
            r.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .expect("init");

    assert_eq!(ready.load(Ordering::SeqCst), 1);
    assert_eq!(host.surfaces().len(), 1);
    assert!(host.is_observed());

    let log = env.backend().expect("backend").log();
    assert_eq!(log.loads, vec!["/site/img/pic-a.jpg".to_string()]);
    assert_eq!(log.surfaces.len(), 1);
    assert!(log.surfaces[0].1.antialias);

    // Nothing is built before the first size arrives.
    let snap = engine.snapshot();
    assert_eq!(snap.phase, Phase::AwaitingFirstLayout);
    assert_eq!(snap.scene_builds, 0);
    assert_eq!(snap.drawables, 0);
}

#[tokio::test]
async fn particles_mode_loads_the_sprite_too() {
    let env = HeadlessEnvironment::new();
    let (engine, _clock) = engine_on(AnimConfig::new("img/pic-b.jpg").with_particles(true), &env);
    engine
        .init(HeadlessHost::new(Size::new(1000.0, 400.0)), || {})
        .await
        .expect("init");
    let log = env.backend().expect("backend").log();
    assert_eq!(log.loads, vec!["img/pic-b.jpg".to_string(), "img/dot.png".to_string()]);
}

#[tokio::test]
async fn second_init_is_ignored() {
    let env = HeadlessEnvironment::new();
    let (engine, _clock) = engine_on(AnimConfig::new("img/pic-a.jpg"), &env);
    let host = HeadlessHost::new(Size::new(800.0, 600.0));
    engine.init(host.clone(), || {}).await.expect("init");
    engine.init(host.clone(), || {}).await.expect("no-op");
    assert_eq!(host.surfaces().len(), 1);
    assert_eq!(env.backend().expect("backend").log().surfaces.len(), 1);
}

#[tokio::test]
async fn asset_failure_aborts_init() {
    let backend = HeadlessBackend::new().with_failing("img/pic-a.jpg");
    let env = HeadlessEnvironment::new().with_backend(backend);
    let (engine, clock) = engine_on(AnimConfig::new("img/pic-a.jpg"), &env);
    let host = HeadlessHost::new(Size::new(800.0, 600.0));
    let ready = Arc::new(AtomicUsize::new(0));

    let r = Arc::clone(&ready);
    let result = engine
        .init(host.clone(), move || {
            r.fetch_add(1, Ordering::SeqCst);
        })
        .await;

    assert!(matches!(result, Err(EngineError::AssetLoad { ref path, .. }) if path == "img/pic-a.jpg"));
    assert_eq!(ready.load(Ordering::SeqCst), 0);
    assert!(host.surfaces().is_empty());
    assert!(!host.is_observed());
    assert!(!host.resize(640.0, 480.0));
    assert!(!engine.pump(Instant::now()));
    assert_eq!(clock.listener_count(), 0);
    assert_eq!(engine.snapshot().scene_builds, 0);

    // The surface created before the failure is still released.
    engine.destroy().await;
    let log = env.backend().expect("backend").log();
    assert_eq!(log.destroyed.len(), 1);
    assert!(host.removed().is_empty());
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let env = HeadlessEnvironment::new();
    let (engine, _clock) = engine_on(AnimConfig::new(""), &env);
    let result = engine.init(HeadlessHost::new(Size::new(10.0, 10.0)), || {}).await;
    assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
}

#[test]
fn unavailable_environment_yields_no_engine() {
    let env = HeadlessEnvironment::unavailable();
    assert!(AnimEngine::create(AnimConfig::new("img/pic-a.jpg"), &env).is_none());
}

// ============================================================================
// FIRST LAYOUT AND TICKS
// ============================================================================

#[tokio::test]
async fn scene_is_built_exactly_once_across_resizes() {
    let env = HeadlessEnvironment::new();
    let (engine, clock) = engine_on(AnimConfig::new("img/pic-a.jpg").with_seed(1), &env);
    let host = HeadlessHost::new(Size::new(800.0, 600.0));
    engine.init(host.clone(), || {}).await.expect("init");

    let sizes = [(800.0, 600.0), (1024.0, 768.0), (300.0, 900.0), (1.0, 1.0), (1920.0, 1080.0)];
    for (w, h) in sizes {
        assert!(host.resize(w, h));
        assert!(engine.pump(Instant::now()));
    }

    let snap = engine.snapshot();
    assert_eq!(snap.phase, Phase::Running);
    assert_eq!(snap.scene_builds, 1);
    assert_eq!(snap.layout_passes, 5);
    assert_eq!(snap.size, Size::new(1920.0, 1080.0));
    assert_eq!(clock.listener_count(), 1);

    let log = env.backend().expect("backend").log();
    assert_eq!(log.resizes.len(), 5);
}

#[tokio::test]
async fn burst_of_notifications_lays_out_once_with_last_size() {
    let env = HeadlessEnvironment::new();
    let mut config = AnimConfig::new("img/pic-a.jpg");
    config.resize_debounce_ms = 50;
    let (engine, _clock) = engine_on(config, &env);
    let host = HeadlessHost::new(Size::new(800.0, 600.0));
    engine.init(host.clone(), || {}).await.expect("init");

    let t0 = Instant::now();
    for i in 0..6u8 {
        host.resize(500.0 + f32::from(i) * 10.0, 400.0);
    }
    assert!(!engine.pump(t0));
    assert!(engine.pump(t0 + Duration::from_millis(50)));
    assert!(!engine.pump(t0 + Duration::from_millis(100)));

    let snap = engine.snapshot();
    assert_eq!(snap.layout_passes, 1);
    assert_eq!(snap.size, Size::new(550.0, 400.0));
}

#[tokio::test]
async fn zero_delay_fires_at_next_pump() {
    let env = HeadlessEnvironment::new();
    let (engine, _clock) = engine_on(AnimConfig::new("img/pic-a.jpg"), &env);
    let host = HeadlessHost::new(Size::new(800.0, 600.0));
    engine.init(host.clone(), || {}).await.expect("init");

    host.resize(10.0, 10.0);
    host.resize(20.0, 20.0);
    assert!(engine.pump(Instant::now()));
    assert_eq!(engine.snapshot().layout_passes, 1);
    assert_eq!(engine.snapshot().size, Size::new(20.0, 20.0));
}

#[tokio::test]
async fn ticks_advance_motion_and_render() {
    let env = HeadlessEnvironment::new();
    let (engine, clock) = engine_on(AnimConfig::new("img/pic-a.jpg").with_seed(9), &env);
    let host = HeadlessHost::new(Size::new(800.0, 600.0));
    engine.init(host.clone(), || {}).await.expect("init");
    host.resize(800.0, 600.0);
    engine.pump(Instant::now());

    // Two seconds of frames.
    for _ in 0..120 {
        clock.dispatch(FrameTick::from_interval(FRAME));
    }

    let snap = engine.snapshot();
    assert_eq!(snap.frames_rendered, 121);
    assert!((snap.motion.elapsed - 2.0).abs() < 1e-2);
    assert!(snap.swaps >= 1, "the diamond leaves the square within the first second");

    let (square_front, alpha, noise) = engine
        .inspect(|scene, filters| {
            (
                scene.artboard.is_front(NodeKey::Square),
                scene.background.alpha,
                filters.crt.noise,
            )
        })
        .expect("scene");
    assert_eq!(square_front, snap.motion.square_on_top);
    assert!(alpha > 0.0 && alpha < 1.0, "fade-in still running");
    assert!((noise - crt_noise(snap.motion.elapsed)).abs() < 1e-5);
    assert_eq!(env.backend().expect("backend").log().frames, 121);
}

#[tokio::test]
async fn particles_spawn_once_running() {
    let env = HeadlessEnvironment::new();
    let (engine, clock) = engine_on(AnimConfig::new("img/pic-b.jpg").with_particles(true).with_seed(2), &env);
    let host = HeadlessHost::new(Size::new(1000.0, 400.0));
    engine.init(host.clone(), || {}).await.expect("init");
    host.resize(1000.0, 400.0);
    engine.pump(Instant::now());

    for _ in 0..30 {
        clock.dispatch(FrameTick::from_interval(FRAME));
    }
    let snap = engine.snapshot();
    assert!(snap.particles > 0);
    assert_eq!(snap.drawables, 7);
}

// ============================================================================
// DESTROY
// ============================================================================

#[tokio::test]
async fn destroy_releases_everything() {
    let env = HeadlessEnvironment::new();
    let (engine, clock) = engine_on(AnimConfig::new("img/pic-b.jpg").with_particles(true), &env);
    let host = HeadlessHost::new(Size::new(800.0, 600.0));
    engine.init(host.clone(), || {}).await.expect("init");
    host.resize(800.0, 600.0);
    engine.pump(Instant::now());
    let surface = host.surfaces()[0];

    engine.destroy().await;

    let snap = engine.snapshot();
    assert_eq!(snap.phase, Phase::Released);
    assert!(!snap.subscribed);
    assert!(!snap.observing);
    assert_eq!(snap.drawables, 0);
    assert_eq!(snap.live_filters, 0);
    assert_eq!(snap.tweens, 0);
    assert_eq!(snap.particles, 0);
    assert_eq!(snap.surface, None);
    assert_eq!(clock.listener_count(), 0);
    assert!(!host.is_observed());
    assert!(host.surfaces().is_empty());
    assert_eq!(host.removed(), vec![surface]);

    let log = env.backend().expect("backend").log();
    assert_eq!(log.destroyed, vec![(surface, DestroyOptions::ENGINE)]);
}

#[tokio::test]
async fn destroy_twice_is_a_no_op() {
    let env = HeadlessEnvironment::new();
    let (engine, _clock) = engine_on(AnimConfig::new("img/pic-a.jpg"), &env);
    let host = HeadlessHost::new(Size::new(800.0, 600.0));
    engine.init(host.clone(), || {}).await.expect("init");
    host.resize(800.0, 600.0);
    engine.pump(Instant::now());

    engine.destroy().await;
    let first = engine.snapshot();
    engine.destroy().await;
    assert_eq!(engine.snapshot(), first);
    assert_eq!(env.backend().expect("backend").log().destroyed.len(), 1);
    assert_eq!(host.removed().len(), 1);
}

#[tokio::test]
async fn calls_after_destroy_do_nothing() {
    let env = HeadlessEnvironment::new();
    let (engine, clock) = engine_on(AnimConfig::new("img/pic-a.jpg"), &env);
    let host = HeadlessHost::new(Size::new(800.0, 600.0));
    engine.init(host.clone(), || {}).await.expect("init");
    host.resize(800.0, 600.0);
    engine.pump(Instant::now());
    engine.destroy().await;
    let frames = env.backend().expect("backend").log().frames;

    clock.dispatch(FrameTick::from_interval(FRAME));
    assert!(!host.resize(300.0, 300.0));
    assert!(!engine.pump(Instant::now()));
    engine.init(HeadlessHost::new(Size::new(1.0, 1.0)), || {}).await.expect("no-op");

    let log = env.backend().expect("backend").log();
    assert_eq!(log.frames, frames);
    assert_eq!(log.surfaces.len(), 1);
    assert_eq!(engine.phase(), Phase::Released);
}

#[tokio::test]
async fn destroy_before_init_is_safe() {
    let env = HeadlessEnvironment::new();
    let (engine, _clock) = engine_on(AnimConfig::new("img/pic-a.jpg"), &env);
    engine.destroy().await;
    assert_eq!(engine.phase(), Phase::Released);
    assert!(env.backend().expect("backend").log().destroyed.is_empty());
}

#[tokio::test]
async fn destroy_waits_for_pending_init() {
    let gate = Arc::new(Notify::new());
    let env = HeadlessEnvironment::new().with_backend(HeadlessBackend::new().with_gate(Arc::clone(&gate)));
    let (engine, clock) = engine_on(AnimConfig::new("img/pic-a.jpg"), &env);
    let engine = Arc::new(engine);
    let host = HeadlessHost::new(Size::new(800.0, 600.0));

    let init = tokio::spawn({
        let engine = Arc::clone(&engine);
        let host = host.clone();
        async move { engine.init(host, || {}).await }
    });
    tokio::task::yield_now().await;

    let destroy = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.destroy().await }
    });
    tokio::task::yield_now().await;

    // Loading is parked, so teardown has not started.
    assert_eq!(engine.phase(), Phase::AwaitingFirstLayout);
    assert!(!destroy.is_finished());

    gate.notify_one();
    init.await.expect("join").expect("init");
    destroy.await.expect("join");

    assert_eq!(engine.phase(), Phase::Released);
    assert!(host.surfaces().is_empty());
    assert_eq!(host.removed().len(), 1);
    assert!(!host.is_observed());
    assert_eq!(clock.listener_count(), 0);
}
