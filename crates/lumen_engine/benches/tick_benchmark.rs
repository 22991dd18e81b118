//! # Tick Benchmark
//!
//! Per-frame cost of the engine's hot path: motion over a built particle
//! scene, and clock fan-out across several subscribers.
//!
//! Run with: `cargo bench --package lumen_engine`

// Benchmarks don't need docs
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lumen_core::Size;
use lumen_engine::{BuiltScene, FrameClock, FrameTick, LayoutEngine, MotionController, SceneBuilder, TextureInfo};
use lumen_particles::EmitterConfig;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const FRAME: Duration = Duration::from_micros(16_667);

fn laid_out_scene() -> BuiltScene {
    let config = EmitterConfig::builtin().expect("builtin config");
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut built = SceneBuilder::new(TextureInfo::new("img/pic-b.jpg", Size::new(1200.0, 800.0)))
        .with_particles(config, vec!["img/dot.png".into()])
        .build(&mut rng)
        .expect("scene");
    LayoutEngine::new().apply(Size::new(1920.0, 1080.0), &mut built.scene, built.emitter.as_mut());
    built
}

fn bench_motion(c: &mut Criterion) {
    let mut built = laid_out_scene();
    let mut motion = MotionController::new();
    let tick = FrameTick::from_interval(FRAME);
    // Fill the emitter before measuring.
    for _ in 0..600 {
        motion.tick(tick, &mut built.scene, &mut built.filters, &mut built.tweens, built.emitter.as_mut());
    }

    c.bench_function("motion_tick_particles", |b| {
        b.iter(|| {
            motion.tick(
                black_box(tick),
                &mut built.scene,
                &mut built.filters,
                &mut built.tweens,
                built.emitter.as_mut(),
            );
        });
    });
}

fn bench_clock_fanout(c: &mut Criterion) {
    let clock = FrameClock::new();
    let _subs: Vec<_> = (0..4)
        .map(|_| {
            let mut frames = 0u64;
            clock.add(move |tick| {
                frames += u64::from(tick.delta_ms > 0.0);
            })
        })
        .collect();
    let tick = FrameTick::from_interval(FRAME);

    c.bench_function("clock_dispatch_4_listeners", |b| {
        b.iter(|| clock.dispatch(black_box(tick)));
    });
}

criterion_group!(benches, bench_motion, bench_clock_fanout);
criterion_main!(benches);
