//! # Emitter Benchmark
//!
//! Steady-state cost of one 60 Hz tick with the built-in config and a
//! full-HD spawn region.
//!
//! Run with: `cargo bench --package lumen_particles`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lumen_core::Rect;
use lumen_particles::{Emitter, EmitterConfig, SpawnShape};

fn warmed_emitter() -> Emitter {
    let config = EmitterConfig::builtin().expect("builtin config");
    let mut emitter = Emitter::with_seed(config, vec!["img/dot.png".into()], 1).expect("emitter");
    emitter.set_emit(true);
    emitter.update_spawn_pos(960.0, 540.0);
    for behavior in emitter.init_behaviors_mut() {
        if let Some(rect) = behavior.shape_mut().and_then(SpawnShape::as_rect_mut) {
            *rect = Rect::new(-960.0, -540.0, 1920.0, 540.0);
        }
    }
    // Reach steady state before measuring.
    for _ in 0..600 {
        emitter.update(1.0 / 60.0);
    }
    emitter
}

fn bench_tick(c: &mut Criterion) {
    let mut emitter = warmed_emitter();
    c.bench_function("emitter_tick_60hz", |b| {
        b.iter(|| {
            emitter.update(black_box(1.0 / 60.0));
            emitter.particle_count()
        });
    });
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
