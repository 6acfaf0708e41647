//! World Benchmarks
//!
//! Whole ticks over a tiled level with a crowd of falling, sliding actors

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use tilestep_core::Vec2;
use tilestep_physics::{
    BodyDesc, Collider, GravitySettings, LevelSet, PhysicsConfig, ScheduleMode, SlideSettings, TileLayer, TileLegend,
    TileLevel, World,
};

const SIZE: usize = 32;

fn build_world(actors: usize, schedule: ScheduleMode) -> World {
    let mut rows: Vec<String> = (0..SIZE - 1)
        .map(|y| {
            (0..SIZE)
                .map(|x| if x == 0 || x == SIZE - 1 || (y > 20 && x % 7 == 3) { '#' } else { '.' })
                .collect()
        })
        .collect();
    rows.push("#".repeat(SIZE));

    let layer = TileLayer::from_rows("ground", &rows, &TileLegend::default()).expect("valid layer");
    let mut levels = LevelSet::new();
    levels
        .add(TileLevel::new("bench", Vec2::new(0.0, SIZE as f32), SIZE, SIZE).with_layer(layer))
        .expect("valid level");

    let config = PhysicsConfig::default().with_schedule(schedule);
    let mut world = World::new(config, levels).expect("valid world");
    for i in 0..actors {
        let x = 2.0 + (i % (SIZE - 4)) as f32;
        let y = SIZE as f32 - 2.0 - (i / (SIZE - 4)) as f32 * 1.5;
        let desc = BodyDesc::actor(Vec2::new(x, y))
            .with_collider(Collider::square(Vec2::splat(0.8)))
            .with_velocity(Vec2::new(if i % 2 == 0 { 1.5 } else { -1.5 }, 0.0))
            .with_gravity(GravitySettings::default())
            .with_slide(SlideSettings::default());
        world.register(desc).expect("valid actor");
    }
    world
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_tick");

    for count in [10, 100, 250].iter() {
        for (name, schedule) in [("interleaved", ScheduleMode::Interleaved), ("sequential", ScheduleMode::Sequential)] {
            group.bench_with_input(BenchmarkId::new(name, count), count, |b, &count| {
                b.iter_batched(
                    || build_world(count, schedule),
                    |mut world| {
                        for _ in 0..10 {
                            world.tick();
                        }
                        black_box(world.diagnostics())
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

fn bench_raycast(c: &mut Criterion) {
    let world = build_world(100, ScheduleMode::Interleaved);

    c.bench_function("raycast_across_level", |b| {
        b.iter(|| {
            black_box(world.raycast(
                black_box(Vec2::new(1.5, 10.0)),
                Vec2::new(1.0, -0.25),
                40.0,
                tilestep_physics::BodyMask::all(),
            ))
        });
    });
}

criterion_group!(benches, bench_tick, bench_raycast);
criterion_main!(benches);
