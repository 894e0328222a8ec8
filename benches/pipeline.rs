//! Decision pipeline benchmarks
//!
//! Measures one pilot tick and raw sector merging at growing entity counts.
//!
//! Run with: cargo bench --bench pipeline

use cell_pilot::bot::pilot::{Memory, Pilot};
use cell_pilot::bot::sectors::{merge_by_priority, AngleSector, TaggedSector};
use cell_pilot::config::BotConfig;
use cell_pilot::world::snapshot::{Bounds, Entity, SelfState, WorldSnapshot};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random scene around an agent in the middle of the arena
fn create_scene(count: usize, seed: u64) -> WorldSnapshot {
    let mut rng = StdRng::seed_from_u64(seed);
    let bounds = Bounds::default();
    let me = SelfState::new(5_590.0, 5_590.0, 80.0);

    let entities = (0..count)
        .map(|i| {
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let radius = rng.gen_range(50.0..2_500.0);
            let x = me.x + angle.cos() * radius;
            let y = me.y + angle.sin() * radius;

            match i % 10 {
                // Mostly pellets, a few cells of every kind
                0 => Entity::new(i as u32, x, y, rng.gen_range(100.0..300.0)),
                1 => Entity::hazard(i as u32, x, y, rng.gen_range(40.0..70.0)),
                2 | 3 => Entity::new(i as u32, x, y, rng.gen_range(20.0..60.0)),
                _ => Entity::new(i as u32, x, y, rng.gen_range(5.0..13.0)),
            }
        })
        .collect();

    WorldSnapshot::new(1_000, Some(me), bounds).with_entities(entities)
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    group.sample_size(50);
    let pilot = Pilot::new(BotConfig::default());

    for count in [10, 50, 100, 250, 500] {
        let scene = create_scene(count, count as u64);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("entities", count), &scene, |b, scene| {
            b.iter(|| black_box(pilot.tick(Memory::new(0), scene)));
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for count in [4, 16, 64, 256] {
        let mut rng = StdRng::seed_from_u64(42);
        let sectors: Vec<TaggedSector> = (0..count)
            .map(|_| {
                TaggedSector::new(
                    AngleSector::new(rng.gen_range(0.0..360.0), rng.gen_range(1.0..30.0)),
                    rng.gen_range(0.0..2_000.0),
                )
            })
            .collect();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("sectors", count), &sectors, |b, sectors| {
            b.iter(|| black_box(merge_by_priority(sectors.clone())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick, bench_merge);
criterion_main!(benches);
