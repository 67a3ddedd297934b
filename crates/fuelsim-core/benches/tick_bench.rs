//! Criterion benchmarks for the fuel simulation.
//!
//! Two benchmark groups:
//! - `server_tick`: one 1 s interval over 500 driven vehicles
//! - `snapshot`: serialize and restore 500 tracked vehicles

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use fuelsim_core::config::SimConfig;
use fuelsim_core::engine::FuelSimulation;
use fuelsim_core::fuel::FuelType;
use fuelsim_core::id::VehicleId;
use fuelsim_core::math::Vec3;
use fuelsim_core::sim::TickSample;
use fuelsim_core::store::MemoryStore;
use fuelsim_core::test_utils::*;

const FLEET: u32 = 500;

// ===========================================================================
// Fleet builders
// ===========================================================================

/// 500 tracked vehicles. Every tenth one runs on the wrong fuel so the
/// degradation path is exercised too.
fn build_fleet() -> FuelSimulation<MemoryStore> {
    let mut sim = FuelSimulation::new(SimConfig::default(), test_catalog(), MemoryStore::new());
    for i in 0..FLEET {
        let id = VehicleId(i);
        sim.register(id, test_model()).unwrap();
        sim.start_tracking(id, Vec3::ZERO, 50.0, 0.0).unwrap();
        if i % 10 == 0 {
            sim.refill(id, None, Some(FuelType::Diesel)).unwrap();
        }
    }
    sim
}

fn samples_at(second: u32) -> Vec<TickSample> {
    (0..FLEET)
        .map(|i| TickSample {
            vehicle: VehicleId(i),
            position: Vec3::new(f64::from(second) * 12.0, f64::from(i), 0.0),
            timestamp: f64::from(second),
            engine_on: true,
        })
        .collect()
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_server_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("server_tick");

    group.bench_function("tick_all_500_vehicles", |b| {
        b.iter_batched(
            || (build_fleet(), samples_at(1)),
            |(mut sim, samples)| {
                sim.tick_all(samples);
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("tick_500_vehicles_x60", |b| {
        b.iter_batched(
            build_fleet,
            |mut sim| {
                for second in 1..=60 {
                    sim.tick_all(samples_at(second));
                }
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    let mut sim = build_fleet();
    sim.tick_all(samples_at(1));

    group.bench_function("snapshot_500_vehicles", |b| {
        b.iter(|| {
            sim.snapshot().unwrap();
        });
    });

    let data = sim.snapshot().unwrap();
    group.bench_function("restore_500_vehicles", |b| {
        b.iter_batched(
            empty_sim,
            |mut fresh| {
                fresh.restore(&data).unwrap();
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_server_tick, bench_snapshot);
criterion_main!(benches);
