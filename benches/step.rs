use std::time::Instant;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use mergeflow::{ArrivalGenerator, ArrivalSchedule, SystemConfig, TrafficSystem, DEFAULT_SEED};

fn make_system(west: f64, south: f64) -> TrafficSystem<ArrivalGenerator> {
    let schedule = ArrivalSchedule::constant(west, south).unwrap();
    let generator = ArrivalGenerator::new(schedule, DEFAULT_SEED);
    TrafficSystem::new(SystemConfig::default(), generator).unwrap()
}

fn bench_step_light_traffic(c: &mut Criterion) {
    c.bench_function("step/light_traffic", |b| {
        b.iter_custom(|iters| {
            // Fresh system per sample so queue growth does not leak between samples.
            let mut system = make_system(0.1, 0.1);
            let start = Instant::now();
            for _ in 0..iters {
                system.step().unwrap();
            }
            start.elapsed()
        });
    });
}

fn bench_step_saturated(c: &mut Criterion) {
    c.bench_function("step/saturated", |b| {
        b.iter_custom(|iters| {
            let mut system = make_system(0.5, 0.5);
            let start = Instant::now();
            for _ in 0..iters {
                system.step().unwrap();
            }
            start.elapsed()
        });
    });
}

fn bench_run_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_throughput");
    group.throughput(Throughput::Elements(10_000));

    group.bench_function("run_10k_ticks", |b| {
        b.iter(|| {
            let mut system = make_system(0.3, 0.2);
            system.run(10_000).unwrap();
            system.statistics()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_step_light_traffic,
    bench_step_saturated,
    bench_run_throughput
);
criterion_main!(benches);
