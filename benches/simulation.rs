use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tempo_sim::prelude::*;

fn setup_simulation() -> (Simulator, ScenarioSet, PreparedScenario) {
    let simulator = SimulatorBuilder::default()
        .setup(
            SimulationSetupBuilder::default()
                .t1(3600.0)
                .n_points(1001)
                .build()
                .expect("Failed to build simulation setup"),
        )
        .build()
        .expect("Failed to build simulator");

    let scenarios = default_scenarios();
    let prepared = scenarios["FP/FPP/BP"]
        .prepare(
            "FP/FPP/BP",
            &simulator.constants,
            &simulator.amounts,
        )
        .expect("Failed to prepare scenario");

    (simulator, scenarios, prepared)
}

fn benchmark_simulation(c: &mut Criterion) {
    let (simulator, scenarios, prepared) = setup_simulation();
    let network = ReactionNetwork::new(prepared.constants);

    c.bench_function("rhs_evaluation", |b| {
        let mut dy = vec![0.0; N_SPECIES];
        b.iter(|| {
            derivative(
                0.0,
                black_box(&prepared.y0),
                network.constants(),
                black_box(&mut dy),
            );
        });
    });

    c.bench_function("scenario_integration", |b| {
        b.iter(|| {
            let _ = black_box(simulator.integrate(black_box(&prepared)));
        });
    });

    c.bench_function("batch_integration", |b| {
        b.iter(|| {
            let _ = black_box(simulator.simulate_batch(black_box(&scenarios)));
        });
    });

    #[cfg(feature = "parallel")]
    c.bench_function("parallel_batch_integration", |b| {
        b.iter(|| {
            let _ = black_box(simulator.par_simulate_batch(black_box(&scenarios)));
        });
    });
}

criterion_group!(benches, benchmark_simulation);
criterion_main!(benches);
