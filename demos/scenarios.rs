use tempo_sim::prelude::*;

fn main() -> Result<(), SimulationError> {
    // The simulator bundles everything shared by the scenarios of a run: the
    // rate constants, the enzyme/reporter/volume amounts and the time grid.
    // Here we keep the reference constants and amounts and only shorten the grid.
    let simulator = SimulatorBuilder::default()
        .setup(
            SimulationSetupBuilder::default()
                .t1(1800.0)
                .n_points(31)
                .build()
                .expect("Failed to build simulation setup"),
        )
        .build()
        .expect("Failed to build simulator");

    // Scenarios name the probe loads of an assay. Next to the three reference
    // combinations we add one that starts with a small recycled template pool
    // and slows down the binding of the second-track primer.
    let mut scenarios = default_scenarios();
    scenarios.insert(
        "FP/FPP/BP + D2".to_string(),
        ScenarioBuilder::default()
            .fp0(0.2)
            .bp0(0.4)
            .fpp0(0.2)
            .d2_0(1e-6)
            .k6(0.04)
            .build()
            .expect("Failed to build scenario"),
    );

    // A single scenario can be integrated on its own; failures come back as
    // errors carrying the scenario name.
    let trajectory = simulator.simulate("FP/BP", &scenarios["FP/BP"])?;
    if let Some((t, value)) = trajectory.peak(Species::F) {
        println!("FP/BP: F reaches {value:.4e} μM at t = {t} s");
    }

    // Batches run every scenario and keep going past failing ones
    let results = simulator.simulate_batch(&scenarios);

    // The reporter turns trajectories into F-over-minutes series and a summary
    let reporter = Reporter::default();
    println!("{}", reporter.summarize(&results));

    for (name, series) in reporter.collect(&results) {
        let (t, f) = series.last().unwrap_or_default();
        println!("{name:>16}: F({t} min) = {f:.4e} μM");
    }

    Ok(())
}
