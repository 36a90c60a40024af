use super::config::{ConcurrencyMode, ExecutionConfig};
use crate::analysis::bottleneck::{detect_bottlenecks, BottleneckTable};
use crate::core::config::Scenario;
use crate::core::errors::FlowlineError;
use crate::core::simulation_engine::{simulate, SimulationOutput};
use log::info;
use rayon::prelude::*;

/// One seeded run of a scenario together with its bottleneck analysis
#[derive(Debug, Clone)]
pub struct Replication {
    pub seed: u64,
    pub output: SimulationOutput,
    pub bottlenecks: BottleneckTable,
}

fn run_one(scenario: &Scenario, seed: u64) -> Result<Replication, FlowlineError> {
    let seeded = scenario.clone().with_seed(seed);
    let output = simulate(&seeded)?;
    let bottlenecks = detect_bottlenecks(&output.events)?;
    Ok(Replication {
        seed,
        output,
        bottlenecks,
    })
}

/// Simulate and analyse `scenario` once per seed.
///
/// Results come back in seed order and are identical in both concurrency
/// modes; each replication is itself single-threaded.
pub fn replicate(
    scenario: &Scenario,
    seeds: &[u64],
    config: &ExecutionConfig,
) -> Result<Vec<Replication>, FlowlineError> {
    scenario.validate()?;
    info!(
        "Running {} replications ({:?})",
        seeds.len(),
        config.concurrency_mode
    );

    match config.concurrency_mode {
        ConcurrencyMode::Sequential => seeds.iter().map(|&seed| run_one(scenario, seed)).collect(),
        ConcurrencyMode::Rayon => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.thread_pool_size.unwrap_or(0))
                .build()?;
            pool.install(|| {
                seeds
                    .par_iter()
                    .map(|&seed| run_one(scenario, seed))
                    .collect()
            })
        }
    }
}
