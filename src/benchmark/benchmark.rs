use std::time::Instant;

use log::info;

use crate::simulation::cell::UnitCell;
use crate::simulation::engine::ExecutionStrategy;
use crate::simulation::error::Result;
use crate::simulation::params::Parameters;

/// Rounds timed per measurement
const BENCH_ROUNDS: u64 = 200;

/// Seconds per round for `n` particles under `strategy`
fn time_rounds(n: usize, strategy: ExecutionStrategy, parameters: &Parameters) -> Result<f64> {
    let mut cell = UnitCell::create(n, parameters.clone(), strategy, 42)?;

    // Warm up
    cell.advance_one_round()?;

    let t0 = Instant::now();
    for _ in 0..BENCH_ROUNDS {
        cell.advance_one_round()?;
    }
    Ok(t0.elapsed().as_secs_f64() / BENCH_ROUNDS as f64)
}

/// Sequential loop vs thread-per-particle over a range of cell sizes
pub fn bench_strategies() -> Result<()> {
    // Different system sizes to test
    let ns = [10, 20, 40, 80, 160];
    let parameters = Parameters::reference();

    for n in ns {
        let seq = time_rounds(n, ExecutionStrategy::Sequential, &parameters)?;
        let conc = time_rounds(n, ExecutionStrategy::Concurrent, &parameters)?;

        info!("N = {n:4}, sequential = {:10.3} us/round, concurrent = {:10.3} us/round", seq * 1e6, conc * 1e6);
    }
    Ok(())
}
