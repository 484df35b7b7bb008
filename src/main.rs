use mdcell::{bench_strategies, Scenario, ScenarioConfig};

use anyhow::{Context, Result};
use clap::Parser;
use flexi_logger::Logger;
use log::{debug, info};

use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file, relative to the scenarios directory unless absolute
    #[arg(short, default_value = "default.yaml")]
    file_name: String,

    /// Override the scenario's round limit
    #[arg(long)]
    rounds: Option<u64>,

    /// Time both strategies instead of running a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let given = PathBuf::from(file_name);
    let config_path = if given.is_absolute() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(given)
    };
    let scenario_cfg = ScenarioConfig::from_yaml_file(&config_path)?;
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    let _logger = Logger::try_with_env_or_str("info")?.start()?;
    let args = Args::parse();

    if args.bench {
        bench_strategies()?;
        return Ok(());
    }

    let mut scenario_cfg = load_scenario_from_yaml(&args.file_name).context("failed to load scenario")?;
    if args.rounds.is_some() {
        scenario_cfg.engine.rounds = args.rounds;
    }
    if scenario_cfg.engine.rounds.is_none() && scenario_cfg.engine.t_end.is_none() {
        anyhow::bail!("scenario sets neither rounds nor t_end; pass --rounds");
    }

    let mut scenario = Scenario::build_scenario(scenario_cfg)?;
    info!(
        "running {} particles, {:?}, dt = {}",
        scenario.cell.len(),
        scenario.engine.strategy,
        scenario.parameters.dt
    );

    let cell = &mut scenario.cell;
    debug!("{cell}");
    while scenario.engine.keep_running(cell.rounds(), cell.elapsed_time()) {
        let report = cell.advance_one_round()?;
        for fault in report.pair_faults() {
            debug!("round {}: pair ({}, {}) {:?}", cell.rounds(), fault.i, fault.j, fault.kind);
        }
        debug!("{cell}");
    }

    let p = cell.total_momentum();
    info!(
        "done: {} rounds, t = {:.6}, momentum = ({:.6e}, {:.6e}), kinetic energy = {:.6e}",
        cell.rounds(),
        cell.elapsed_time(),
        p.x,
        p.y,
        cell.kinetic_energy()
    );

    Ok(())
}
