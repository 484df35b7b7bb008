//! Build ready-to-run scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a `Scenario`:
//! - engine settings (`Engine`),
//! - validated parameters (`Parameters`),
//! - a `UnitCell` with every particle placed at t = 0

use crate::configuration::config::{EngineConfig, ParametersConfig, ParticlesConfig, ScenarioConfig};
use crate::simulation::cell::UnitCell;
use crate::simulation::engine::Engine;
use crate::simulation::error::{Result, SimulationError};
use crate::simulation::params::Parameters;
use crate::simulation::placement::RandomPlacement;
use crate::simulation::states::Particle;
use crate::simulation::vector::NVec2;

pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub cell: UnitCell,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        let parameters = parameters_from(&cfg.parameters);
        parameters.validate()?;

        let engine = engine_from(&cfg.engine)?;

        let particles: Vec<Particle> = match cfg.particles {
            ParticlesConfig::Random(r) => {
                let mut placement = RandomPlacement::in_box(parameters.box_width);
                if let Some(region) = r.region {
                    placement.region = NVec2::from(region);
                }
                if let Some(v) = r.velocity {
                    placement.velocity = NVec2::from(v);
                }
                placement.place(r.count, &parameters, r.seed)
            }
            ParticlesConfig::Explicit(list) => list
                .iter()
                .map(|pc| {
                    Particle::new(
                        NVec2::from(pc.x),
                        NVec2::from(pc.v),
                        parameters.particle_radius,
                        parameters.particle_mass,
                    )
                })
                .collect(),
        };

        let cell = UnitCell::from_particles(particles, parameters.clone(), engine.strategy)?;

        Ok(Self {
            engine,
            parameters,
            cell,
        })
    }

    /// Step the cell until the engine's run length is reached.
    /// Returns the number of rounds committed by this call
    pub fn run(&mut self) -> Result<u64> {
        let mut committed = 0;
        while self.engine.keep_running(self.cell.rounds(), self.cell.elapsed_time()) {
            if self.cell.is_paused() {
                break;
            }
            self.cell.advance_one_round()?;
            committed += 1;
        }
        Ok(committed)
    }
}

fn parameters_from(p: &ParametersConfig) -> Parameters {
    Parameters {
        dt: p.dt,
        box_width: p.box_width,
        wall_stiffness: p.wall_stiffness,
        gravity: p.gravity,
        particle_radius: p.particle_radius,
        particle_mass: p.particle_mass,
        epsilon: p.epsilon,
        min_separation: p
            .min_separation
            .unwrap_or_else(|| Parameters::default_min_separation(p.particle_radius)),
    }
}

fn engine_from(e: &EngineConfig) -> Result<Engine> {
    if let Some(t_end) = e.t_end {
        if !t_end.is_finite() || t_end < 0.0 {
            return Err(SimulationError::Scenario(format!("t_end must be a non-negative number, got {t_end}")));
        }
    }
    Ok(Engine {
        strategy: e.strategy,
        rounds: e.rounds,
        t_end: e.t_end,
    })
}
