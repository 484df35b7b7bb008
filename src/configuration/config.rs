//! Configuration types for loading scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`EngineConfig`]     – execution strategy and run length
//! - [`ParametersConfig`] – numerical parameters and physical constants
//! - [`ParticlesConfig`]  – random or explicit initial placement
//! - [`ScenarioConfig`]   – top-level wrapper
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   strategy: "concurrent"  # or "sequential"
//!   rounds: 1000            # optional
//!   t_end: 100.0            # optional
//!
//! parameters:
//!   dt: 2.0e-5
//!   box_width: 1.0
//!   wall_stiffness: 50.0
//!   gravity: 10.0
//!   particle_radius: 0.04
//!   particle_mass: 1.0
//!   epsilon: 1.0
//!   min_separation: 4.0e-5  # optional
//!
//! particles:
//!   random:
//!     count: 10
//!     seed: 42
//!     region: [1.0, 1.0]    # optional, defaults to the box
//!     velocity: [10.0, 10.0] # optional
//! ```
//!
//! or an explicit list:
//!
//! ```yaml
//! particles:
//!   explicit:
//!     - x: [0.25, 0.5]
//!       v: [0.0, 0.0]
//!     - x: [0.75, 0.5]
//!       v: [0.0, 0.0]
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::simulation::engine::ExecutionStrategy;
use crate::simulation::error::{Result, SimulationError};

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub strategy: ExecutionStrategy, // how a round is scheduled
    pub rounds: Option<u64>, // stop after this many rounds
    pub t_end: Option<f64>, // stop once elapsed time reaches this
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ParametersConfig {
    pub dt: f64,
    pub box_width: f64,
    pub wall_stiffness: f64,
    pub gravity: f64,
    pub particle_radius: f64,
    pub particle_mass: f64,
    pub epsilon: f64,
    pub min_separation: Option<f64>, // distance floor, defaults to a fraction of the radius
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RandomConfig {
    pub count: usize,
    pub seed: u64,
    pub region: Option<[f64; 2]>,
    pub velocity: Option<[f64; 2]>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ParticleConfig {
    pub x: [f64; 2], // initial position
    #[serde(default)]
    pub v: [f64; 2], // initial velocity
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ParticlesConfig {
    Random(RandomConfig),
    Explicit(Vec<ParticleConfig>),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub particles: ParticlesConfig,
}

impl ScenarioConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| SimulationError::Scenario(e.to_string()))
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| SimulationError::Scenario(format!("{}: {e}", path.display())))?;
        serde_yaml::from_reader(BufReader::new(file))
            .map_err(|e| SimulationError::Scenario(format!("{}: {e}", path.display())))
    }
}
