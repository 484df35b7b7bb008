pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::vector::{distance, separation, NVec2};
pub use simulation::states::{CellState, KinematicState, Particle, ParticleSnapshot, StagedState};
pub use simulation::params::Parameters;
pub use simulation::engine::{Engine, ExecutionStrategy};
pub use simulation::forces::{ForceModel, ForceTerm, LennardJones, NeighbourView, PairFault, PairFaultKind, UniformGravity, WallForce};
pub use simulation::barrier::{BarrierError, BarrierWait, StepBarrier};
pub use simulation::integrator::RoundReport;
pub use simulation::placement::RandomPlacement;
pub use simulation::cell::{PauseHandle, UnitCell};
pub use simulation::scenario::Scenario;
pub use simulation::error::{Result, SimulationError};

pub use configuration::config::{EngineConfig, ParametersConfig, ParticleConfig, ParticlesConfig, RandomConfig, ScenarioConfig};

pub use benchmark::benchmark::bench_strategies;
