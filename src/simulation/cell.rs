//! The unit cell: owns the particle set and drives rounds
//!
//! A [`UnitCell`] holds committed state behind a read/write lock, a pause
//! flag and one of the two steppers. Each call to
//! [`UnitCell::advance_one_round`] either does nothing (paused) or runs one
//! full round and commits it; callers decide how many rounds to run.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;

use crate::simulation::engine::ExecutionStrategy;
use crate::simulation::error::{Result, SimulationError};
use crate::simulation::forces::ForceModel;
use crate::simulation::integrator::{RoundReport, SequentialStepper};
use crate::simulation::params::Parameters;
use crate::simulation::placement::RandomPlacement;
use crate::simulation::states::{CellState, Particle, ParticleSnapshot};
use crate::simulation::vector::NVec2;
use crate::simulation::workers::WorkerPool;

/// Cloneable pause switch, usable from another thread (e.g. a viewer)
#[derive(Debug, Clone, Default)]
pub struct PauseHandle(Arc<AtomicBool>);

impl PauseHandle {
    pub fn set_paused(&self, paused: bool) {
        self.0.store(paused, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum Stepper {
    Sequential(SequentialStepper),
    Concurrent(WorkerPool),
}

pub struct UnitCell {
    state: Arc<RwLock<CellState>>,
    forces: Arc<ForceModel>,
    parameters: Parameters,
    strategy: ExecutionStrategy,
    paused: PauseHandle,
    stepper: Stepper,
}

impl UnitCell {
    /// `particle_count` particles placed at random in the box
    pub fn create(particle_count: usize, parameters: Parameters, strategy: ExecutionStrategy, seed: u64) -> Result<Self> {
        parameters.validate()?;
        let particles = RandomPlacement::in_box(parameters.box_width).place(particle_count, &parameters, seed);
        Self::from_particles(particles, parameters, strategy)
    }

    /// Caller-provided placement with the standard force model
    pub fn from_particles(particles: Vec<Particle>, parameters: Parameters, strategy: ExecutionStrategy) -> Result<Self> {
        let forces = ForceModel::standard(&parameters);
        Self::with_forces(particles, parameters, strategy, forces)
    }

    /// Caller-provided placement and force model
    pub fn with_forces(
        particles: Vec<Particle>,
        parameters: Parameters,
        strategy: ExecutionStrategy,
        forces: ForceModel,
    ) -> Result<Self> {
        parameters.validate()?;
        if particles.is_empty() {
            return Err(SimulationError::InvalidConfiguration(
                "particle count must be positive".to_string(),
            ));
        }
        if let Some(i) = particles.iter().position(|p| !(p.mass > 0.0 && p.mass.is_finite())) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "particle {i} has non-positive mass {}",
                particles[i].mass
            )));
        }
        if let Some(i) = particles.iter().position(|p| !p.state.is_finite()) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "particle {i} has a non-finite initial state"
            )));
        }

        let state = CellState::new(particles);
        let masses = state.masses();
        let n = masses.len();
        let state = Arc::new(RwLock::new(state));
        let forces = Arc::new(forces);

        let stepper = match strategy {
            ExecutionStrategy::Sequential => Stepper::Sequential(SequentialStepper::new(masses)),
            ExecutionStrategy::Concurrent => {
                Stepper::Concurrent(WorkerPool::spawn(Arc::clone(&state), Arc::clone(&forces), parameters.dt)?)
            }
        };
        debug!("unit cell created: {n} particles, {strategy:?}");

        Ok(Self {
            state,
            forces,
            parameters,
            strategy,
            paused: PauseHandle::default(),
            stepper,
        })
    }

    /// Run exactly one round to completion, unless paused.
    ///
    /// The pause flag is read once, at the round boundary; a round that has
    /// started always finishes and commits
    pub fn advance_one_round(&mut self) -> Result<RoundReport> {
        if self.paused.is_paused() {
            return Ok(RoundReport::Paused);
        }

        match &mut self.stepper {
            Stepper::Sequential(stepper) => {
                let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
                stepper.advance(&mut state, &self.forces, self.parameters.dt)
            }
            Stepper::Concurrent(pool) => pool.advance(),
        }
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.set_paused(paused);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.is_paused()
    }

    pub fn pause_handle(&self) -> PauseHandle {
        self.paused.clone()
    }

    pub fn elapsed_time(&self) -> f64 {
        self.read().t
    }

    /// Completed rounds
    pub fn rounds(&self) -> u64 {
        self.read().rounds
    }

    /// Every particle as of the last commit, in creation order
    pub fn snapshot(&self) -> Vec<ParticleSnapshot> {
        self.read().snapshot()
    }

    pub fn len(&self) -> usize {
        self.read().particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Sum of m v over committed state
    pub fn total_momentum(&self) -> NVec2 {
        self.read()
            .particles
            .iter()
            .fold(NVec2::zeros(), |acc, p| acc + p.state.v * p.mass)
    }

    /// Sum of m v^2 / 2 over committed state
    pub fn kinetic_energy(&self) -> f64 {
        self.read()
            .particles
            .iter()
            .map(|p| 0.5 * p.mass * p.state.v.norm_squared())
            .sum()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CellState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for UnitCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        write!(f, "UnitCell [T= {} ] : ", state.t)?;
        for p in &state.particles {
            write!(f, "{p} ")?;
        }
        Ok(())
    }
}
