//! Velocity-Verlet round for the cell
//!
//! A round is split the same way for both execution strategies:
//! - phase A: drift every position and half-kick every velocity from
//!   committed state,
//! - force pass: staged accelerations from the drifted positions,
//! - phase B: finish the velocity kick with the new accelerations,
//! - commit: swap every staged state in and advance the clock by `dt`.
//!
//! Nothing here writes committed state except [`commit_round`].

use log::{debug, error};

use crate::simulation::error::{Result, SimulationError};
use crate::simulation::forces::{ForceModel, NeighbourView, PairFault};
use crate::simulation::states::{CellState, Particle, StagedState};
use crate::simulation::vector::NVec2;

/// Outcome of one call to advance the cell
#[derive(Debug, Clone, PartialEq)]
pub enum RoundReport {
    /// The cell was paused; nothing was computed or committed
    Paused,
    /// A full round was staged and committed
    Committed {
        round: u64,
        elapsed_time: f64,
        pair_faults: Vec<PairFault>,
    },
}

impl RoundReport {
    pub fn is_committed(&self) -> bool {
        matches!(self, RoundReport::Committed { .. })
    }

    pub fn pair_faults(&self) -> &[PairFault] {
        match self {
            RoundReport::Committed { pair_faults, .. } => pair_faults,
            RoundReport::Paused => &[],
        }
    }
}

/// Positions every particle reaches this round, from committed state only.
/// Pure, so every worker that calls it sees identical values
pub fn drift_positions(particles: &[Particle], dt: f64) -> Vec<NVec2> {
    particles.iter().map(|p| p.drifted_position(dt)).collect()
}

/// Phase A, force pass and phase B for one particle
pub fn stage_particle(
    i: usize,
    particles: &[Particle],
    view: &NeighbourView<'_>,
    forces: &ForceModel,
    dt: f64,
    faults: &mut Vec<PairFault>,
) -> StagedState {
    let mut staged = particles[i].drift(dt);
    let a_new = forces.acceleration_on(i, view, faults);
    staged.kick(a_new, dt);
    staged
}

/// Sequential strategy: stage every particle in one pass.
/// Pairwise forces are evaluated once per unordered pair
pub struct SequentialStepper {
    staged: Vec<StagedState>,
    accels: Vec<NVec2>,
    masses: Vec<f64>,
}

impl SequentialStepper {
    pub fn new(masses: Vec<f64>) -> Self {
        Self {
            staged: Vec::with_capacity(masses.len()),
            accels: vec![NVec2::zeros(); masses.len()],
            masses,
        }
    }

    pub fn advance(&mut self, cell: &mut CellState, forces: &ForceModel, dt: f64) -> Result<RoundReport> {
        let mut faults = Vec::new();

        // Phase A for everyone
        self.staged.clear();
        self.staged.extend(cell.particles.iter().map(|p| p.drift(dt)));

        // Forces at the drifted positions x_n+1
        let positions: Vec<NVec2> = self.staged.iter().map(|s| s.next.x).collect();
        let view = NeighbourView::new(&positions, &self.masses);
        forces.accumulate_accels(&view, &mut self.accels, &mut faults);

        // Phase B
        for (s, a) in self.staged.iter_mut().zip(self.accels.iter()) {
            s.kick(*a, dt);
        }

        commit_round(cell, &self.staged, faults, dt)
    }
}

/// Replace every particle's committed state with its staged state.
///
/// All-or-nothing: if any staged value is non-finite the round is refused
/// and the cell is left exactly as it was
pub fn commit_round(cell: &mut CellState, staged: &[StagedState], pair_faults: Vec<PairFault>, dt: f64) -> Result<RoundReport> {
    let round = cell.rounds + 1;

    if staged.len() != cell.particles.len() {
        error!("round {round}: {} staged states for {} particles", staged.len(), cell.particles.len());
        return Err(SimulationError::ConcurrencyFault(format!(
            "round {round} staged {} of {} particles",
            staged.len(),
            cell.particles.len()
        )));
    }
    if let Some(particle) = staged.iter().position(|s| !s.is_finite()) {
        error!("round {round}: particle {particle} went non-finite, round refused");
        return Err(SimulationError::DegenerateState { particle, round });
    }

    for (p, s) in cell.particles.iter_mut().zip(staged.iter()) {
        p.commit(s);
    }
    cell.t += dt;
    cell.rounds = round;

    debug!("round {round} committed at t = {}", cell.t);

    Ok(RoundReport::Committed {
        round,
        elapsed_time: cell.t,
        pair_faults,
    })
}
