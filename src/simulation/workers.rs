//! Thread-per-particle execution of a round
//!
//! The pool owns one persistent worker per particle. The calling thread is
//! the coordinator and takes part in both gates of every round:
//! - `start`: releases the workers into a round (or into shutdown),
//! - `commit`: every worker has written its own staged slot; the last
//!   arrival runs [`commit_round`] under the state write lock.
//!
//! Workers only read committed state and only write their own slot, so the
//! commit action is the single place that writes shared particle state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use log::{debug, error};

use crate::simulation::barrier::{BreakOnUnwind, StepBarrier};
use crate::simulation::error::{Result, SimulationError};
use crate::simulation::forces::{ForceModel, NeighbourView, PairFault};
use crate::simulation::integrator::{commit_round, drift_positions, stage_particle, RoundReport};
use crate::simulation::states::{CellState, StagedState};

/// One worker's output for the round in flight
#[derive(Debug, Default)]
struct Slot {
    staged: Option<StagedState>,
    faults: Vec<PairFault>,
}

struct Shared {
    cell: Arc<RwLock<CellState>>,
    forces: Arc<ForceModel>,
    masses: Vec<f64>,
    dt: f64,
    slots: Vec<Mutex<Slot>>,
    start: StepBarrier,
    commit: StepBarrier,
    shutdown: AtomicBool,
    outcome: Mutex<Option<Result<RoundReport>>>,
}

impl Shared {
    /// Barrier action: gather every slot and commit them as one round
    fn commit_slots(&self) {
        let mut staged = Vec::with_capacity(self.slots.len());
        let mut faults = Vec::new();
        for slot in &self.slots {
            let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(s) = slot.staged.take() {
                staged.push(s);
            }
            faults.append(&mut slot.faults);
        }

        let mut cell = self.cell.write().unwrap_or_else(PoisonError::into_inner);
        let result = commit_round(&mut cell, &staged, faults, self.dt);
        *self.outcome.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
    }

    fn run_worker(&self, i: usize) {
        let barriers = [&self.start, &self.commit];
        let _guard = BreakOnUnwind::new(&barriers, format!("particle-{}", i + 1));

        loop {
            if self.start.wait(|| ()).is_err() {
                return;
            }
            if self.shutdown.load(Ordering::Acquire) {
                debug!("particle-{} shutting down", i + 1);
                return;
            }

            // Read lock is dropped before the commit gate so the action can write
            {
                let cell = self.cell.read().unwrap_or_else(PoisonError::into_inner);
                let positions = drift_positions(&cell.particles, self.dt);
                let view = NeighbourView::new(&positions, &self.masses);
                let mut faults = Vec::new();
                let staged = stage_particle(i, &cell.particles, &view, &self.forces, self.dt, &mut faults);

                let mut slot = self.slots[i].lock().unwrap_or_else(PoisonError::into_inner);
                slot.staged = Some(staged);
                slot.faults = faults;
            }

            if self.commit.wait(|| self.commit_slots()).is_err() {
                return;
            }
        }
    }
}

/// Persistent worker threads, one per particle
pub struct WorkerPool {
    shared: Arc<Shared>,
    handles: Vec<JoinHandle<()>>,
    fault: Option<String>,
}

impl WorkerPool {
    pub fn spawn(cell: Arc<RwLock<CellState>>, forces: Arc<ForceModel>, dt: f64) -> Result<Self> {
        let (n, masses) = {
            let state = cell.read().unwrap_or_else(PoisonError::into_inner);
            (state.particles.len(), state.masses())
        };

        let shared = Arc::new(Shared {
            cell,
            forces,
            masses,
            dt,
            slots: (0..n).map(|_| Mutex::new(Slot::default())).collect(),
            start: StepBarrier::new(n + 1),
            commit: StepBarrier::new(n + 1),
            shutdown: AtomicBool::new(false),
            outcome: Mutex::new(None),
        });

        let mut handles = Vec::with_capacity(n);
        for i in 0..n {
            let worker = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name(format!("particle-{}", i + 1))
                .spawn(move || worker.run_worker(i));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Release whoever already started before giving up
                    shared.start.break_barrier(format!("failed to spawn particle-{}", i + 1));
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(SimulationError::ConcurrencyFault(format!(
                        "failed to spawn worker for particle {}: {e}",
                        i + 1
                    )));
                }
            }
        }
        debug!("spawned {n} particle workers");

        Ok(Self {
            shared,
            handles,
            fault: None,
        })
    }

    /// Run one round to completion on the workers.
    ///
    /// A broken barrier fails the round and poisons the pool: no later
    /// round is attempted
    pub fn advance(&mut self) -> Result<RoundReport> {
        if let Some(reason) = &self.fault {
            return Err(SimulationError::ConcurrencyFault(reason.clone()));
        }

        let shared = Arc::clone(&self.shared);
        let gates = shared
            .start
            .wait(|| ())
            .and_then(|_| shared.commit.wait(|| shared.commit_slots()));

        if let Err(e) = gates {
            error!("round aborted: {e}");
            self.fault = Some(e.to_string());
            return Err(e.into());
        }

        let outcome = shared.outcome.lock().unwrap_or_else(PoisonError::into_inner).take();
        outcome.unwrap_or_else(|| Err(SimulationError::ConcurrencyFault("round finished without a commit".to_string())))
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        // Either releases the workers into shutdown or fails fast on a broken gate
        let _ = self.shared.start.wait(|| ());
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                error!("a particle worker panicked");
            }
        }
        debug!("particle workers joined");
    }
}
