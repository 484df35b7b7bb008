//! Reusable round barrier
//!
//! `StepBarrier` blocks every participant until the last one arrives. The
//! last arrival runs the action it was given, still holding the barrier
//! lock, so nobody can start the next generation before the action is done.
//! Then the generation advances and everyone is released.
//!
//! A barrier can be broken. Every current and future waiter then gets
//! [`BarrierError::Broken`] instead of hanging; `BreakOnUnwind` does this
//! automatically when a participant panics before arriving.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread;

use log::error;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarrierError {
    #[error("barrier broken: {0}")]
    Broken(String),
}

/// How a participant left the barrier
#[derive(Debug, PartialEq, Eq)]
pub enum BarrierWait<R> {
    /// Last to arrive; ran the action and carries its result
    Leader(R),
    /// Released by the leader
    Follower,
}

impl<R> BarrierWait<R> {
    pub fn is_leader(&self) -> bool {
        matches!(self, BarrierWait::Leader(_))
    }
}

#[derive(Debug)]
struct Gate {
    arrived: usize,
    generation: u64,
    broken: Option<String>,
}

#[derive(Debug)]
pub struct StepBarrier {
    parties: usize,
    gate: Mutex<Gate>,
    released: Condvar,
}

impl StepBarrier {
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "a barrier needs at least one participant");
        Self {
            parties,
            gate: Mutex::new(Gate {
                arrived: 0,
                generation: 0,
                broken: None,
            }),
            released: Condvar::new(),
        }
    }

    /// Completed generations so far
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn is_broken(&self) -> bool {
        self.lock().broken.is_some()
    }

    /// Arrive and block until the round completes.
    ///
    /// Only the last arrival runs `action`; the closures of the others are
    /// dropped unused
    pub fn wait<R, F>(&self, action: F) -> Result<BarrierWait<R>, BarrierError>
    where
        F: FnOnce() -> R,
    {
        let mut gate = self.lock();
        if let Some(reason) = &gate.broken {
            return Err(BarrierError::Broken(reason.clone()));
        }

        gate.arrived += 1;
        if gate.arrived == self.parties {
            let result = action();
            gate.arrived = 0;
            gate.generation += 1;
            self.released.notify_all();
            return Ok(BarrierWait::Leader(result));
        }

        let generation = gate.generation;
        while gate.generation == generation && gate.broken.is_none() {
            gate = self.released.wait(gate).unwrap_or_else(|poisoned| poisoned.into_inner());
        }

        // A release that happened before the break still counts
        if gate.generation != generation {
            return Ok(BarrierWait::Follower);
        }
        match &gate.broken {
            Some(reason) => Err(BarrierError::Broken(reason.clone())),
            None => Ok(BarrierWait::Follower),
        }
    }

    /// Fail the current and every later generation
    pub fn break_barrier(&self, reason: impl Into<String>) {
        let mut gate = self.lock();
        if gate.broken.is_none() {
            let reason = reason.into();
            error!("breaking barrier after generation {}: {reason}", gate.generation);
            gate.broken = Some(reason);
        }
        self.released.notify_all();
    }

    // Poisoning only means a participant panicked; the counters stay consistent
    fn lock(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Breaks the listed barriers if dropped while the thread is panicking
pub struct BreakOnUnwind<'a> {
    barriers: &'a [&'a StepBarrier],
    who: String,
}

impl<'a> BreakOnUnwind<'a> {
    pub fn new(barriers: &'a [&'a StepBarrier], who: impl Into<String>) -> Self {
        Self {
            barriers,
            who: who.into(),
        }
    }
}

impl Drop for BreakOnUnwind<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            for barrier in self.barriers {
                barrier.break_barrier(format!("{} panicked before reaching the barrier", self.who));
            }
        }
    }
}
