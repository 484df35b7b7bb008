//! High-level runtime engine settings
//!
//! Selects how a round is executed and how long the driver keeps stepping.
//! The cell itself only ever advances one round at a time

use serde::Deserialize;

/// How the per-particle work of a round is scheduled.
/// Both strategies produce bit-identical results
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    #[serde(rename = "sequential")] // one loop over all particles, pairs visited once
    #[default]
    Sequential,

    #[serde(rename = "concurrent")] // one worker thread per particle, synchronized at a barrier
    Concurrent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    pub strategy: ExecutionStrategy,
    pub rounds: Option<u64>, // stop after this many rounds
    pub t_end: Option<f64>, // or once simulated time reaches this
}

impl Engine {
    /// Whether a driver should keep stepping after `rounds` rounds at time `t`.
    /// With neither limit set the run is open-ended
    pub fn keep_running(&self, rounds: u64, t: f64) -> bool {
        let under_rounds = self.rounds.map_or(true, |max| rounds < max);
        let under_time = self.t_end.map_or(true, |end| t < end);
        under_rounds && under_time
    }
}
