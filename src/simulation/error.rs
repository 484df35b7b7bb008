//! Error types for the molecular dynamics cell

use thiserror::Error;

use crate::simulation::barrier::BarrierError;

#[derive(Debug, Error)]
pub enum SimulationError {
    /// Rejected at construction time; the cell is never built
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A staged value went non-finite; the round was refused and nothing committed
    #[error("degenerate state: particle {particle} produced a non-finite value in round {round}")]
    DegenerateState { particle: usize, round: u64 },

    /// A worker never reached the barrier, or the barrier was broken
    #[error("concurrency fault: {0}")]
    ConcurrencyFault(String),

    /// Malformed scenario input
    #[error("scenario error: {0}")]
    Scenario(String),
}

impl From<BarrierError> for SimulationError {
    fn from(err: BarrierError) -> Self {
        SimulationError::ConcurrencyFault(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
