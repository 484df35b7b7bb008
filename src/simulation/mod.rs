pub mod vector;
pub mod error;
pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod barrier;
pub mod integrator;
pub mod workers;
pub mod placement;
pub mod cell;
pub mod scenario;
