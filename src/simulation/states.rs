//! Core state types for the cell
//!
//! - `KinematicState` is one consistent (x, v, a) triple
//! - `Particle` owns the committed triple plus its static radius and mass
//! - `StagedState` is the tentative next triple built during a round
//! - `ParticleSnapshot` is the read-only view handed to callers
//! - `CellState` is the committed particle set plus the simulation clock
//!
//! Committed and staged state live in separate buffers; a round only ever
//! writes staged values and the commit swaps them in.

use std::fmt;

use crate::simulation::vector::{is_finite, NVec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicState {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub a: NVec2, // acceleration
}

impl KinematicState {
    pub fn is_finite(&self) -> bool {
        is_finite(&self.x) && is_finite(&self.v) && is_finite(&self.a)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub state: KinematicState, // committed state, read by every peer
    pub radius: f64,
    pub mass: f64,
}

impl Particle {
    /// New particle with zero initial acceleration
    pub fn new(x: NVec2, v: NVec2, radius: f64, mass: f64) -> Self {
        Self {
            state: KinematicState { x, v, a: NVec2::zeros() },
            radius,
            mass,
        }
    }

    /// Position this particle reaches after a full step
    /// x_n+1 = x_n + dt v_n + (dt^2 / 2) a_n
    #[inline]
    pub fn drifted_position(&self, dt: f64) -> NVec2 {
        let s = &self.state;
        s.x + s.v * dt + s.a * (0.5 * dt * dt)
    }

    /// First half of velocity-Verlet: drift the position, half-kick the velocity.
    /// The staged acceleration stays zero until the force pass fills it in
    pub fn drift(&self, dt: f64) -> StagedState {
        let s = &self.state;
        StagedState {
            next: KinematicState {
                x: self.drifted_position(dt),
                v: s.v + s.a * (0.5 * dt),
                a: NVec2::zeros(),
            },
        }
    }

    /// Replace the committed state with a finished staged state
    pub fn commit(&mut self, staged: &StagedState) {
        self.state = staged.next;
    }

    pub fn snapshot(&self) -> ParticleSnapshot {
        ParticleSnapshot {
            position: self.state.x,
            velocity: self.state.v,
            acceleration: self.state.a,
            radius: self.radius,
            mass: self.mass,
        }
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.state;
        write!(
            f,
            "Particle [position=({}, {}), velocity=({}, {}), acceleration=({}, {}), radius={}, mass={}]",
            s.x.x, s.x.y, s.v.x, s.v.y, s.a.x, s.a.y, self.radius, self.mass
        )
    }
}

/// Tentative next-round state of one particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagedState {
    pub next: KinematicState,
}

impl StagedState {
    /// Second half of velocity-Verlet: store a_n+1 and finish the velocity
    /// v_n+1 = v_n+1/2 + (dt / 2) a_n+1
    pub fn kick(&mut self, a_new: NVec2, dt: f64) {
        self.next.a = a_new;
        self.next.v += a_new * (0.5 * dt);
    }

    pub fn is_finite(&self) -> bool {
        self.next.is_finite()
    }
}

/// Read-only copy of one particle as of the last commit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSnapshot {
    pub position: NVec2,
    pub velocity: NVec2,
    pub acceleration: NVec2,
    pub radius: f64,
    pub mass: f64,
}

/// Committed state of the whole cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellState {
    pub particles: Vec<Particle>, // fixed size for the run, order is stable
    pub t: f64, // elapsed simulated time
    pub rounds: u64, // completed rounds
}

impl CellState {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            t: 0.0,
            rounds: 0,
        }
    }

    pub fn snapshot(&self) -> Vec<ParticleSnapshot> {
        self.particles.iter().map(Particle::snapshot).collect()
    }

    pub fn masses(&self) -> Vec<f64> {
        self.particles.iter().map(|p| p.mass).collect()
    }
}
