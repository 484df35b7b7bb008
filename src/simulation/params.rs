//! Numerical and physical parameters for the cell
//!
//! `Parameters` holds the externally owned configuration record:
//! - integration step size `dt`,
//! - box width and wall stiffness for the linear wall force,
//! - uniform gravity,
//! - particle radius, mass and Lennard-Jones well depth `epsilon`,
//! - distance floor for the pairwise term

use crate::simulation::error::{Result, SimulationError};

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub dt: f64, // time step
    pub box_width: f64, // square box side, walls at 0 and box_width
    pub wall_stiffness: f64, // linear restoring coefficient outside the box
    pub gravity: f64, // subtracted from vertical acceleration
    pub particle_radius: f64, // Lennard-Jones sigma
    pub particle_mass: f64, // mass of every particle
    pub epsilon: f64, // Lennard-Jones well depth
    pub min_separation: f64, // pairwise distance floor
}

impl Parameters {
    /// Constants of the reference program
    pub fn reference() -> Self {
        let particle_radius = 0.04;
        Self {
            dt: 0.00002,
            box_width: 1.0,
            wall_stiffness: 50.0,
            gravity: 10.0,
            particle_radius,
            particle_mass: 1.0,
            epsilon: 1.0,
            min_separation: Self::default_min_separation(particle_radius),
        }
    }

    /// Floor used when a scenario does not set one
    pub fn default_min_separation(particle_radius: f64) -> f64 {
        1.0e-3 * particle_radius
    }

    /// Reject values the integrator cannot work with
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("dt", self.dt),
            ("box_width", self.box_width),
            ("wall_stiffness", self.wall_stiffness),
            ("gravity", self.gravity),
            ("particle_radius", self.particle_radius),
            ("particle_mass", self.particle_mass),
            ("epsilon", self.epsilon),
            ("min_separation", self.min_separation),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{name} must be finite, got {value}")));
        }

        if self.dt <= 0.0 {
            return Err(invalid(format!("dt must be positive, got {}", self.dt)));
        }
        if self.particle_mass <= 0.0 {
            return Err(invalid(format!("particle_mass must be positive, got {}", self.particle_mass)));
        }
        if self.particle_radius <= 0.0 {
            return Err(invalid(format!("particle_radius must be positive, got {}", self.particle_radius)));
        }
        if self.box_width <= 0.0 {
            return Err(invalid(format!("box_width must be positive, got {}", self.box_width)));
        }
        if self.min_separation < 0.0 {
            return Err(invalid(format!("min_separation must not be negative, got {}", self.min_separation)));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> SimulationError {
    SimulationError::InvalidConfiguration(msg)
}
