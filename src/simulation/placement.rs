//! Seeded random initial placement
//!
//! Any procedure yielding starting positions and velocities is acceptable to
//! the cell; this one draws positions uniformly in a rectangle anchored at the
//! origin and gives every particle the same initial velocity

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::simulation::params::Parameters;
use crate::simulation::states::Particle;
use crate::simulation::vector::NVec2;

/// Initial velocity of the reference runs
pub const REFERENCE_VELOCITY: [f64; 2] = [10.0, 10.0];

#[derive(Debug, Clone, PartialEq)]
pub struct RandomPlacement {
    pub region: NVec2, // width, height of the sampling rectangle
    pub velocity: NVec2, // shared initial velocity
}

impl RandomPlacement {
    /// Whole box, reference velocity
    pub fn in_box(box_width: f64) -> Self {
        Self {
            region: NVec2::new(box_width, box_width),
            velocity: NVec2::from(REFERENCE_VELOCITY),
        }
    }

    /// `count` particles; the same seed always gives the same particles
    pub fn place(&self, count: usize, p: &Parameters, seed: u64) -> Vec<Particle> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let x = NVec2::new(rng.gen::<f64>() * self.region.x, rng.gen::<f64>() * self.region.y);
                Particle::new(x, self.velocity, p.particle_radius, p.particle_mass)
            })
            .collect()
    }
}
