//! Force contributors for the cell
//!
//! Every term implements [`ForceTerm`] and adds its force into a per-particle
//! buffer. A [`ForceModel`] sums the registered terms in order and divides by
//! the particle mass to get the staged acceleration.
//!
//! Terms read only a [`NeighbourView`], the round's drifted positions derived
//! from committed state, so evaluating one particle never depends on another
//! particle's in-flight work.

use log::warn;

use crate::simulation::params::Parameters;
use crate::simulation::vector::{distance, separation, NVec2};

/// Read-only inputs shared by every force evaluation of one round
#[derive(Debug, Clone, Copy)]
pub struct NeighbourView<'a> {
    pub positions: &'a [NVec2],
    pub masses: &'a [f64],
}

impl<'a> NeighbourView<'a> {
    pub fn new(positions: &'a [NVec2], masses: &'a [f64]) -> Self {
        debug_assert_eq!(positions.len(), masses.len());
        Self { positions, masses }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// What went wrong for one pair during the Lennard-Jones pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairFaultKind {
    /// Closer than `min_separation`; distance clamped to the floor
    Clamped,
    /// Exactly coincident; no direction exists so the pair was skipped
    Coincident,
}

/// A pair that needed the distance-floor policy, recorded once with `i < j`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairFault {
    pub i: usize,
    pub j: usize,
    pub kind: PairFaultKind,
}

/// One contribution to the force on each particle
pub trait ForceTerm {
    /// Add this term's force on particle `i` into `force`
    fn force_on(&self, i: usize, view: &NeighbourView<'_>, force: &mut NVec2, faults: &mut Vec<PairFault>);

    /// Add this term's force on every particle into `out`
    ///
    /// For a given particle the additions must happen in the same order as
    /// in [`ForceTerm::force_on`], so both paths give identical sums
    fn accumulate(&self, view: &NeighbourView<'_>, out: &mut [NVec2], faults: &mut Vec<PairFault>) {
        for (i, force) in out.iter_mut().enumerate() {
            self.force_on(i, view, force, faults);
        }
    }
}

/// Ordered collection of force terms
pub struct ForceModel {
    terms: Vec<Box<dyn ForceTerm + Send + Sync>>,
}

impl Default for ForceModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceModel {
    /// Create an empty force model
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a force term; terms are summed in registration order
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: ForceTerm + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// Walls, gravity and Lennard-Jones, in that order
    pub fn standard(p: &Parameters) -> Self {
        Self::new()
            .with(WallForce {
                box_width: p.box_width,
                stiffness: p.wall_stiffness,
            })
            .with(UniformGravity { g: p.gravity })
            .with(LennardJones {
                sigma: p.particle_radius,
                epsilon: p.epsilon,
                min_separation: p.min_separation,
            })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Staged acceleration of one particle: summed force over its mass
    pub fn acceleration_on(&self, i: usize, view: &NeighbourView<'_>, faults: &mut Vec<PairFault>) -> NVec2 {
        let mut force = NVec2::zeros();
        for term in &self.terms {
            term.force_on(i, view, &mut force, faults);
        }
        force / view.masses[i]
    }

    /// Staged accelerations of every particle
    /// - `out[i]` is overwritten with the summed force on `i` over its mass
    pub fn accumulate_accels(&self, view: &NeighbourView<'_>, out: &mut [NVec2], faults: &mut Vec<PairFault>) {
        // Zero buffer
        for a in out.iter_mut() {
            *a = NVec2::zeros();
        }
        for term in &self.terms {
            term.accumulate(view, out, faults);
        }
        for (a, m) in out.iter_mut().zip(view.masses.iter()) {
            *a /= *m;
        }
    }
}

/// Linear restoring force outside `[0, box_width]` on each axis.
/// Not a clamp: particles may cross the wall for a while
pub struct WallForce {
    pub box_width: f64,
    pub stiffness: f64,
}

impl WallForce {
    #[inline]
    fn component(&self, p: f64) -> f64 {
        if p < 0.0 {
            -p * self.stiffness
        } else if p > self.box_width {
            self.stiffness * (self.box_width - p)
        } else {
            0.0
        }
    }

    pub fn force(&self, x: &NVec2) -> NVec2 {
        NVec2::new(self.component(x.x), self.component(x.y))
    }
}

impl ForceTerm for WallForce {
    fn force_on(&self, i: usize, view: &NeighbourView<'_>, force: &mut NVec2, _faults: &mut Vec<PairFault>) {
        *force += self.force(&view.positions[i]);
    }
}

/// Constant downward pull; enters as force `m g` so it survives the mass division
pub struct UniformGravity {
    pub g: f64,
}

impl ForceTerm for UniformGravity {
    fn force_on(&self, i: usize, view: &NeighbourView<'_>, force: &mut NVec2, _faults: &mut Vec<PairFault>) {
        force.y -= view.masses[i] * self.g;
    }
}

/// Pairwise Lennard-Jones interaction, V(r) = 4 eps [(sigma/r)^12 - (sigma/r)^6]
pub struct LennardJones {
    pub sigma: f64,
    pub epsilon: f64,
    pub min_separation: f64,
}

impl LennardJones {
    /// Pair force per unit separation, 24 eps (2 (sigma/d)^12 - (sigma/d)^6) / d.
    /// Positive pushes the pair apart, negative pulls it together
    #[inline]
    pub fn f_over_distance(&self, d: f64) -> f64 {
        let inv = 1.0 / d;
        let attract = (self.sigma * inv).powi(6);
        let repulsive = attract * attract;
        24.0 * self.epsilon * (2.0 * repulsive - attract) * inv
    }

    /// Force on the particle at `xi` from the one at `xj`.
    ///
    /// `pair_force(a, b) == -pair_force(b, a)` bit for bit: the separation
    /// negates exactly and every other input is symmetric
    pub fn pair_force(&self, xi: &NVec2, xj: &NVec2) -> (NVec2, Option<PairFaultKind>) {
        let r = separation(xi, xj);
        let d = distance(xi, xj);

        if d == 0.0 {
            return (NVec2::zeros(), Some(PairFaultKind::Coincident));
        }
        if d < self.min_separation {
            // Force the pair would feel at the floor, along the real direction
            let scale = self.f_over_distance(self.min_separation) * self.min_separation / d;
            return (r * scale, Some(PairFaultKind::Clamped));
        }
        (r * self.f_over_distance(d), None)
    }
}

impl ForceTerm for LennardJones {
    fn force_on(&self, i: usize, view: &NeighbourView<'_>, force: &mut NVec2, faults: &mut Vec<PairFault>) {
        let xi = view.positions[i];
        for (j, xj) in view.positions.iter().enumerate() {
            if j == i {
                continue;
            }
            let (f, fault) = self.pair_force(&xi, xj);
            if let Some(kind) = fault {
                // The pair is reported by its lower index only
                if i < j {
                    warn!("pair ({i}, {j}) {kind:?} at distance {}", distance(&xi, xj));
                    faults.push(PairFault { i, j, kind });
                }
                if kind == PairFaultKind::Coincident {
                    continue;
                }
            }
            *force += f;
        }
    }

    fn accumulate(&self, view: &NeighbourView<'_>, out: &mut [NVec2], faults: &mut Vec<PairFault>) {
        let n = view.len();

        // Each unordered pair once: action on i, reaction on j
        for i in 0..n {
            let xi = view.positions[i];
            for j in (i + 1)..n {
                let xj = view.positions[j];
                let (f, fault) = self.pair_force(&xi, &xj);
                if let Some(kind) = fault {
                    warn!("pair ({i}, {j}) {kind:?} at distance {}", distance(&xi, &xj));
                    faults.push(PairFault { i, j, kind });
                    if kind == PairFaultKind::Coincident {
                        continue;
                    }
                }
                out[i] += f;
                out[j] -= f;
            }
        }
    }
}
