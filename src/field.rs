//! Global nodal fields.
use crate::Real;
use nalgebra::DVector;

/// The acoustic potential and its first and second time derivatives at every global GLL point.
///
/// The domain only writes `potential_dot_dot`; the potential and its first derivative are
/// advanced by the time integrator.
#[derive(Debug, Clone, PartialEq)]
pub struct AcousticField<T: Real> {
    pub potential: DVector<T>,
    pub potential_dot: DVector<T>,
    pub potential_dot_dot: DVector<T>,
}

impl<T: Real> AcousticField<T> {
    pub fn zeros(nglob: usize) -> Self {
        Self {
            potential: DVector::zeros(nglob),
            potential_dot: DVector::zeros(nglob),
            potential_dot_dot: DVector::zeros(nglob),
        }
    }

    /// Creates a field at rest with the given potential.
    pub fn from_potential(potential: DVector<T>) -> Self {
        let nglob = potential.len();
        Self {
            potential,
            potential_dot: DVector::zeros(nglob),
            potential_dot_dot: DVector::zeros(nglob),
        }
    }

    pub fn num_global_nodes(&self) -> usize {
        self.potential.len()
    }

    /// Zeroes the acceleration before a new stiffness evaluation.
    pub fn reset_acceleration(&mut self) {
        self.potential_dot_dot.fill(T::zero());
    }
}
