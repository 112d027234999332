//! Quadrature and interpolation primitives for spectral elements.
//!
//! The main purpose of this crate is to support the `semwave` spectral-element library.
//! Everything here works on the reference interval `[-1, 1]` in `f64`; conversion to other
//! scalar types and tensor-product layouts is left to the consumer.

use std::fmt;
use std::fmt::{Display, Formatter};

pub mod lagrange;
pub mod univariate;

/// Library-wide error type.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Indicates that a rule satisfying the given requirements is not available.
    NoRuleAvailable,
    /// Interpolation points must be pairwise distinct.
    DuplicatePoints,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuleAvailable => {
                write!(f, "There is no quadrature rule satisfying the requirements available")
            }
            Self::DuplicatePoints => {
                write!(f, "Interpolation points are not pairwise distinct")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A D-dimensional point.
pub type Point<const D: usize> = [f64; D];

/// A D-dimensional rule.
pub type Rule<const D: usize> = (Vec<f64>, Vec<Point<D>>);

/// A one-dimensional rule.
pub type Rule1d = Rule<1>;

/// Approximates the integral of `f` with the given rule.
pub fn integrate<const D: usize>(rule: &Rule<D>, f: impl Fn(&Point<D>) -> f64) -> f64 {
    let (weights, points) = rule;
    weights.iter().zip(points).map(|(w, p)| w * f(p)).sum()
}
