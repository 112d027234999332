//! Quadrature rules for the one-dimensional domain `[-1, 1]`.

use crate::{Error, Rule};
use std::f64::consts::PI;

/// Values of the Legendre polynomial `p_n` and of `p_{n - 1}` at a point.
///
/// Derivatives are computed from the pair of values and are undefined at `x = -1` and `x = 1`.
#[derive(Debug)]
struct Legendre {
    degree: usize,
    x: f64,
    current: f64,
    previous: f64,
}

impl Legendre {
    fn evaluate(degree: usize, x: f64) -> Self {
        // Bonnet's recursion: m p_m = (2m - 1) x p_{m - 1} - (m - 1) p_{m - 2}
        let (mut current, mut previous) = (1.0, 0.0);
        for m in 1..=degree {
            let m = m as f64;
            let next = ((2.0 * m - 1.0) * x * current - (m - 1.0) * previous) / m;
            previous = current;
            current = next;
        }
        Self {
            degree,
            x,
            current,
            previous,
        }
    }

    fn value(&self) -> f64 {
        self.current
    }

    fn derivative(&self) -> f64 {
        let n = self.degree as f64;
        let x = self.x;
        n * (x * self.current - self.previous) / (x * x - 1.0)
    }

    /// Second derivative from the Legendre equation `(1 - x^2) p'' - 2 x p' + n (n + 1) p = 0`.
    fn second_derivative(&self) -> f64 {
        let n = self.degree as f64;
        let x = self.x;
        (2.0 * x * self.derivative() - n * (n + 1.0) * self.value()) / (1.0 - x * x)
    }
}

/// Maximum number of Newton iterations spent on a single Gauss-Lobatto root.
const MAX_LOBATTO_NEWTON_ITERATIONS: usize = 100;

/// Gauss-Lobatto-Legendre quadrature for the reference interval [-1, 1].
///
/// The `n` points consist of the two end points and the `n - 2` roots of `p'_{n - 1}`, sorted
/// in ascending order. The rule integrates polynomials of order up to `2 n - 3` exactly.
///
/// Returns `None` if fewer than two points are requested, since a Lobatto rule must contain
/// both end points.
pub fn try_gauss_lobatto(num_points: usize) -> Option<Rule<1>> {
    let n = num_points;
    if n < 2 {
        return None;
    }

    // The interior points are the roots of the derivative of p_{n - 1}
    let degree = n - 1;
    let end_weight = 2.0 / (n as f64 * (n as f64 - 1.0));

    let mut points = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);
    points.push([-1.0]);
    weights.push(end_weight);

    // Only find the interior roots in the left half, the rest follow by symmetry
    let num_interior = n - 2;
    let num_left = (num_interior + 1) / 2;
    for i in 1..=num_left {
        // Chebyshev-Gauss-Lobatto points are a good initial guess
        let mut x = -(PI * i as f64 / degree as f64).cos();
        for _ in 0..MAX_LOBATTO_NEWTON_ITERATIONS {
            let recurrence = Legendre::evaluate(degree, x);
            let dx = -recurrence.derivative() / recurrence.second_derivative();
            x += dx;
            if dx.abs() <= 1e-15 {
                break;
            }
        }

        let p = Legendre::evaluate(degree, x).value();
        points.push([x]);
        weights.push(2.0 / (degree as f64 * (degree as f64 + 1.0) * p * p));
    }

    // An odd number of interior points has its middle root at the origin
    if num_interior % 2 == 1 {
        let middle = points.len() - 1;
        points[middle] = [0.0];
        let p = Legendre::evaluate(degree, 0.0).value();
        weights[middle] = 2.0 / (degree as f64 * (degree as f64 + 1.0) * p * p);
    }

    let num_mirrored = num_interior - num_left;
    for k in 0..num_mirrored {
        let mirror_idx = num_interior / 2 - k;
        points.push([-points[mirror_idx][0]]);
        weights.push(weights[mirror_idx]);
    }

    points.push([1.0]);
    weights.push(end_weight);

    assert_eq!(points.len(), n, "Internal error: incorrect number of points produced");

    Some((weights, points))
}

/// Gauss-Lobatto-Legendre quadrature for the reference interval [-1, 1].
///
/// Returns an error if fewer than two points are requested.
pub fn gauss_lobatto(num_points: usize) -> Result<Rule<1>, Error> {
    try_gauss_lobatto(num_points).ok_or(Error::NoRuleAvailable)
}
