//! Lagrange interpolating polynomials on a set of distinct nodes.
//!
//! For nodes `x_0, ..., x_{n-1}` the Lagrange polynomial `l_j` is the unique polynomial of
//! degree `n - 1` with `l_j(x_i) = δ_ij`.

use crate::Error;

fn check_distinct(points: &[f64]) -> Result<(), Error> {
    for (i, a) in points.iter().enumerate() {
        if points[i + 1..].iter().any(|b| a == b) {
            return Err(Error::DuplicatePoints);
        }
    }
    Ok(())
}

/// Evaluates all Lagrange polynomials through `points` and their derivatives at `x`.
///
/// Returns `(h, h_prime)` where `h[j] = l_j(x)` and `h_prime[j] = l_j'(x)`.
pub fn lagrange_basis(points: &[f64], x: f64) -> Result<(Vec<f64>, Vec<f64>), Error> {
    check_distinct(points)?;
    let mut h = vec![0.0; points.len()];
    let mut h_prime = vec![0.0; points.len()];
    lagrange_basis_into(points, x, &mut h, &mut h_prime);
    Ok((h, h_prime))
}

/// Writes `l_j(x)` to `h[j]` and `l_j'(x)` to `h_prime[j]` for all Lagrange polynomials through
/// `points`.
///
/// The points are not checked. Duplicate points produce non-finite values.
///
/// # Panics
///
/// Panics if `h` or `h_prime` is shorter than `points`.
pub fn lagrange_basis_into(points: &[f64], x: f64, h: &mut [f64], h_prime: &mut [f64]) {
    for (j, &x_j) in points.iter().enumerate() {
        let mut prod = 1.0;
        let mut prod_derivative = 0.0;
        for (m, &x_m) in points.iter().enumerate() {
            if m == j {
                continue;
            }
            // Product rule applied one factor at a time
            let factor = (x - x_m) / (x_j - x_m);
            prod_derivative = prod_derivative * factor + prod / (x_j - x_m);
            prod *= factor;
        }
        h[j] = prod;
        h_prime[j] = prod_derivative;
    }
}

/// Computes the Lagrange derivative matrix in row-major order.
///
/// The entry at `(i, j)`, stored at index `i * n + j`, is `l_j'(x_i)`, the derivative of the
/// `j`-th Lagrange polynomial evaluated at the `i`-th node.
pub fn lagrange_derivative_matrix(points: &[f64]) -> Result<Vec<f64>, Error> {
    check_distinct(points)?;
    let n = points.len();

    // Barycentric form: c_i = prod_{k != i} (x_i - x_k)
    let c: Vec<f64> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&k| k != i)
                .map(|k| points[i] - points[k])
                .product()
        })
        .collect();

    let mut hprime = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            hprime[i * n + j] = if i == j {
                (0..n)
                    .filter(|&k| k != i)
                    .map(|k| 1.0 / (points[i] - points[k]))
                    .sum()
            } else {
                (c[i] / c[j]) / (points[i] - points[j])
            };
        }
    }

    Ok(hprime)
}
