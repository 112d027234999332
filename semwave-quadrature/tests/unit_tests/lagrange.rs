use semwave_quadrature::lagrange::{lagrange_basis, lagrange_derivative_matrix};
use semwave_quadrature::univariate::gauss_lobatto;
use semwave_quadrature::Error;

use matrixcompare::assert_scalar_eq;
use proptest::prelude::*;

fn gll_points(n: usize) -> Vec<f64> {
    let (_, points) = gauss_lobatto(n).unwrap();
    points.into_iter().map(|[x]| x).collect()
}

#[test]
fn lagrange_basis_is_kronecker_delta_at_nodes() {
    let points = gll_points(6);
    for (i, &x_i) in points.iter().enumerate() {
        let (h, _) = lagrange_basis(&points, x_i).unwrap();
        for (j, h_j) in h.iter().enumerate() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_scalar_eq!(*h_j, expected, comp = abs, tol = 1e-14);
        }
    }
}

#[test]
fn derivative_matrix_agrees_with_basis_derivatives() {
    let points = gll_points(7);
    let n = points.len();
    let hprime = lagrange_derivative_matrix(&points).unwrap();
    for (i, &x_i) in points.iter().enumerate() {
        let (_, h_prime) = lagrange_basis(&points, x_i).unwrap();
        for j in 0..n {
            assert_scalar_eq!(hprime[i * n + j], h_prime[j], comp = abs, tol = 1e-11);
        }
    }
}

#[test]
fn derivative_matrix_differentiates_polynomials_exactly() {
    // Any polynomial of degree <= n - 1 is reproduced exactly by the interpolant
    let points = gll_points(5);
    let n = points.len();
    let hprime = lagrange_derivative_matrix(&points).unwrap();
    let f = |x: f64| 2.0 * x.powi(4) - x.powi(3) + 0.5 * x - 3.0;
    let df = |x: f64| 8.0 * x.powi(3) - 3.0 * x.powi(2) + 0.5;

    for i in 0..n {
        let derivative: f64 = (0..n).map(|j| hprime[i * n + j] * f(points[j])).sum();
        assert_scalar_eq!(derivative, df(points[i]), comp = abs, tol = 1e-12);
    }
}

#[test]
fn duplicate_points_are_rejected() {
    assert_eq!(lagrange_basis(&[0.0, 0.5, 0.5], 0.1), Err(Error::DuplicatePoints));
    assert_eq!(lagrange_derivative_matrix(&[-1.0, -1.0]), Err(Error::DuplicatePoints));
}

proptest! {
    #[test]
    fn lagrange_basis_is_partition_of_unity(x in -1.0 ..= 1.0f64, n in 2 ..= 10usize) {
        let points = gll_points(n);
        let (h, h_prime) = lagrange_basis(&points, x).unwrap();
        let sum: f64 = h.iter().sum();
        let derivative_sum: f64 = h_prime.iter().sum();
        prop_assert!((sum - 1.0).abs() <= 1e-12);
        prop_assert!(derivative_sum.abs() <= 1e-10);
    }
}
