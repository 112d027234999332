use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use semwave::error::SetupError;
use semwave::nalgebra::{SMatrix, SVector};
use semwave::quadrature::GllQuadrature;
use semwave_quadrature::lagrange::lagrange_basis;

#[test]
fn gll_quadrature_rejects_single_point() {
    assert_eq!(
        GllQuadrature::<f64, 1>::new(),
        Err(SetupError::InvalidQuadratureOrder { order: 1 })
    );
}

#[test]
fn gll_points_are_symmetric_and_include_end_points() {
    let quadrature = GllQuadrature::<f64, 5>::new().unwrap();
    let points = quadrature.points();
    assert_scalar_eq!(points[0], -1.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(points[4], 1.0, comp = abs, tol = 1e-14);
    for i in 0..5 {
        assert_scalar_eq!(points[i], -points[4 - i], comp = abs, tol = 1e-14);
    }
    assert_scalar_eq!(quadrature.weights().sum(), 2.0, comp = abs, tol = 1e-14);
    assert_eq!(quadrature.ngll(), 5);
}

#[test]
fn hprime_differentiates_polynomials_exactly() {
    let quadrature = GllQuadrature::<f64, 6>::new().unwrap();
    let points = quadrature.points();
    let hprime = quadrature.hprime();

    for degree in 0..6 {
        let values = points.map(|x| x.powi(degree));
        let expected = points.map(|x| if degree == 0 { 0.0 } else { degree as f64 * x.powi(degree - 1) });
        let derivative = hprime * values;
        assert_matrix_eq!(derivative, expected, comp = abs, tol = 1e-11);
    }
}

#[test]
fn hprime_wgll_is_weighted_transpose() {
    let quadrature = GllQuadrature::<f64, 4>::new().unwrap();
    let weights = quadrature.weights();
    let expected = SMatrix::<f64, 4, 4>::from_fn(|i, l| weights[l] * quadrature.hprime()[(l, i)]);
    assert_matrix_eq!(*quadrature.hprime_wgll(), expected, comp = abs, tol = 1e-15);
}

#[test]
fn lagrange_at_gll_point_is_kronecker_delta() {
    let quadrature = GllQuadrature::<f64, 5>::new().unwrap();
    for j in 0..5 {
        let (h, h_prime) = quadrature.lagrange_at(quadrature.points()[j]);
        let expected = SVector::<f64, 5>::from_fn(|i, _| if i == j { 1.0 } else { 0.0 });
        assert_matrix_eq!(h, expected, comp = abs, tol = 1e-13);
        // The derivatives at a node are the corresponding row of the derivative matrix
        assert_matrix_eq!(h_prime.transpose(), quadrature.hprime().row(j), comp = abs, tol = 1e-11);
    }
}

#[test]
fn lagrange_at_forms_partition_of_unity() {
    let quadrature = GllQuadrature::<f64, 7>::new().unwrap();
    for &xi in &[-0.93, -0.31, 0.0, 0.123, 0.77] {
        let (h, h_prime) = quadrature.lagrange_at(xi);
        assert_scalar_eq!(h.sum(), 1.0, comp = abs, tol = 1e-13);
        assert_scalar_eq!(h_prime.sum(), 0.0, comp = abs, tol = 1e-11);
    }
}

#[test]
fn lagrange_at_agrees_with_basis_on_gll_points() {
    let quadrature = GllQuadrature::<f32, 6>::new().unwrap();
    let points: Vec<f64> = quadrature.points().iter().map(|&x| f64::from(x)).collect();
    for &xi in &[-0.8f32, 0.05, 0.6] {
        let (h, h_prime) = quadrature.lagrange_at(xi);
        let (expected, expected_prime) = lagrange_basis(&points, f64::from(xi)).unwrap();
        for j in 0..6 {
            assert_scalar_eq!(f64::from(h[j]), expected[j], comp = abs, tol = 1e-5);
            assert_scalar_eq!(f64::from(h_prime[j]), expected_prime[j], comp = abs, tol = 1e-4);
        }
    }
}
