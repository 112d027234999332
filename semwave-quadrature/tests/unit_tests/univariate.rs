use semwave_quadrature::integrate;
use semwave_quadrature::univariate::{gauss_lobatto, try_gauss_lobatto};

use matrixcompare::assert_scalar_eq;

#[test]
fn gauss_lobatto_rules_satisfy_expected_accuracy() {
    assert!(try_gauss_lobatto(0).is_none());
    assert!(try_gauss_lobatto(1).is_none());
    assert!(gauss_lobatto(1).is_err());

    for n in 2..=20 {
        let expected_polynomial_degree = 2 * n - 3;
        let rule = try_gauss_lobatto(n).unwrap();

        // Check that rule contains endpoints, like Gauss-Lobatto should
        assert_eq!(rule.1.first().unwrap(), &[-1.0]);
        assert_eq!(rule.1.last().unwrap(), &[1.0]);

        assert!(rule.0.iter().all(|&w| w > 0.0));
        assert!(rule.1.windows(2).all(|pair| pair[0][0] < pair[1][0]));

        for alpha in 0..=expected_polynomial_degree as i32 {
            let monomial = |x: f64| x.powi(alpha);
            let monomial_integral = (1.0 - (-1.0f64).powi(alpha + 1)) / (alpha as f64 + 1.0);
            let estimated_integral = integrate(&rule, |x| monomial(x[0]));

            assert_scalar_eq!(estimated_integral, monomial_integral, comp = abs, tol = 1e-13);
        }
    }
}

#[test]
fn gauss_lobatto_five_points_match_closed_form() {
    let (weights, points) = gauss_lobatto(5).unwrap();
    let a = (3.0f64 / 7.0).sqrt();
    let expected_points = [-1.0, -a, 0.0, a, 1.0];
    let expected_weights = [0.1, 49.0 / 90.0, 32.0 / 45.0, 49.0 / 90.0, 0.1];

    for i in 0..5 {
        assert_scalar_eq!(points[i][0], expected_points[i], comp = abs, tol = 1e-14);
        assert_scalar_eq!(weights[i], expected_weights[i], comp = abs, tol = 1e-14);
    }
}
