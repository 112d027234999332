//! The Gauss-Lobatto-Legendre quadrature descriptor shared by all elements of one order.
use crate::error::SetupError;
use crate::Real;
use nalgebra::{convert, try_convert, SMatrix, SVector};
use semwave_quadrature::lagrange::{lagrange_basis_into, lagrange_derivative_matrix};
use semwave_quadrature::univariate::gauss_lobatto;

/// GLL points, weights and Lagrange derivative matrices for `N` points per direction.
///
/// The same descriptor is used along both reference axes, so `hprime_xx == hprime_zz`. It is
/// built once and shared read-only by every element and every execution lane.
#[derive(Debug, Clone, PartialEq)]
pub struct GllQuadrature<T: Real, const N: usize> {
    points_f64: [f64; N],
    points: SVector<T, N>,
    weights: SVector<T, N>,
    hprime: SMatrix<T, N, N>,
    hprime_wgll: SMatrix<T, N, N>,
}

impl<T: Real, const N: usize> GllQuadrature<T, N> {
    pub fn new() -> Result<Self, SetupError> {
        let (weights_f64, points_f64) =
            gauss_lobatto(N).map_err(|_| SetupError::InvalidQuadratureOrder { order: N })?;
        let points_f64: Vec<f64> = points_f64.into_iter().map(|[x]| x).collect();
        // GLL points are distinct by construction
        let hprime_f64 = lagrange_derivative_matrix(&points_f64)
            .map_err(|_| SetupError::InvalidQuadratureOrder { order: N })?;

        let points = SVector::from_fn(|i, _| convert(points_f64[i]));
        let points_f64 = std::array::from_fn(|i| points_f64[i]);
        let weights: SVector<T, N> = SVector::from_fn(|i, _| convert(weights_f64[i]));
        let hprime: SMatrix<T, N, N> = SMatrix::from_fn(|i, j| convert(hprime_f64[i * N + j]));
        let hprime_wgll = SMatrix::from_fn(|i, l| weights[l] * hprime[(l, i)]);

        Ok(Self {
            points_f64,
            points,
            weights,
            hprime,
            hprime_wgll,
        })
    }

    /// The number of GLL points per direction.
    pub fn ngll(&self) -> usize {
        N
    }

    pub fn points(&self) -> &SVector<T, N> {
        &self.points
    }

    pub fn weights(&self) -> &SVector<T, N> {
        &self.weights
    }

    /// The Lagrange derivative matrix with `hprime[(i, j)] = l_j'(x_i)`.
    pub fn hprime(&self) -> &SMatrix<T, N, N> {
        &self.hprime
    }

    /// The weighted, transposed derivative matrix `hprime_wgll[(i, l)] = w_l * l_i'(x_l)`.
    pub fn hprime_wgll(&self) -> &SMatrix<T, N, N> {
        &self.hprime_wgll
    }

    /// Evaluates the Lagrange polynomials and their derivatives at the reference coordinate `xi`.
    pub fn lagrange_at(&self, xi: T) -> (SVector<T, N>, SVector<T, N>) {
        let xi: f64 = try_convert(xi).expect("Reference coordinate must fit in f64");
        let mut h = [0.0; N];
        let mut h_prime = [0.0; N];
        lagrange_basis_into(&self.points_f64, xi, &mut h, &mut h_prime);
        (
            SVector::from_fn(|j, _| convert(h[j])),
            SVector::from_fn(|j, _| convert(h_prime[j])),
        )
    }
}
