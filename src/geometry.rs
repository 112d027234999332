//! Element geometry and the per-point metric terms of the reference-to-physical map.
use crate::error::SetupError;
use crate::mesh::Mesh;
use crate::quadrature::GllQuadrature;
use crate::Real;
use itertools::Itertools;
use log::debug;
use nalgebra::{convert, distance, Matrix2, Matrix2x4, Point2, Vector2, Vector4};
use numeric_literals::replace_float_literals;
use rayon::prelude::*;

/// Maximum number of Newton iterations when inverting the reference map.
const MAX_NEWTON_ITERATIONS: usize = 20;

/// A bilinear quadrilateral control element.
///
/// Vertices are ordered counter-clockwise starting at the corner mapped from
/// `(xi, gamma) = (-1, -1)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quad4Geometry<T: Real> {
    vertices: [Point2<T>; 4],
}

impl<T: Real> Quad4Geometry<T> {
    pub fn from_vertices(vertices: [Point2<T>; 4]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point2<T>; 4] {
        &self.vertices
    }

    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn evaluate_basis(&self, xi: &Point2<T>) -> Vector4<T> {
        // N_{alpha, beta}([alpha, beta]) = 1 with alpha, beta = 1 or -1
        let phi = |alpha: T, beta: T| (1.0 + alpha * xi[0]) * (1.0 + beta * xi[1]) / 4.0;
        Vector4::new(
            phi(-1.0, -1.0),
            phi( 1.0, -1.0),
            phi( 1.0,  1.0),
            phi(-1.0,  1.0),
        )
    }

    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn gradients(&self, xi: &Point2<T>) -> Matrix2x4<T> {
        let phi_grad = |alpha: T, beta: T| {
            Vector2::new(
                alpha * (1.0 + beta * xi[1]) / 4.0,
                beta * (1.0 + alpha * xi[0]) / 4.0,
            )
        };

        Matrix2x4::from_columns(&[
            phi_grad(-1.0, -1.0),
            phi_grad( 1.0, -1.0),
            phi_grad( 1.0,  1.0),
            phi_grad(-1.0,  1.0),
        ])
    }

    #[allow(non_snake_case)]
    pub fn map_reference_coords(&self, xi: &Point2<T>) -> Point2<T> {
        let X: Matrix2x4<T> = Matrix2x4::from_fn(|i, j| self.vertices[j][i]);
        Point2::from(X * self.evaluate_basis(xi))
    }

    /// The Jacobian `[[dx/dxi, dx/dgamma], [dz/dxi, dz/dgamma]]` of the reference map.
    #[allow(non_snake_case)]
    pub fn reference_jacobian(&self, xi: &Point2<T>) -> Matrix2<T> {
        let X: Matrix2x4<T> = Matrix2x4::from_fn(|i, j| self.vertices[j][i]);
        X * self.gradients(xi).transpose()
    }

    /// The largest distance between any two vertices.
    pub fn diameter(&self) -> T {
        self.vertices
            .iter()
            .tuple_combinations()
            .map(|(x, y)| distance(x, y))
            .fold(T::zero(), |a, b| a.max(b))
    }

    /// Finds the reference coordinates mapped to the physical point `x` with Newton's method.
    ///
    /// Returns `None` if the iteration does not converge or the Jacobian becomes singular. The
    /// returned coordinates may lie outside the reference square if `x` is outside the element.
    pub fn map_physical_coords(&self, x: &Point2<T>) -> Option<Point2<T>> {
        // We seek xi such that T(xi) - x = 0. The diameter of the element gives a representative
        // scale for the residual.
        let tolerance = convert::<_, T>(1e-12) * self.diameter();
        let mut xi = Point2::origin();
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let residual = self.map_reference_coords(&xi) - x;
            if residual.norm() <= tolerance {
                return Some(xi);
            }
            let step = self.reference_jacobian(&xi).lu().solve(&residual)?;
            xi -= step;
        }
        let residual = self.map_reference_coords(&xi) - x;
        (residual.norm() <= tolerance).then_some(xi)
    }
}

/// Metric terms of the inverse reference map at a single GLL point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointPartialDerivatives<T> {
    pub xix: T,
    pub xiz: T,
    pub gammax: T,
    pub gammaz: T,
    pub jacobian: T,
}

impl<T: Real> PointPartialDerivatives<T> {
    /// Computes the metric terms from the forward Jacobian matrix `dx/dxi`.
    pub fn from_reference_jacobian(j: &Matrix2<T>) -> Self {
        let xxi = j[(0, 0)];
        let xgamma = j[(0, 1)];
        let zxi = j[(1, 0)];
        let zgamma = j[(1, 1)];
        let jacobian = xxi * zgamma - xgamma * zxi;
        Self {
            xix: zgamma / jacobian,
            xiz: -xgamma / jacobian,
            gammax: -zxi / jacobian,
            gammaz: xxi / jacobian,
            jacobian,
        }
    }
}

/// Metric terms `dxi/dx`, `dxi/dz`, `dgamma/dx`, `dgamma/dz` and the Jacobian determinant at
/// every GLL point of every element.
///
/// Each component is stored in a flat array indexed by `(ispec * N + iz) * N + ix`. The data is
/// immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialDerivatives<T> {
    ngll: usize,
    nspec: usize,
    xix: Vec<T>,
    xiz: Vec<T>,
    gammax: Vec<T>,
    gammaz: Vec<T>,
    jacobian: Vec<T>,
}

impl<T: Real> PartialDerivatives<T> {
    /// Computes the metric terms at the GLL points of all elements in the mesh.
    ///
    /// Fails if any element has a non-positive Jacobian at any GLL point.
    pub fn from_mesh<const N: usize>(mesh: &Mesh<T>, quadrature: &GllQuadrature<T, N>) -> Result<Self, SetupError> {
        let nspec = mesh.num_elements();
        let points = quadrature.points();

        let per_element: Vec<Vec<PointPartialDerivatives<T>>> = (0..nspec)
            .into_par_iter()
            .map(|ispec| -> Result<Vec<PointPartialDerivatives<T>>, SetupError> {
                let element = mesh.element_geometry(ispec);
                let mut values = Vec::with_capacity(N * N);
                for iz in 0..N {
                    for ix in 0..N {
                        let xi = Point2::new(points[ix], points[iz]);
                        let derivatives =
                            PointPartialDerivatives::from_reference_jacobian(&element.reference_jacobian(&xi));
                        check_jacobian(ispec, iz, ix, derivatives.jacobian)?;
                        values.push(derivatives);
                    }
                }
                Ok(values)
            })
            .collect::<Result<_, _>>()?;

        let mut result = Self::with_capacity(N, nspec);
        for derivatives in per_element.iter().flatten() {
            result.push(derivatives);
        }
        debug!("Computed partial derivatives for {} elements with {} GLL points", nspec, N);
        Ok(result)
    }

    /// Builds the metric terms from externally produced arrays.
    ///
    /// All arrays must have length `nspec * ngll * ngll`, and every Jacobian must be positive.
    pub fn try_from_parts(
        ngll: usize,
        nspec: usize,
        xix: Vec<T>,
        xiz: Vec<T>,
        gammax: Vec<T>,
        gammaz: Vec<T>,
        jacobian: Vec<T>,
    ) -> Result<Self, SetupError> {
        let expected = nspec * ngll * ngll;
        for (what, array) in [
            ("xix", &xix),
            ("xiz", &xiz),
            ("gammax", &gammax),
            ("gammaz", &gammaz),
            ("jacobian", &jacobian),
        ] {
            if array.len() != expected {
                return Err(SetupError::LengthMismatch {
                    what,
                    expected,
                    found: array.len(),
                });
            }
        }

        for (index, &j) in jacobian.iter().enumerate() {
            let ispec = index / (ngll * ngll);
            let iz = (index / ngll) % ngll;
            let ix = index % ngll;
            check_jacobian(ispec, iz, ix, j)?;
        }

        Ok(Self {
            ngll,
            nspec,
            xix,
            xiz,
            gammax,
            gammaz,
            jacobian,
        })
    }

    fn with_capacity(ngll: usize, nspec: usize) -> Self {
        let n = nspec * ngll * ngll;
        Self {
            ngll,
            nspec,
            xix: Vec::with_capacity(n),
            xiz: Vec::with_capacity(n),
            gammax: Vec::with_capacity(n),
            gammaz: Vec::with_capacity(n),
            jacobian: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, derivatives: &PointPartialDerivatives<T>) {
        self.xix.push(derivatives.xix);
        self.xiz.push(derivatives.xiz);
        self.gammax.push(derivatives.gammax);
        self.gammaz.push(derivatives.gammaz);
        self.jacobian.push(derivatives.jacobian);
    }

    pub fn ngll(&self) -> usize {
        self.ngll
    }

    pub fn num_elements(&self) -> usize {
        self.nspec
    }

    /// Returns the metric terms at GLL point `(iz, ix)` of element `ispec`.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    pub fn at(&self, ispec: usize, iz: usize, ix: usize) -> PointPartialDerivatives<T> {
        let n = self.ngll;
        assert!(iz < n && ix < n, "GLL point index out of bounds");
        let index = (ispec * n + iz) * n + ix;
        PointPartialDerivatives {
            xix: self.xix[index],
            xiz: self.xiz[index],
            gammax: self.gammax[index],
            gammaz: self.gammaz[index],
            jacobian: self.jacobian[index],
        }
    }

    /// Returns the metric terms of a single element, as slices of length `ngll * ngll`
    /// in the order `(xix, xiz, gammax, gammaz, jacobian)`.
    pub fn element(&self, ispec: usize) -> (&[T], &[T], &[T], &[T], &[T]) {
        let n = self.ngll * self.ngll;
        let range = ispec * n..(ispec + 1) * n;
        (
            &self.xix[range.clone()],
            &self.xiz[range.clone()],
            &self.gammax[range.clone()],
            &self.gammaz[range.clone()],
            &self.jacobian[range],
        )
    }
}

fn check_jacobian<T: Real>(ispec: usize, iz: usize, ix: usize, jacobian: T) -> Result<(), SetupError> {
    // Also catches NaN
    if jacobian > T::zero() {
        Ok(())
    } else {
        Err(SetupError::DegenerateElement {
            ispec,
            iz,
            ix,
            jacobian: jacobian.to_subset().unwrap_or(f64::NAN),
        })
    }
}
