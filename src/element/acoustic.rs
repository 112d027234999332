use crate::element::{ElementKernel, ElementKind};
use crate::geometry::PartialDerivatives;
use crate::properties::Properties;
use crate::Real;
use nalgebra::{SMatrix, SVector};

/// Isotropic acoustic kernel for 2D elements with `N` GLL points per direction.
///
/// Holds no data of its own, only the element index and views into the metric terms and
/// material coefficients of that element.
#[derive(Debug, Copy, Clone)]
pub struct Acoustic2dIsotropic<'a, T, const N: usize> {
    ispec: usize,
    xix: &'a [T],
    xiz: &'a [T],
    gammax: &'a [T],
    gammaz: &'a [T],
    jacobian: &'a [T],
    rho_inverse: &'a [T],
}

impl<'a, T: Real, const N: usize> Acoustic2dIsotropic<'a, T, N> {
    /// Creates the kernel view of element `ispec`.
    ///
    /// # Panics
    ///
    /// Panics if `ispec` is out of bounds or if the geometry or material data was built for a
    /// different number of GLL points.
    pub fn new(ispec: usize, derivatives: &'a PartialDerivatives<T>, properties: &'a Properties<T>) -> Self {
        assert_eq!(derivatives.ngll(), N, "Partial derivatives must match quadrature order");
        assert_eq!(properties.ngll(), N, "Properties must match quadrature order");
        let (xix, xiz, gammax, gammaz, jacobian) = derivatives.element(ispec);
        Self {
            ispec,
            xix,
            xiz,
            gammax,
            gammaz,
            jacobian,
            rho_inverse: properties.element_rho_inverse(ispec),
        }
    }

    #[inline(always)]
    fn index(iz: usize, ix: usize) -> usize {
        iz * N + ix
    }
}

impl<'a, T: Real, const N: usize> ElementKernel<T, N> for Acoustic2dIsotropic<'a, T, N> {
    const KIND: ElementKind = ElementKind::ACOUSTIC_2D_ISOTROPIC;

    fn ispec(&self) -> usize {
        self.ispec
    }

    #[inline]
    fn compute_gradient(
        &self,
        iz: usize,
        ix: usize,
        hprime_xx: &SMatrix<T, N, N>,
        hprime_zz: &SMatrix<T, N, N>,
        field: &SMatrix<T, N, N>,
    ) -> (T, T) {
        let mut dchi_dxi = T::zero();
        let mut dchi_dgamma = T::zero();
        for l in 0..N {
            dchi_dxi += hprime_xx[(ix, l)] * field[(iz, l)];
            dchi_dgamma += hprime_zz[(iz, l)] * field[(l, ix)];
        }

        let k = Self::index(iz, ix);
        let dchi_dx = dchi_dxi * self.xix[k] + dchi_dgamma * self.gammax[k];
        let dchi_dz = dchi_dxi * self.xiz[k] + dchi_dgamma * self.gammaz[k];
        (dchi_dx, dchi_dz)
    }

    #[inline]
    fn compute_stress(&self, iz: usize, ix: usize, dfield_dx: T, dfield_dz: T) -> (T, T) {
        let k = Self::index(iz, ix);
        // Integrands carry the Jacobian; assembly applies only the 1D weights
        let fac = self.jacobian[k] * self.rho_inverse[k];
        let stress_xi = fac * (dfield_dx * self.xix[k] + dfield_dz * self.xiz[k]);
        let stress_gamma = fac * (dfield_dx * self.gammax[k] + dfield_dz * self.gammaz[k]);
        (stress_xi, stress_gamma)
    }

    #[inline]
    fn update_acceleration(
        &self,
        iz: usize,
        ix: usize,
        wxgll: &SVector<T, N>,
        wzgll: &SVector<T, N>,
        stress_xi: &SMatrix<T, N, N>,
        stress_gamma: &SMatrix<T, N, N>,
        hprimewgll_xx: &SMatrix<T, N, N>,
        hprimewgll_zz: &SMatrix<T, N, N>,
        target: &mut T,
    ) {
        let mut temp1 = T::zero();
        let mut temp2 = T::zero();
        for l in 0..N {
            temp1 += hprimewgll_xx[(ix, l)] * stress_xi[(iz, l)];
            temp2 += hprimewgll_zz[(iz, l)] * stress_gamma[(l, ix)];
        }
        *target -= wzgll[iz] * temp1 + wxgll[ix] * temp2;
    }
}
