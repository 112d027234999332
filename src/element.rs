//! Element capability tags and the per-element kernel contract.
//!
//! Every element is classified once at setup by an [`ElementKind`]. The kind selects a
//! concrete [`ElementKernel`] implementation, and the domain dispatches batches of elements
//! sharing the same kind to that implementation, so the per-point loop is monomorphized and
//! free of dynamic dispatch.
use crate::Real;
use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

mod acoustic;

pub use acoustic::Acoustic2dIsotropic;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    Dim2,
    Dim3,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Medium {
    Acoustic,
    Elastic,
    Poroelastic,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PropertyClass {
    Isotropic,
    Anisotropic,
}

/// The capability set of an element, excluding the quadrature order.
///
/// The quadrature order is carried at the type level by the const parameter `N` of the
/// kernels and the quadrature descriptor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementKind {
    pub dimension: Dimension,
    pub medium: Medium,
    pub property_class: PropertyClass,
}

impl ElementKind {
    pub const fn new(dimension: Dimension, medium: Medium, property_class: PropertyClass) -> Self {
        Self {
            dimension,
            medium,
            property_class,
        }
    }

    pub const ACOUSTIC_2D_ISOTROPIC: Self = Self::new(Dimension::Dim2, Medium::Acoustic, PropertyClass::Isotropic);
    pub const ELASTIC_2D_ISOTROPIC: Self = Self::new(Dimension::Dim2, Medium::Elastic, PropertyClass::Isotropic);
}

impl Display for Dimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Dim2 => write!(f, "2D"),
            Dimension::Dim3 => write!(f, "3D"),
        }
    }
}

impl Display for Medium {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Medium::Acoustic => write!(f, "acoustic"),
            Medium::Elastic => write!(f, "elastic"),
            Medium::Poroelastic => write!(f, "poroelastic"),
        }
    }
}

impl Display for PropertyClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PropertyClass::Isotropic => write!(f, "isotropic"),
            PropertyClass::Anisotropic => write!(f, "anisotropic"),
        }
    }
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.dimension, self.medium, self.property_class)
    }
}

/// The three-operation contract shared by all spectral element kernels.
///
/// Implementations are cheap views over precomputed geometry and material data of a single
/// element. All operations only read that data; the single output of the kernel is the
/// scatter-add into `target` in [`update_acceleration`](Self::update_acceleration).
///
/// GLL points are addressed by `(iz, ix)`, where `ix` runs along the `xi` axis and `iz` along
/// the `gamma` axis. Element-local matrices are indexed the same way, i.e. `field[(iz, ix)]`.
pub trait ElementKernel<T: Real, const N: usize> {
    /// The capability set implemented by this kernel.
    const KIND: ElementKind;

    /// The index of the element in the mesh.
    fn ispec(&self) -> usize;

    /// Computes the physical gradient `(d/dx, d/dz)` of `field` at GLL point `(iz, ix)`.
    fn compute_gradient(
        &self,
        iz: usize,
        ix: usize,
        hprime_xx: &SMatrix<T, N, N>,
        hprime_zz: &SMatrix<T, N, N>,
        field: &SMatrix<T, N, N>,
    ) -> (T, T);

    /// Computes the Jacobian-weighted stress integrands `(xi, gamma)` at GLL point `(iz, ix)`.
    fn compute_stress(&self, iz: usize, ix: usize, dfield_dx: T, dfield_dz: T) -> (T, T);

    /// Adds the weak-form contribution at GLL point `(iz, ix)` to `target`.
    ///
    /// `stress_xi` and `stress_gamma` must hold the integrands at every GLL point of the
    /// element.
    #[allow(clippy::too_many_arguments)]
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
    );
}
