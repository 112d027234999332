//! Material descriptions and the per-point material coefficients consumed by the kernels.
use crate::element::{Dimension, ElementKind, Medium, PropertyClass};
use crate::error::SetupError;
use crate::mesh::Mesh;
use crate::Real;
use log::debug;
use nalgebra::convert;
use serde::{Deserialize, Serialize};

/// An isotropic material, as listed in a model description.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "medium", rename_all = "lowercase")]
pub enum Material {
    Acoustic { density: f64, vp: f64 },
    Elastic { density: f64, vp: f64, vs: f64 },
}

impl Material {
    pub fn element_kind(&self) -> ElementKind {
        let medium = match self {
            Material::Acoustic { .. } => Medium::Acoustic,
            Material::Elastic { .. } => Medium::Elastic,
        };
        ElementKind::new(Dimension::Dim2, medium, PropertyClass::Isotropic)
    }

    pub fn density(&self) -> f64 {
        match *self {
            Material::Acoustic { density, .. } | Material::Elastic { density, .. } => density,
        }
    }

    /// The bulk modulus `kappa = density * vp^2` of an acoustic material, or the P-wave modulus
    /// of an elastic one.
    pub fn kappa(&self) -> f64 {
        match *self {
            Material::Acoustic { density, vp } | Material::Elastic { density, vp, .. } => density * vp * vp,
        }
    }

    fn validate(&self, material: usize) -> Result<(), SetupError> {
        let check = |quantity: &'static str, value: f64| {
            // Written to also reject NaN
            if value > 0.0 {
                Ok(())
            } else {
                Err(SetupError::NonPositiveMaterial {
                    material,
                    quantity,
                    value,
                })
            }
        };
        match *self {
            Material::Acoustic { density, vp } => {
                check("density", density)?;
                check("vp", vp)
            }
            Material::Elastic { density, vp, vs } => {
                check("density", density)?;
                check("vp", vp)?;
                check("vs", vs)
            }
        }
    }
}

/// Per-element kinds and per-point material coefficients.
///
/// Coefficients are stored in flat arrays indexed by `(ispec * ngll + iz) * ngll + ix`, the same
/// layout as [`PartialDerivatives`](crate::geometry::PartialDerivatives).
#[derive(Debug, Clone, PartialEq)]
pub struct Properties<T> {
    ngll: usize,
    kinds: Vec<ElementKind>,
    rho_inverse: Vec<T>,
    kappa: Vec<T>,
}

impl<T: Real> Properties<T> {
    /// Assigns the materials referenced by the mesh to all GLL points of each element.
    pub fn from_materials(mesh: &Mesh<T>, materials: &[Material], ngll: usize) -> Result<Self, SetupError> {
        for (index, material) in materials.iter().enumerate() {
            material.validate(index)?;
        }

        let nspec = mesh.num_elements();
        let points_per_element = ngll * ngll;
        let mut kinds = Vec::with_capacity(nspec);
        let mut rho_inverse = Vec::with_capacity(nspec * points_per_element);
        let mut kappa = Vec::with_capacity(nspec * points_per_element);

        for (ispec, &material_index) in mesh.material_indices().iter().enumerate() {
            let material = materials
                .get(material_index)
                .ok_or(SetupError::UnknownMaterial {
                    ispec,
                    material: material_index,
                    num_materials: materials.len(),
                })?;
            kinds.push(material.element_kind());
            let element_rho_inverse: T = convert(1.0 / material.density());
            let element_kappa: T = convert(material.kappa());
            rho_inverse.extend(std::iter::repeat(element_rho_inverse).take(points_per_element));
            kappa.extend(std::iter::repeat(element_kappa).take(points_per_element));
        }

        debug!(
            "Assigned {} materials to {} elements with {} GLL points",
            materials.len(),
            nspec,
            ngll
        );

        Ok(Self {
            ngll,
            kinds,
            rho_inverse,
            kappa,
        })
    }

    /// Builds properties from externally produced arrays.
    ///
    /// Every coefficient must be positive.
    pub fn try_from_parts(
        ngll: usize,
        kinds: Vec<ElementKind>,
        rho_inverse: Vec<T>,
        kappa: Vec<T>,
    ) -> Result<Self, SetupError> {
        let expected = kinds.len() * ngll * ngll;
        for (what, array) in [("rho_inverse", &rho_inverse), ("kappa", &kappa)] {
            if array.len() != expected {
                return Err(SetupError::LengthMismatch {
                    what,
                    expected,
                    found: array.len(),
                });
            }
            if let Some((k, &value)) = array.iter().enumerate().find(|&(_, &value)| !(value > T::zero())) {
                let points_per_element = ngll * ngll;
                let local = k % points_per_element;
                return Err(SetupError::NonPositiveCoefficient {
                    ispec: k / points_per_element,
                    iz: local / ngll,
                    ix: local % ngll,
                    quantity: what,
                    value: value.to_subset().unwrap_or(f64::NAN),
                });
            }
        }

        Ok(Self {
            ngll,
            kinds,
            rho_inverse,
            kappa,
        })
    }

    pub fn ngll(&self) -> usize {
        self.ngll
    }

    pub fn num_elements(&self) -> usize {
        self.kinds.len()
    }

    pub fn kind(&self, ispec: usize) -> ElementKind {
        self.kinds[ispec]
    }

    pub fn kinds(&self) -> &[ElementKind] {
        &self.kinds
    }

    pub fn rho_inverse(&self, ispec: usize, iz: usize, ix: usize) -> T {
        self.rho_inverse[self.index(ispec, iz, ix)]
    }

    pub fn kappa(&self, ispec: usize, iz: usize, ix: usize) -> T {
        self.kappa[self.index(ispec, iz, ix)]
    }

    pub fn element_rho_inverse(&self, ispec: usize) -> &[T] {
        let m = self.ngll * self.ngll;
        &self.rho_inverse[ispec * m..(ispec + 1) * m]
    }

    pub fn element_kappa(&self, ispec: usize) -> &[T] {
        let m = self.ngll * self.ngll;
        &self.kappa[ispec * m..(ispec + 1) * m]
    }

    fn index(&self, ispec: usize, iz: usize, ix: usize) -> usize {
        let n = self.ngll;
        assert!(iz < n && ix < n, "GLL point index out of bounds");
        (ispec * n + iz) * n + ix
    }
}
