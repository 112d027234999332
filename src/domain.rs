//! Dispatch of element kernels over the acoustic part of a mesh.
use crate::element::{Acoustic2dIsotropic, ElementKernel, ElementKind, Medium};
use crate::error::SetupError;
use crate::field::AcousticField;
use crate::geometry::PartialDerivatives;
use crate::mesh::{GlobalNumbering, Partition};
use crate::properties::Properties;
use crate::quadrature::GllQuadrature;
use crate::source::ComputeSources;
use crate::Real;
use itertools::izip;
use log::info;
use nalgebra::{DVector, SMatrix};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod access;
mod coloring;

use access::par_scatter_add;
use coloring::{sequential_greedy_coloring, DisjointColor};

/// How element contributions are scattered into the global acceleration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScatterStrategy {
    /// All elements are processed one after another on the calling thread.
    Serial,
    /// Elements are colored so that no two elements of one color share a global node, and the
    /// elements of each color are processed in parallel.
    #[default]
    Colored,
}

/// The concrete kernel backing an element, resolved once from its [`ElementKind`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum KernelVariant {
    Acoustic2dIsotropic,
}

impl KernelVariant {
    fn resolve(ispec: usize, kind: ElementKind) -> Result<Self, SetupError> {
        if kind == ElementKind::ACOUSTIC_2D_ISOTROPIC {
            Ok(KernelVariant::Acoustic2dIsotropic)
        } else {
            Err(SetupError::UnsupportedElementKind { ispec, kind })
        }
    }
}

/// Owned elements sharing one kernel variant.
#[derive(Debug, Clone)]
struct ElementGroup {
    kind: ElementKind,
    variant: KernelVariant,
    elements: Vec<usize>,
    colors: Vec<DisjointColor>,
}

/// The acoustic elements owned by this rank, together with the data needed to evaluate the
/// stiffness and mass terms of the acoustic wave equation.
///
/// Elements with a non-acoustic medium belong to other domains and are ignored.
#[derive(Debug, Clone)]
pub struct AcousticDomain<'a, T: Real, const N: usize> {
    quadrature: &'a GllQuadrature<T, N>,
    numbering: &'a GlobalNumbering,
    derivatives: &'a PartialDerivatives<T>,
    properties: &'a Properties<T>,
    groups: Vec<ElementGroup>,
    variants: Vec<Option<KernelVariant>>,
    mass_inverse: DVector<T>,
    strategy: ScatterStrategy,
}

impl<'a, T: Real, const N: usize> AcousticDomain<'a, T, N> {
    pub fn new(
        quadrature: &'a GllQuadrature<T, N>,
        numbering: &'a GlobalNumbering,
        derivatives: &'a PartialDerivatives<T>,
        properties: &'a Properties<T>,
        partition: &Partition,
    ) -> Result<Self, SetupError> {
        for found in [numbering.ngll(), derivatives.ngll(), properties.ngll()] {
            if found != N {
                return Err(SetupError::QuadratureMismatch { expected: N, found });
            }
        }
        let nspec = numbering.num_elements();
        for (what, found) in [
            ("partial derivatives", derivatives.num_elements()),
            ("properties", properties.num_elements()),
            ("partition", partition.num_elements()),
        ] {
            if found != nspec {
                return Err(SetupError::LengthMismatch {
                    what,
                    expected: nspec,
                    found,
                });
            }
        }

        let mut variants = vec![None; nspec];
        let mut elements_by_kind: BTreeMap<ElementKind, (KernelVariant, Vec<usize>)> = BTreeMap::new();
        for ispec in partition.owned_elements() {
            let kind = properties.kind(ispec);
            if kind.medium == Medium::Acoustic {
                let variant = KernelVariant::resolve(ispec, kind)?;
                variants[ispec] = Some(variant);
                elements_by_kind
                    .entry(kind)
                    .or_insert_with(|| (variant, Vec::new()))
                    .1
                    .push(ispec);
            }
        }

        let groups: Vec<_> = elements_by_kind
            .into_iter()
            .map(|(kind, (variant, elements))| ElementGroup {
                kind,
                variant,
                colors: sequential_greedy_coloring(&elements, |ispec| numbering.element_nodes(ispec)),
                elements,
            })
            .collect();

        for group in &groups {
            info!(
                "Acoustic domain: {} elements of kind {} in {} colors",
                group.elements.len(),
                group.kind,
                group.colors.len()
            );
        }

        let mut domain = Self {
            quadrature,
            numbering,
            derivatives,
            properties,
            groups,
            variants,
            mass_inverse: DVector::zeros(0),
            strategy: ScatterStrategy::default(),
        };
        domain.mass_inverse = invert_mass_matrix(domain.assemble_mass_matrix());
        Ok(domain)
    }

    pub fn with_strategy(mut self, strategy: ScatterStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> ScatterStrategy {
        self.strategy
    }

    pub fn quadrature(&self) -> &GllQuadrature<T, N> {
        self.quadrature
    }

    pub fn numbering(&self) -> &GlobalNumbering {
        self.numbering
    }

    /// The elements handled by this domain.
    pub fn elements(&self) -> impl '_ + Iterator<Item = usize> {
        self.groups.iter().flat_map(|group| group.elements.iter().copied())
    }

    pub fn num_elements(&self) -> usize {
        self.groups.iter().map(|group| group.elements.len()).sum()
    }

    pub fn contains(&self, ispec: usize) -> bool {
        self.variants.get(ispec).copied().flatten().is_some()
    }

    /// The element colors of each kind group, in dispatch order.
    pub fn colors(&self) -> impl '_ + Iterator<Item = Vec<&[usize]>> {
        self.groups
            .iter()
            .map(|group| group.colors.iter().map(DisjointColor::elements).collect())
    }

    /// Computes the contribution of element `ispec` to the acceleration at each of its GLL
    /// points, indexed by `(iz, ix)`.
    ///
    /// # Panics
    ///
    /// Panics if the element is not part of this domain.
    pub fn compute_element_contribution(&self, ispec: usize, potential: &DVector<T>) -> SMatrix<T, N, N> {
        let variant = self
            .variants
            .get(ispec)
            .copied()
            .flatten()
            .expect("Element must be part of the acoustic domain");
        match variant {
            KernelVariant::Acoustic2dIsotropic => {
                let kernel = Acoustic2dIsotropic::new(ispec, self.derivatives, self.properties);
                self.element_contribution(&kernel, potential)
            }
        }
    }

    /// Adds the stiffness contribution of all elements to `field.potential_dot_dot`.
    ///
    /// # Panics
    ///
    /// Panics if the field does not have one entry per global node.
    pub fn compute_stiffness_interaction(&self, field: &mut AcousticField<T>) {
        self.check_field(field);
        let AcousticField {
            potential,
            potential_dot_dot,
            ..
        } = field;

        for group in &self.groups {
            match group.variant {
                KernelVariant::Acoustic2dIsotropic => {
                    let kernel = |ispec| Acoustic2dIsotropic::<T, N>::new(ispec, self.derivatives, self.properties);
                    match self.strategy {
                        ScatterStrategy::Serial => {
                            self.scatter_serial(&group.elements, kernel, potential, potential_dot_dot)
                        }
                        ScatterStrategy::Colored => {
                            self.scatter_colored(&group.colors, kernel, potential, potential_dot_dot)
                        }
                    }
                }
            }
        }
    }

    /// Adds the stiffness contribution of the given elements to `field.potential_dot_dot`,
    /// processing them serially in exactly the given order.
    ///
    /// # Panics
    ///
    /// Panics if an element is not part of this domain or the field has the wrong size.
    pub fn compute_stiffness_interaction_in_order(&self, field: &mut AcousticField<T>, order: &[usize]) {
        self.check_field(field);
        for &ispec in order {
            let contribution = self.compute_element_contribution(ispec, &field.potential);
            scatter_add(
                self.numbering.element_nodes(ispec),
                &contribution,
                field.potential_dot_dot.as_mut_slice(),
            );
        }
    }

    /// Assembles the diagonal acoustic mass matrix `sum w_x w_z J / kappa` over the elements of
    /// this domain.
    pub fn assemble_mass_matrix(&self) -> DVector<T> {
        let weights = self.quadrature.weights();
        let mut mass = DVector::zeros(self.numbering.num_global_nodes());
        for ispec in self.elements() {
            let (.., jacobian) = self.derivatives.element(ispec);
            let kappa_values = self.properties.element_kappa(ispec);
            let nodes = self.numbering.element_nodes(ispec);
            for (k, (&iglob, &j, &kappa)) in izip!(nodes, jacobian, kappa_values).enumerate() {
                let (iz, ix) = (k / N, k % N);
                mass[iglob] += weights[ix] * weights[iz] * j / kappa;
            }
        }
        mass
    }

    /// The inverse of the assembled mass matrix. Entries of nodes outside the domain are zero.
    pub fn mass_matrix_inverse(&self) -> &DVector<T> {
        &self.mass_inverse
    }

    /// Multiplies the acceleration by the inverse mass matrix.
    pub fn divide_mass_matrix(&self, field: &mut AcousticField<T>) {
        self.check_field(field);
        field.potential_dot_dot.component_mul_assign(&self.mass_inverse);
    }

    /// Adds the contribution of the sources located in this domain at time `time`.
    ///
    /// Sources whose element is not part of this domain are ignored.
    pub fn compute_source_interaction(&self, sources: &ComputeSources<T, N>, field: &mut AcousticField<T>, time: T) {
        self.check_field(field);
        for (source_array, stf, &ispec) in izip!(sources.source_arrays(), sources.stf_array(), sources.ispec_array()) {
            if !self.contains(ispec) {
                continue;
            }
            let stf = stf.evaluate(time);
            let kappa_values = self.properties.element_kappa(ispec);
            let nodes = self.numbering.element_nodes(ispec);
            for (k, (&iglob, &kappa)) in izip!(nodes, kappa_values).enumerate() {
                let (iz, ix) = (k / N, k % N);
                field.potential_dot_dot[iglob] -= source_array[0][(iz, ix)] * stf / kappa;
            }
        }
    }

    fn element_contribution<K>(&self, kernel: &K, potential: &DVector<T>) -> SMatrix<T, N, N>
    where
        K: ElementKernel<T, N>,
    {
        let nodes = self.numbering.element_nodes(kernel.ispec());
        let chi = SMatrix::<T, N, N>::from_fn(|iz, ix| potential[nodes[iz * N + ix]]);
        let hprime = self.quadrature.hprime();
        let hprime_wgll = self.quadrature.hprime_wgll();
        let weights = self.quadrature.weights();

        let mut stress_xi = SMatrix::<T, N, N>::zeros();
        let mut stress_gamma = SMatrix::<T, N, N>::zeros();
        for iz in 0..N {
            for ix in 0..N {
                let (dchi_dx, dchi_dz) = kernel.compute_gradient(iz, ix, hprime, hprime, &chi);
                let (xi, gamma) = kernel.compute_stress(iz, ix, dchi_dx, dchi_dz);
                stress_xi[(iz, ix)] = xi;
                stress_gamma[(iz, ix)] = gamma;
            }
        }

        let mut contribution = SMatrix::<T, N, N>::zeros();
        for iz in 0..N {
            for ix in 0..N {
                kernel.update_acceleration(
                    iz,
                    ix,
                    weights,
                    weights,
                    &stress_xi,
                    &stress_gamma,
                    hprime_wgll,
                    hprime_wgll,
                    &mut contribution[(iz, ix)],
                );
            }
        }
        contribution
    }

    fn scatter_serial<K, F>(&self, elements: &[usize], kernel: F, potential: &DVector<T>, acceleration: &mut DVector<T>)
    where
        K: ElementKernel<T, N>,
        F: Fn(usize) -> K,
    {
        for &ispec in elements {
            let contribution = self.element_contribution(&kernel(ispec), potential);
            scatter_add(
                self.numbering.element_nodes(ispec),
                &contribution,
                acceleration.as_mut_slice(),
            );
        }
    }

    fn scatter_colored<K, F>(
        &self,
        colors: &[DisjointColor],
        kernel: F,
        potential: &DVector<T>,
        acceleration: &mut DVector<T>,
    ) where
        K: ElementKernel<T, N>,
        F: Sync + Fn(usize) -> K,
    {
        for color in colors {
            par_scatter_add(color, acceleration.as_mut_slice(), |ispec| {
                let contribution = self.element_contribution(&kernel(ispec), potential);
                // Node lists are ordered by (iz, ix)
                (0..N * N).map(move |k| contribution[(k / N, k % N)])
            });
        }
    }

    fn check_field(&self, field: &AcousticField<T>) {
        assert_eq!(
            field.num_global_nodes(),
            self.numbering.num_global_nodes(),
            "Field must have one entry per global node"
        );
    }
}

fn scatter_add<T: Real, const N: usize>(nodes: &[usize], contribution: &SMatrix<T, N, N>, target: &mut [T]) {
    for (k, &iglob) in nodes.iter().enumerate() {
        target[iglob] += contribution[(k / N, k % N)];
    }
}

/// Inverts a diagonal mass matrix. Zero entries, which belong to nodes outside the domain, stay
/// zero.
pub fn invert_mass_matrix<T: Real>(mut mass: DVector<T>) -> DVector<T> {
    for m in mass.iter_mut() {
        if *m != T::zero() {
            *m = T::one() / *m;
        }
    }
    mass
}
