use crate::{two_element_mesh, AcousticSetup, WATER};
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use proptest::collection::vec;
use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use semwave::domain::{AcousticDomain, ScatterStrategy};
use semwave::element::{Dimension, ElementKind, Medium, PropertyClass};
use semwave::error::SetupError;
use semwave::field::AcousticField;
use semwave::mesh::procedural::{create_rectangular_mesh, create_rectangular_mesh_with_materials};
use semwave::mesh::Partition;
use semwave::nalgebra::{DVector, Point2};
use semwave::properties::{Material, Properties};
use std::collections::HashSet;

fn create_domain<const N: usize>(setup: &AcousticSetup<N>) -> AcousticDomain<'_, f64, N> {
    AcousticDomain::new(
        &setup.quadrature,
        &setup.numbering,
        &setup.derivatives,
        &setup.properties,
        &setup.partition,
    )
    .unwrap()
}

/// A smooth, non-polynomial potential evaluated at the global nodes.
fn smooth_potential<const N: usize>(setup: &AcousticSetup<N>) -> DVector<f64> {
    let coordinates = setup.numbering.coordinates(&setup.mesh, &setup.quadrature);
    DVector::from_iterator(
        coordinates.len(),
        coordinates.iter().map(|p| (1.3 * p.x).sin() * (0.7 * p.y).cos() + p.x * p.y),
    )
}

#[test]
fn shared_nodes_accumulate_independent_contributions_in_any_order() {
    let setup = AcousticSetup::<5>::new(two_element_mesh());
    let domain = create_domain(&setup);
    let potential = smooth_potential(&setup);

    // Scatter each element's contribution independently
    let mut expected = DVector::zeros(setup.numbering.num_global_nodes());
    for ispec in 0..2 {
        let contribution = domain.compute_element_contribution(ispec, &potential);
        for iz in 0..5 {
            for ix in 0..5 {
                expected[setup.numbering.global_index(ispec, iz, ix)] += contribution[(iz, ix)];
            }
        }
    }

    // A node on the shared edge receives from both elements
    let shared = setup.numbering.global_index(0, 2, 4);
    assert_eq!(shared, setup.numbering.global_index(1, 2, 0));

    for order in [[0, 1], [1, 0]] {
        let mut field = AcousticField::from_potential(potential.clone());
        domain.compute_stiffness_interaction_in_order(&mut field, &order);
        assert_matrix_eq!(field.potential_dot_dot, expected, comp = abs, tol = 1e-12);
    }

    for strategy in [ScatterStrategy::Serial, ScatterStrategy::Colored] {
        let domain = domain.clone().with_strategy(strategy);
        let mut field = AcousticField::from_potential(potential.clone());
        domain.compute_stiffness_interaction(&mut field);
        assert_matrix_eq!(field.potential_dot_dot, expected, comp = abs, tol = 1e-12);
    }
}

#[test]
fn shuffled_element_orders_agree_with_colored_dispatch() {
    let mesh = create_rectangular_mesh(&Point2::new(-2.0, -1.0), 4.0, 3.0, 5, 4).unwrap();
    let setup = AcousticSetup::<4>::new(mesh);
    let domain = create_domain(&setup);
    let potential = smooth_potential(&setup);

    let mut colored = AcousticField::from_potential(potential.clone());
    domain.compute_stiffness_interaction(&mut colored);

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut order: Vec<usize> = domain.elements().collect();
    for _ in 0..5 {
        order.shuffle(&mut rng);
        let mut field = AcousticField::from_potential(potential.clone());
        domain.compute_stiffness_interaction_in_order(&mut field, &order);
        assert_matrix_eq!(field.potential_dot_dot, colored.potential_dot_dot, comp = abs, tol = 1e-12);
    }
}

#[test]
fn constant_potential_has_zero_acceleration() {
    let setup = AcousticSetup::<5>::new(two_element_mesh());
    let domain = create_domain(&setup);
    let nglob = setup.numbering.num_global_nodes();
    let mut field = AcousticField::from_potential(DVector::repeat(nglob, 3.0));
    domain.compute_stiffness_interaction(&mut field);
    assert_matrix_eq!(field.potential_dot_dot, DVector::<f64>::zeros(nglob), comp = abs, tol = 1e-14);
}

#[test]
fn colors_do_not_share_nodes() {
    let mesh = create_rectangular_mesh(&Point2::origin(), 3.0, 3.0, 3, 3).unwrap();
    let setup = AcousticSetup::<3>::new(mesh);
    let domain = create_domain(&setup);

    let groups: Vec<_> = domain.colors().collect();
    assert_eq!(groups.len(), 1);
    // A structured quadrilateral mesh needs four colors
    assert_eq!(groups[0].len(), 4);
    for color in &groups[0] {
        let mut visited = HashSet::new();
        for &ispec in color.iter() {
            for &node in setup.numbering.element_nodes(ispec) {
                assert!(visited.insert(node), "Node {node} is shared within a color");
            }
        }
    }
    assert_eq!(domain.num_elements(), 9);
}

#[test]
fn mass_matrix_integrates_inverse_bulk_modulus() {
    let setup = AcousticSetup::<4>::new(two_element_mesh());
    let domain = create_domain(&setup);
    let mass = domain.assemble_mass_matrix();

    // Element areas from the shoelace formula
    let area = 1.1 + 1.475;
    let kappa = 1000.0 * 1500.0 * 1500.0;
    assert_scalar_eq!(mass.sum(), area / kappa, comp = abs, tol = 1e-20);
    assert!(mass.iter().all(|&m| m > 0.0));

    let inverse = domain.mass_matrix_inverse();
    for (m, m_inv) in mass.iter().zip(inverse.iter()) {
        assert_scalar_eq!(m * m_inv, 1.0, comp = abs, tol = 1e-12);
    }

    let mut field = AcousticField::<f64>::zeros(mass.len());
    field.potential_dot_dot = mass.clone();
    domain.divide_mass_matrix(&mut field);
    assert_matrix_eq!(field.potential_dot_dot, DVector::repeat(mass.len(), 1.0), comp = abs, tol = 1e-12);

    field.reset_acceleration();
    assert_eq!(field.potential_dot_dot.sum(), 0.0);
}

#[test]
fn non_acoustic_and_foreign_elements_are_excluded() {
    let materials = [
        WATER,
        Material::Elastic {
            density: 2500.0,
            vp: 3000.0,
            vs: 1800.0,
        },
    ];
    let mesh =
        create_rectangular_mesh_with_materials(&Point2::origin(), 3.0, 1.0, 3, 1, |i, _| usize::from(i == 2)).unwrap();
    let mut setup = AcousticSetup::<3>::try_new(mesh, &materials).unwrap();
    assert_eq!(create_domain(&setup).elements().collect::<Vec<_>>(), vec![0, 1]);

    setup.partition = Partition::new(1, vec![0, 1, 1]);
    let domain = create_domain(&setup);
    assert_eq!(domain.elements().collect::<Vec<_>>(), vec![1]);
    assert!(domain.contains(1));
    assert!(!domain.contains(0));
    assert!(!domain.contains(2));

    // Nodes of elements outside the domain have no mass
    let mass = domain.assemble_mass_matrix();
    assert_eq!(mass[setup.numbering.global_index(0, 0, 0)], 0.0);
    assert_eq!(domain.mass_matrix_inverse()[setup.numbering.global_index(2, 2, 2)], 0.0);
}

#[test]
fn unsupported_acoustic_kind_is_rejected() {
    let setup = AcousticSetup::<2>::new(two_element_mesh());
    let kinds = vec![
        ElementKind::ACOUSTIC_2D_ISOTROPIC,
        ElementKind::new(Dimension::Dim2, Medium::Acoustic, PropertyClass::Anisotropic),
    ];
    let properties = Properties::try_from_parts(2, kinds, vec![1.0; 8], vec![1.0; 8]).unwrap();
    let result = AcousticDomain::new(
        &setup.quadrature,
        &setup.numbering,
        &setup.derivatives,
        &properties,
        &setup.partition,
    );
    assert_eq!(
        result.err(),
        Some(SetupError::UnsupportedElementKind {
            ispec: 1,
            kind: ElementKind::new(Dimension::Dim2, Medium::Acoustic, PropertyClass::Anisotropic)
        })
    );
}

#[test]
fn mismatched_inputs_are_rejected() {
    let setup = AcousticSetup::<3>::new(two_element_mesh());
    let other = AcousticSetup::<4>::new(two_element_mesh());
    let result = AcousticDomain::new(
        &setup.quadrature,
        &setup.numbering,
        &other.derivatives,
        &setup.properties,
        &setup.partition,
    );
    assert_eq!(
        result.err(),
        Some(SetupError::QuadratureMismatch {
            expected: 3,
            found: 4
        })
    );

    let partition = Partition::single(3);
    let result = AcousticDomain::new(
        &setup.quadrature,
        &setup.numbering,
        &setup.derivatives,
        &setup.properties,
        &partition,
    );
    assert_eq!(
        result.err(),
        Some(SetupError::LengthMismatch {
            what: "partition",
            expected: 2,
            found: 3
        })
    );
}

#[test]
fn scatter_strategy_deserializes_from_lowercase() {
    let strategy: ScatterStrategy = serde_yaml::from_str("serial").unwrap();
    assert_eq!(strategy, ScatterStrategy::Serial);
    assert_eq!(ScatterStrategy::default(), ScatterStrategy::Colored);
}

proptest! {
    #[test]
    fn stiffness_operator_is_symmetric(
        u in vec(-1.0 .. 1.0, 28),
        v in vec(-1.0 .. 1.0, 28),
    ) {
        let setup = AcousticSetup::<4>::new(two_element_mesh());
        let domain = create_domain(&setup);
        prop_assert_eq!(setup.numbering.num_global_nodes(), 28);

        let apply = |x: Vec<f64>| {
            let mut field = AcousticField::from_potential(DVector::from_vec(x));
            domain.compute_stiffness_interaction(&mut field);
            field.potential_dot_dot
        };
        let ku = apply(u.clone());
        let kv = apply(v.clone());
        let v = DVector::from_vec(v);
        let u = DVector::from_vec(u);
        let lhs = v.dot(&ku);
        let rhs = u.dot(&kv);
        prop_assert!((lhs - rhs).abs() <= 1e-12 * (1.0 + lhs.abs()));
    }
}
