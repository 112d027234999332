use crate::two_element_mesh;
use matrixcompare::assert_scalar_eq;
use semwave::element::{ElementKind, Medium};
use semwave::error::SetupError;
use semwave::mesh::Mesh;
use semwave::properties::{Material, Properties};

#[test]
fn properties_from_materials() {
    let base = two_element_mesh();
    let mesh = Mesh::try_new(base.control_nodes().to_vec(), base.connectivity().to_vec(), vec![1, 0]).unwrap();
    let materials = [
        Material::Acoustic {
            density: 2.0,
            vp: 3.0,
        },
        Material::Elastic {
            density: 2500.0,
            vp: 3000.0,
            vs: 1700.0,
        },
    ];
    let properties = Properties::<f64>::from_materials(&mesh, &materials, 3).unwrap();

    assert_eq!(properties.ngll(), 3);
    assert_eq!(properties.num_elements(), 2);
    assert_eq!(properties.kind(0), ElementKind::ELASTIC_2D_ISOTROPIC);
    assert_eq!(properties.kind(1), ElementKind::ACOUSTIC_2D_ISOTROPIC);
    assert_eq!(properties.kinds()[1].medium, Medium::Acoustic);

    assert_scalar_eq!(properties.rho_inverse(1, 2, 0), 0.5, comp = abs, tol = 1e-15);
    assert_scalar_eq!(properties.kappa(1, 1, 1), 18.0, comp = abs, tol = 1e-12);
    assert_eq!(properties.element_kappa(0).len(), 9);
    assert!(properties
        .element_rho_inverse(0)
        .iter()
        .all(|&r| (r - 1.0 / 2500.0).abs() < 1e-18));
}

#[test]
fn non_positive_materials_are_rejected() {
    let mesh = two_element_mesh();
    let materials = [Material::Acoustic {
        density: 1.0,
        vp: 0.0,
    }];
    assert_eq!(
        Properties::<f64>::from_materials(&mesh, &materials, 3),
        Err(SetupError::NonPositiveMaterial {
            material: 0,
            quantity: "vp",
            value: 0.0
        })
    );

    let materials = [
        Material::Acoustic {
            density: 1.0,
            vp: 1.0,
        },
        Material::Elastic {
            density: -1.0,
            vp: 1.0,
            vs: 1.0,
        },
    ];
    assert_eq!(
        Properties::<f64>::from_materials(&mesh, &materials, 3),
        Err(SetupError::NonPositiveMaterial {
            material: 1,
            quantity: "density",
            value: -1.0
        })
    );
}

#[test]
fn unknown_material_is_rejected() {
    let mesh = two_element_mesh();
    assert_eq!(
        Properties::<f64>::from_materials(&mesh, &[], 3),
        Err(SetupError::UnknownMaterial {
            ispec: 0,
            material: 0,
            num_materials: 0
        })
    );
}

#[test]
fn properties_from_parts_are_validated() {
    let kinds = vec![ElementKind::ACOUSTIC_2D_ISOTROPIC];
    assert_eq!(
        Properties::try_from_parts(2, kinds.clone(), vec![1.0; 4], vec![1.0; 3]),
        Err(SetupError::LengthMismatch {
            what: "kappa",
            expected: 4,
            found: 3
        })
    );
    let two_elements = vec![ElementKind::ACOUSTIC_2D_ISOTROPIC; 2];
    let mut kappa = vec![1.0; 8];
    kappa[6] = 0.0;
    assert_eq!(
        Properties::try_from_parts(2, two_elements.clone(), vec![1.0; 8], kappa),
        Err(SetupError::NonPositiveCoefficient {
            ispec: 1,
            iz: 1,
            ix: 0,
            quantity: "kappa",
            value: 0.0
        })
    );
    assert!(matches!(
        Properties::try_from_parts(2, two_elements, vec![1.0, 1.0, -2.0, 1.0, 1.0, 1.0, 1.0, 1.0], vec![1.0; 8]),
        Err(SetupError::NonPositiveCoefficient {
            ispec: 0,
            iz: 1,
            ix: 0,
            quantity: "rho_inverse",
            ..
        })
    ));
    let properties = Properties::try_from_parts(2, kinds, vec![1.0; 4], vec![2.0; 4]).unwrap();
    assert_scalar_eq!(properties.kappa(0, 1, 1), 2.0, comp = abs, tol = 0.0);
}

#[test]
fn materials_deserialize_from_yaml() {
    let yaml = "
- medium: acoustic
  density: 1020.0
  vp: 1480.0
- medium: elastic
  density: 2700.0
  vp: 5000.0
  vs: 2900.0
";
    let materials: Vec<Material> = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        materials,
        vec![
            Material::Acoustic {
                density: 1020.0,
                vp: 1480.0
            },
            Material::Elastic {
                density: 2700.0,
                vp: 5000.0,
                vs: 2900.0
            }
        ]
    );
    assert_scalar_eq!(materials[0].kappa(), 1020.0 * 1480.0 * 1480.0, comp = abs, tol = 1e-3);
}
