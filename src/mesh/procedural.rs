//! Basic procedural mesh generation routines.
use crate::error::SetupError;
use crate::mesh::Mesh;
use crate::Real;
use nalgebra::{convert, Point2, Vector2};

/// Generates an axis-aligned rectangular mesh of `nx` by `nz` uniform elements.
///
/// Control nodes are numbered row by row starting from `origin`, the lower-left corner, and
/// every element uses material `0`.
pub fn create_rectangular_mesh<T>(
    origin: &Point2<T>,
    width: T,
    height: T,
    nx: usize,
    nz: usize,
) -> Result<Mesh<T>, SetupError>
where
    T: Real,
{
    let num_nodes_x = nx + 1;
    let num_nodes_z = nz + 1;
    let dx = width / convert(nx.max(1) as f64);
    let dz = height / convert(nz.max(1) as f64);

    let mut control_nodes = Vec::with_capacity(num_nodes_x * num_nodes_z);
    for j in 0..num_nodes_z {
        for i in 0..num_nodes_x {
            let offset = Vector2::new(dx * convert(i as f64), dz * convert(j as f64));
            control_nodes.push(origin + offset);
        }
    }

    let to_global_node_index = |i: usize, j: usize| num_nodes_x * j + i;
    let mut connectivity = Vec::with_capacity(nx * nz);
    for j in 0..nz {
        for i in 0..nx {
            connectivity.push([
                to_global_node_index(i, j),
                to_global_node_index(i + 1, j),
                to_global_node_index(i + 1, j + 1),
                to_global_node_index(i, j + 1),
            ]);
        }
    }

    Mesh::try_from_control_nodes_and_connectivity(control_nodes, connectivity)
}

/// Generates a rectangular mesh with element-wise material indices.
///
/// `material` is called with the column and row index of every element.
pub fn create_rectangular_mesh_with_materials<T, F>(
    origin: &Point2<T>,
    width: T,
    height: T,
    nx: usize,
    nz: usize,
    mut material: F,
) -> Result<Mesh<T>, SetupError>
where
    T: Real,
    F: FnMut(usize, usize) -> usize,
{
    let mesh = create_rectangular_mesh(origin, width, height, nx, nz)?;
    let material_indices = (0..nz)
        .flat_map(|j| (0..nx).map(move |i| (i, j)))
        .map(|(i, j)| material(i, j))
        .collect();
    Mesh::try_new(
        mesh.control_nodes().to_vec(),
        mesh.connectivity().to_vec(),
        material_indices,
    )
}
