//! Quadrilateral meshes, global GLL numbering and partition ownership.
use crate::error::SetupError;
use crate::geometry::Quad4Geometry;
use crate::quadrature::GllQuadrature;
use crate::Real;
use log::debug;
use nalgebra::{convert, Point2};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub mod procedural;

/// A conforming mesh of bilinear quadrilaterals.
///
/// Each element is given by four control nodes in counter-clockwise order, starting with the
/// corner that is mapped from the reference coordinates `(-1, -1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh<T: Real> {
    control_nodes: Vec<Point2<T>>,
    connectivity: Vec<[usize; 4]>,
    material_indices: Vec<usize>,
}

impl<T: Real> Mesh<T> {
    /// Creates a mesh where every element uses material `0`.
    pub fn try_from_control_nodes_and_connectivity(
        control_nodes: Vec<Point2<T>>,
        connectivity: Vec<[usize; 4]>,
    ) -> Result<Self, SetupError> {
        let material_indices = vec![0; connectivity.len()];
        Self::try_new(control_nodes, connectivity, material_indices)
    }

    pub fn try_new(
        control_nodes: Vec<Point2<T>>,
        connectivity: Vec<[usize; 4]>,
        material_indices: Vec<usize>,
    ) -> Result<Self, SetupError> {
        if material_indices.len() != connectivity.len() {
            return Err(SetupError::LengthMismatch {
                what: "material indices",
                expected: connectivity.len(),
                found: material_indices.len(),
            });
        }

        for (ispec, nodes) in connectivity.iter().enumerate() {
            if let Some(&node) = nodes.iter().find(|&&node| node >= control_nodes.len()) {
                return Err(SetupError::InvalidConnectivity {
                    ispec,
                    node,
                    num_nodes: control_nodes.len(),
                });
            }
        }

        Ok(Self {
            control_nodes,
            connectivity,
            material_indices,
        })
    }

    pub fn num_elements(&self) -> usize {
        self.connectivity.len()
    }

    pub fn control_nodes(&self) -> &[Point2<T>] {
        &self.control_nodes
    }

    pub fn connectivity(&self) -> &[[usize; 4]] {
        &self.connectivity
    }

    pub fn material_indices(&self) -> &[usize] {
        &self.material_indices
    }

    pub fn material_index(&self, ispec: usize) -> usize {
        self.material_indices[ispec]
    }

    pub fn element_geometry(&self, ispec: usize) -> Quad4Geometry<T> {
        let nodes = &self.connectivity[ispec];
        Quad4Geometry::from_vertices(nodes.map(|node| self.control_nodes[node]))
    }

    pub fn transform_control_nodes<F>(&mut self, mut transformation: F)
    where
        F: FnMut(&mut Point2<T>),
    {
        for p in &mut self.control_nodes {
            transformation(p);
        }
    }

    /// Finds the element containing `point` and the reference coordinates of `point` within it.
    ///
    /// Points on an edge shared by several elements are attributed to the element with the
    /// lowest index.
    pub fn locate(&self, point: &Point2<T>) -> Option<(usize, Point2<T>)> {
        let bound = T::one() + convert(1e-10);
        (0..self.num_elements()).find_map(|ispec| {
            let xi = self.element_geometry(ispec).map_physical_coords(point)?;
            let inside = xi.iter().all(|coord| coord.abs() <= bound);
            inside.then(|| (ispec, xi.map(|coord| coord.clamp(-T::one(), T::one()))))
        })
    }
}

/// The map from element-local GLL points to global degrees of freedom (`ibool`).
///
/// GLL points on shared corners and edges receive the same global index in every element
/// that contains them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalNumbering {
    ngll: usize,
    nglob: usize,
    ibool: Vec<usize>,
}

impl GlobalNumbering {
    /// Numbers the GLL points of a mesh with `ngll` points per direction.
    ///
    /// Numbering is topological: corners are identified through control nodes and edge
    /// points through the (unordered) pair of control nodes spanning the edge.
    pub fn from_mesh<T: Real>(mesh: &Mesh<T>, ngll: usize) -> Result<Self, SetupError> {
        if ngll < 2 {
            return Err(SetupError::InvalidQuadratureOrder { order: ngll });
        }
        let n = ngll;
        let num_edge_interior = n - 2;
        let mut ibool = vec![usize::MAX; mesh.num_elements() * n * n];
        let mut corner_ids: Vec<Option<usize>> = vec![None; mesh.control_nodes().len()];
        let mut edge_ids = FxHashMap::default();
        let mut nglob = 0;

        let mut next_ids = |count: usize| {
            let first = nglob;
            nglob += count;
            first
        };

        for (ispec, nodes) in mesh.connectivity().iter().enumerate() {
            let local = |iz: usize, ix: usize| (ispec * n + iz) * n + ix;
            let corner_positions = [(0, 0), (0, n - 1), (n - 1, n - 1), (n - 1, 0)];
            for (&node, (iz, ix)) in nodes.iter().zip(corner_positions) {
                let id = *corner_ids[node].get_or_insert_with(|| next_ids(1));
                ibool[local(iz, ix)] = id;
            }

            // Each edge runs from control node `a` to `b`, with the k-th interior point at `position(k)`
            let edges: [(usize, usize, fn(usize, usize) -> (usize, usize)); 4] = [
                (nodes[0], nodes[1], |k, _| (0, 1 + k)),
                (nodes[1], nodes[2], |k, n| (1 + k, n - 1)),
                (nodes[3], nodes[2], |k, n| (n - 1, 1 + k)),
                (nodes[0], nodes[3], |k, _| (1 + k, 0)),
            ];
            if num_edge_interior > 0 {
                for (a, b, position) in edges {
                    let key = (a.min(b), a.max(b));
                    let base = *edge_ids
                        .entry(key)
                        .or_insert_with(|| next_ids(num_edge_interior));
                    for k in 0..num_edge_interior {
                        let offset = if a < b { k } else { num_edge_interior - 1 - k };
                        let (iz, ix) = position(k, n);
                        ibool[local(iz, ix)] = base + offset;
                    }
                }
            }

            for iz in 1..n - 1 {
                for ix in 1..n - 1 {
                    ibool[local(iz, ix)] = next_ids(1);
                }
            }
        }

        debug!(
            "Numbered {} global GLL points for {} elements",
            nglob,
            mesh.num_elements()
        );

        Ok(Self { ngll, nglob, ibool })
    }

    /// Builds a numbering from an externally produced `ibool` array.
    pub fn try_from_ibool(ngll: usize, ibool: Vec<usize>) -> Result<Self, SetupError> {
        if ngll < 2 {
            return Err(SetupError::InvalidQuadratureOrder { order: ngll });
        }
        let points_per_element = ngll * ngll;
        if ibool.len() % points_per_element != 0 {
            return Err(SetupError::LengthMismatch {
                what: "ibool",
                expected: ibool.len() - ibool.len() % points_per_element,
                found: ibool.len(),
            });
        }
        let nglob = match ibool.iter().max() {
            Some(&max) => max
                .checked_add(1)
                .ok_or(SetupError::GlobalIndexOverflow { index: max })?,
            None => 0,
        };
        Ok(Self { ngll, nglob, ibool })
    }

    pub fn ngll(&self) -> usize {
        self.ngll
    }

    /// The number of global degrees of freedom.
    pub fn num_global_nodes(&self) -> usize {
        self.nglob
    }

    pub fn num_elements(&self) -> usize {
        self.ibool.len() / (self.ngll * self.ngll)
    }

    /// The global index of GLL point `(iz, ix)` in element `ispec`.
    pub fn global_index(&self, ispec: usize, iz: usize, ix: usize) -> usize {
        let n = self.ngll;
        self.ibool[(ispec * n + iz) * n + ix]
    }

    /// The global indices of all GLL points of an element, indexed by `iz * ngll + ix`.
    pub fn element_nodes(&self, ispec: usize) -> &[usize] {
        let m = self.ngll * self.ngll;
        &self.ibool[ispec * m..(ispec + 1) * m]
    }

    /// Computes the physical coordinates of every global GLL point.
    pub fn coordinates<T: Real, const N: usize>(
        &self,
        mesh: &Mesh<T>,
        quadrature: &GllQuadrature<T, N>,
    ) -> Vec<Point2<T>> {
        let points = quadrature.points();
        let mut coordinates = vec![Point2::origin(); self.nglob];
        for ispec in 0..mesh.num_elements() {
            let element = mesh.element_geometry(ispec);
            for iz in 0..N {
                for ix in 0..N {
                    let xi = Point2::new(points[ix], points[iz]);
                    coordinates[self.global_index(ispec, iz, ix)] = element.map_reference_coords(&xi);
                }
            }
        }
        coordinates
    }
}

/// Assignment of elements to compute ranks, together with the rank of this process.
///
/// The assignment itself is produced upstream; this type only answers ownership queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    rank: usize,
    element_partition: Vec<usize>,
}

impl Partition {
    pub fn new(rank: usize, element_partition: Vec<usize>) -> Self {
        Self {
            rank,
            element_partition,
        }
    }

    /// A partition where rank `0` owns all `num_elements` elements.
    pub fn single(num_elements: usize) -> Self {
        Self::new(0, vec![0; num_elements])
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn num_elements(&self) -> usize {
        self.element_partition.len()
    }

    /// The rank (`islice`) owning element `ispec`.
    pub fn islice(&self, ispec: usize) -> usize {
        self.element_partition[ispec]
    }

    pub fn owns(&self, ispec: usize) -> bool {
        self.islice(ispec) == self.rank
    }

    pub fn owned_elements(&self) -> impl '_ + Iterator<Item = usize> {
        (0..self.num_elements()).filter(move |&ispec| self.owns(ispec))
    }
}
