//! Point sources and their coupling to the spectral element mesh.
use crate::error::SourceError;
use crate::mesh::{Mesh, Partition};
use crate::Real;
use log::debug;
use nalgebra::Point2;

pub mod config;
mod compute;
mod time_function;

pub use compute::ComputeSources;
pub use config::{parse_sources, read_sources};
pub use time_function::{SourceTimeFunction, StfType};

/// The spatial character of a point source.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SourceKind<T> {
    /// A point force. In elastic media, the force acts in the direction given by `angle`,
    /// measured from the negative z-axis.
    Force { angle: T, vx: T, vz: T },
    MomentTensor { mxx: T, mxz: T, mzz: T, vx: T, vz: T },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Source<T: Real> {
    pub location: Point2<T>,
    pub source_surf: bool,
    pub stf: SourceTimeFunction<T>,
    pub kind: SourceKind<T>,
}

/// A source together with its owning element and partition.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocatedSource<T: Real> {
    pub source: Source<T>,
    pub ispec: usize,
    /// Reference coordinates `(xi, gamma)` of the source within element `ispec`.
    pub xi: Point2<T>,
    pub islice: usize,
}

impl<T: Real> Source<T> {
    /// Finds the element containing the source and the rank owning that element.
    pub fn locate(&self, mesh: &Mesh<T>, partition: &Partition) -> Result<LocatedSource<T>, SourceError> {
        let (ispec, xi) = mesh.locate(&self.location).ok_or_else(|| SourceError::OutsideMesh {
            x: self.location.x.to_subset().unwrap_or(f64::NAN),
            z: self.location.y.to_subset().unwrap_or(f64::NAN),
        })?;
        let islice = partition.islice(ispec);
        debug!(
            "Located source at {:?} in element {} (islice {}) at reference coordinates {:?}",
            self.location, ispec, islice, xi
        );
        Ok(LocatedSource {
            source: *self,
            ispec,
            xi,
            islice,
        })
    }
}

/// Locates all sources in the mesh.
pub fn locate_sources<T: Real>(
    sources: &[Source<T>],
    mesh: &Mesh<T>,
    partition: &Partition,
) -> Result<Vec<LocatedSource<T>>, SourceError> {
    sources
        .iter()
        .map(|source| source.locate(mesh, partition))
        .collect()
}
