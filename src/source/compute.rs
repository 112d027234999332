use crate::element::Medium;
use crate::geometry::PartialDerivatives;
use crate::mesh::Partition;
use crate::properties::Properties;
use crate::quadrature::GllQuadrature;
use crate::source::{LocatedSource, SourceKind, SourceTimeFunction};
use crate::{Real, NDIM};
use log::info;
use nalgebra::SMatrix;

/// The sources owned by one rank, prepared for time stepping.
///
/// For each local source this stores the interpolation weights at the GLL points of its element
/// (`source_array`, one `N x N` matrix per spatial component, indexed by `(iz, ix)`), its
/// source-time function and its element index.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeSources<T: Real, const N: usize> {
    source_array: Vec<[SMatrix<T, N, N>; NDIM]>,
    stf_array: Vec<SourceTimeFunction<T>>,
    ispec_array: Vec<usize>,
}

impl<T: Real, const N: usize> ComputeSources<T, N> {
    /// Prepares the sources located in the partition of `partition.rank()`.
    ///
    /// Sources owned by other ranks are dropped.
    pub fn new(
        sources: &[LocatedSource<T>],
        quadrature: &GllQuadrature<T, N>,
        derivatives: &PartialDerivatives<T>,
        properties: &Properties<T>,
        partition: &Partition,
    ) -> Self {
        let local_sources: Vec<_> = sources
            .iter()
            .filter(|source| source.islice == partition.rank())
            .collect();

        let mut source_array = Vec::with_capacity(local_sources.len());
        let mut stf_array = Vec::with_capacity(local_sources.len());
        let mut ispec_array = Vec::with_capacity(local_sources.len());
        for source in local_sources {
            source_array.push(compute_source_array(source, quadrature, derivatives, properties));
            stf_array.push(source.source.stf);
            ispec_array.push(source.ispec);
        }

        info!(
            "Rank {} owns {} of {} sources",
            partition.rank(),
            ispec_array.len(),
            sources.len()
        );

        Self {
            source_array,
            stf_array,
            ispec_array,
        }
    }

    pub fn len(&self) -> usize {
        self.ispec_array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ispec_array.is_empty()
    }

    pub fn source_array(&self, isource: usize) -> &[SMatrix<T, N, N>; NDIM] {
        &self.source_array[isource]
    }

    pub fn source_arrays(&self) -> &[[SMatrix<T, N, N>; NDIM]] {
        &self.source_array
    }

    pub fn stf_array(&self) -> &[SourceTimeFunction<T>] {
        &self.stf_array
    }

    pub fn ispec_array(&self) -> &[usize] {
        &self.ispec_array
    }
}

fn compute_source_array<T: Real, const N: usize>(
    located: &LocatedSource<T>,
    quadrature: &GllQuadrature<T, N>,
    derivatives: &PartialDerivatives<T>,
    properties: &Properties<T>,
) -> [SMatrix<T, N, N>; NDIM] {
    let (hxi, hpxi) = quadrature.lagrange_at(located.xi.x);
    let (hgamma, hpgamma) = quadrature.lagrange_at(located.xi.y);
    let lagrange = SMatrix::<T, N, N>::from_fn(|iz, ix| hxi[ix] * hgamma[iz]);

    match located.source.kind {
        SourceKind::Force { angle, .. } => match properties.kind(located.ispec).medium {
            Medium::Acoustic => [lagrange, lagrange],
            _ => [lagrange * angle.sin(), lagrange * (-angle.cos())],
        },
        SourceKind::MomentTensor { mxx, mxz, mzz, .. } => {
            // Metric terms interpolated at the source location
            let (mut dxis_dx, mut dxis_dz, mut dgammas_dx, mut dgammas_dz) =
                (T::zero(), T::zero(), T::zero(), T::zero());
            for iz in 0..N {
                for ix in 0..N {
                    let d = derivatives.at(located.ispec, iz, ix);
                    let h = lagrange[(iz, ix)];
                    dxis_dx += h * d.xix;
                    dxis_dz += h * d.xiz;
                    dgammas_dx += h * d.gammax;
                    dgammas_dz += h * d.gammaz;
                }
            }

            let mut array = [SMatrix::<T, N, N>::zeros(); NDIM];
            for iz in 0..N {
                for ix in 0..N {
                    let dsrc_dx = hpxi[ix] * hgamma[iz] * dxis_dx + hxi[ix] * hpgamma[iz] * dgammas_dx;
                    let dsrc_dz = hpxi[ix] * hgamma[iz] * dxis_dz + hxi[ix] * hpgamma[iz] * dgammas_dz;
                    array[0][(iz, ix)] = mxx * dsrc_dx + mxz * dsrc_dz;
                    array[1][(iz, ix)] = mxz * dsrc_dx + mzz * dsrc_dz;
                }
            }
            array
        }
    }
}
