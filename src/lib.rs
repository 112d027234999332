//! Spectral-element kernels for the time-domain acoustic wave equation in 2D.
//!
//! The crate covers the per-element operator that turns a scalar potential into nodal
//! acceleration contributions, the dispatch of that operator over a mesh, and the injection
//! of point sources into the acceleration field.
use nalgebra::RealField;

pub mod domain;
pub mod element;
pub mod error;
pub mod field;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod properties;
pub mod quadrature;
pub mod source;

pub extern crate nalgebra;

/// Number of spatial dimensions of the meshes handled by this crate.
pub const NDIM: usize = 2;

/// A real scalar type usable by all kernels.
///
/// Used as a trait alias for the traits frequently needed by generic `semwave` routines.
pub trait Real: RealField + Copy + Send + Sync {}

impl<T> Real for T where T: RealField + Copy + Send + Sync {}
