//! Error types.
//!
//! Every error in this crate is fatal to a simulation run: they are raised while the mesh,
//! material or source data is being set up, never from inside a time step.
use crate::element::ElementKind;
use thiserror::Error;

/// Errors detected while preparing geometry, materials and element dispatch.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SetupError {
    #[error("quadrature order {order} is not supported: at least two GLL points are required")]
    InvalidQuadratureOrder { order: usize },

    #[error("element {ispec} is degenerate at GLL point (iz = {iz}, ix = {ix}): jacobian = {jacobian:e}")]
    DegenerateElement {
        ispec: usize,
        iz: usize,
        ix: usize,
        jacobian: f64,
    },

    #[error("material {material} has non-positive {quantity} ({value})")]
    NonPositiveMaterial {
        material: usize,
        quantity: &'static str,
        value: f64,
    },

    #[error("element {ispec} has non-positive {quantity} at GLL point (iz = {iz}, ix = {ix}): {value}")]
    NonPositiveCoefficient {
        ispec: usize,
        iz: usize,
        ix: usize,
        quantity: &'static str,
        value: f64,
    },

    #[error("global index {index} cannot be numbered")]
    GlobalIndexOverflow { index: usize },

    #[error("element {ispec} refers to unknown material {material} ({num_materials} materials defined)")]
    UnknownMaterial {
        ispec: usize,
        material: usize,
        num_materials: usize,
    },

    #[error("element {ispec} has an unsupported kind {kind}")]
    UnsupportedElementKind { ispec: usize, kind: ElementKind },

    #[error("{what} has length {found}, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("element {ispec} refers to control node {node}, but the mesh only has {num_nodes} control nodes")]
    InvalidConnectivity {
        ispec: usize,
        node: usize,
        num_nodes: usize,
    },

    #[error("partition data was built for {found} GLL points per direction, but the domain uses {expected}")]
    QuadratureMismatch { expected: usize, found: usize },
}

/// Errors raised while reading and distributing point sources.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to parse source configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("source record {index} is malformed: {message}")]
    MalformedRecord { index: usize, message: String },

    #[error(
        "found only {found} sources, but the configuration declares {declared} sources{}",
        format_skipped(.skipped)
    )]
    CountMismatch {
        declared: usize,
        found: usize,
        skipped: Vec<String>,
    },

    #[error("source at (x = {x}, z = {z}) lies outside of the mesh")]
    OutsideMesh { x: f64, z: f64 },

    #[error(transparent)]
    Setup(#[from] SetupError),
}

fn format_skipped(skipped: &[String]) -> String {
    if skipped.is_empty() {
        String::new()
    } else {
        format!(" (skipped records with unsupported source_type: {})", skipped.join(", "))
    }
}

/// Errors raised by the sequential record reader and writer.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("I/O error while accessing record stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("record markers disagree: leading marker {leading}, trailing marker {trailing}")]
    MarkerMismatch { leading: u32, trailing: u32 },

    #[error("expected {expected} more bytes for {item}, but the record only has {found} left")]
    SizeMismatch {
        item: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("record has {remaining} trailing bytes that were not consumed")]
    TrailingBytes { remaining: usize },

    #[error("string item is not valid UTF-8")]
    InvalidString,

    #[error("string of {length} bytes does not fit in a fixed-width field of {width} bytes")]
    StringTooLong { length: usize, width: usize },

    #[error("expected an array of {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("record of {0} bytes does not fit in a 4-byte length marker")]
    RecordTooLong(usize),
}
