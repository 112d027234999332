//! YAML description of the point sources of a simulation.
//!
//! ```yaml
//! number-of-sources: 1
//! sources:
//!   - source_type: force source
//!     x: 2500.0
//!     z: 2500.0
//!     source_surf: false
//!     stf_type: Ricker
//!     f0: 10.0
//!     angle: 0.0
//!     vx: 0.0
//!     vz: 0.0
//!     factor: 1e10
//! ```
use crate::error::SourceError;
use crate::source::{Source, SourceKind, SourceTimeFunction, StfType};
use crate::Real;
use eyre::WrapErr;
use log::{debug, warn};
use nalgebra::{convert, Point2};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FORCE_SOURCE: &str = "force source";
pub const MOMENT_TENSOR_SOURCE: &str = "Moment-tensor source";

#[derive(Debug, Clone, Deserialize)]
struct SourcesDocument {
    #[serde(rename = "number-of-sources")]
    number_of_sources: usize,
    #[serde(default)]
    sources: Vec<serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceSourceRecord {
    pub x: f64,
    pub z: f64,
    pub source_surf: bool,
    pub stf_type: StfType,
    pub f0: f64,
    #[serde(default)]
    pub tshift: f64,
    pub angle: f64,
    pub vx: f64,
    pub vz: f64,
    pub factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentTensorRecord {
    pub x: f64,
    pub z: f64,
    pub source_surf: bool,
    pub stf_type: StfType,
    pub f0: f64,
    #[serde(default)]
    pub tshift: f64,
    #[serde(rename = "Mxx")]
    pub mxx: f64,
    #[serde(rename = "Mxz")]
    pub mxz: f64,
    #[serde(rename = "Mzz")]
    pub mzz: f64,
    pub vx: f64,
    pub vz: f64,
    pub factor: f64,
}

impl ForceSourceRecord {
    pub fn to_source<T: Real>(&self) -> Source<T> {
        Source {
            location: Point2::new(convert(self.x), convert(self.z)),
            source_surf: self.source_surf,
            stf: SourceTimeFunction::from_f64(self.stf_type, self.f0, self.tshift, self.factor),
            kind: SourceKind::Force {
                angle: convert(self.angle),
                vx: convert(self.vx),
                vz: convert(self.vz),
            },
        }
    }
}

impl MomentTensorRecord {
    pub fn to_source<T: Real>(&self) -> Source<T> {
        Source {
            location: Point2::new(convert(self.x), convert(self.z)),
            source_surf: self.source_surf,
            stf: SourceTimeFunction::from_f64(self.stf_type, self.f0, self.tshift, self.factor),
            kind: SourceKind::MomentTensor {
                mxx: convert(self.mxx),
                mxz: convert(self.mxz),
                mzz: convert(self.mzz),
                vx: convert(self.vx),
                vz: convert(self.vz),
            },
        }
    }
}

/// Parses a YAML source document.
///
/// Records with an unrecognized `source_type` are skipped with a warning. The number of parsed
/// sources must match `number-of-sources`, otherwise [`SourceError::CountMismatch`] lists the
/// skipped types.
pub fn parse_sources<T: Real>(yaml: &str) -> Result<Vec<Source<T>>, SourceError> {
    let document: SourcesDocument = serde_yaml::from_str(yaml)?;

    let mut sources = Vec::with_capacity(document.sources.len());
    let mut skipped = Vec::new();
    for (index, record) in document.sources.into_iter().enumerate() {
        let malformed = |message: String| SourceError::MalformedRecord { index, message };
        let source_type = record
            .get("source_type")
            .and_then(serde_yaml::Value::as_str)
            .ok_or_else(|| malformed("missing string field `source_type`".to_string()))?
            .to_string();

        let source = match source_type.as_str() {
            FORCE_SOURCE => serde_yaml::from_value::<ForceSourceRecord>(record)
                .map_err(|err| malformed(err.to_string()))?
                .to_source::<T>(),
            MOMENT_TENSOR_SOURCE => serde_yaml::from_value::<MomentTensorRecord>(record)
                .map_err(|err| malformed(err.to_string()))?
                .to_source::<T>(),
            other => {
                warn!("Skipping source record {} with unsupported source_type \"{}\"", index, other);
                skipped.push(other.to_string());
                continue;
            }
        };
        debug!("Parsed {} at {:?}", source_type, source.location);
        sources.push(source);
    }

    if sources.len() != document.number_of_sources {
        return Err(SourceError::CountMismatch {
            declared: document.number_of_sources,
            found: sources.len(),
            skipped,
        });
    }

    Ok(sources)
}

/// Reads and parses the YAML source file at `path`.
pub fn read_sources<T: Real>(path: impl AsRef<Path>) -> eyre::Result<Vec<Source<T>>> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read source file {}", path.display()))?;
    let sources =
        parse_sources::<T>(&yaml).wrap_err_with(|| format!("invalid source file {}", path.display()))?;
    Ok(sources)
}
