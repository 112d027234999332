use crate::Real;
use nalgebra::convert;
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

/// The shape of a source-time function.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StfType {
    Ricker,
    Gaussian,
    #[serde(rename = "dGaussian")]
    DGaussian,
}

/// A source-time function with dominant frequency `f0`, centered at `tshift` and scaled by
/// `factor`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SourceTimeFunction<T> {
    pub stf_type: StfType,
    pub f0: T,
    pub tshift: T,
    pub factor: T,
}

impl<T: Real> SourceTimeFunction<T> {
    pub fn new(stf_type: StfType, f0: T, tshift: T, factor: T) -> Self {
        Self {
            stf_type,
            f0,
            tshift,
            factor,
        }
    }

    pub fn from_f64(stf_type: StfType, f0: f64, tshift: f64, factor: f64) -> Self {
        Self::new(stf_type, convert(f0), convert(tshift), convert(factor))
    }

    /// Evaluates the function at time `t`.
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn evaluate(&self, t: T) -> T {
        let a = T::pi() * T::pi() * self.f0 * self.f0;
        let t = t - self.tshift;
        let gaussian = self.factor * (-a * t * t).exp();
        match self.stf_type {
            StfType::Ricker => (1.0 - 2.0 * a * t * t) * gaussian,
            StfType::Gaussian => gaussian,
            StfType::DGaussian => -2.0 * a * t * gaussian,
        }
    }
}
