//! # `wdfilters_core`
//!
//! Provides the basic definitions for all of `wdfilters`. Contains the per-sample processing
//! traits, parameter smoothing and cross-thread parameter handoff, and the special functions
//! needed by nonlinear wave digital filter elements.
#![warn(missing_docs)]

use simba::simd::SimdRealField;

pub use simba::simd;

pub mod benchmarking;
pub mod dsp;
pub mod math;
pub mod util;

/// Scalar trait. All of `wdfilters` uses this trait as bound for scalar values.
///
/// A scalar is defined here to mean the value which is used as an audio sample. It very often is
/// `f64`, but can also be any SIMD type, where each lane runs an independent copy of the circuit.
pub trait Scalar: Copy + SimdRealField {
    /// Create a new [`Scalar`] from a single `f64` value. The resulting type, if it is a SIMD with
    /// multiple lanes, should have all lanes being this value.
    fn from_f64(value: f64) -> Self;
}

impl<T: Copy + SimdRealField> Scalar for T
where
    T::Element: Copy,
{
    fn from_f64(value: f64) -> Self {
        Self::from_subset(&value)
    }
}
