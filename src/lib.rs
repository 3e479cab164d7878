//! # `wdfilters`
//!
//! Real-time analog circuit emulation with wave digital filters. This crate re-exports the member
//! crates of the workspace behind features:
//!
//! - `wdf`: the wave digital filter engine (leaves, adapters, diode pair, modules),
//! - `circuits` (default): ready-to-use RC filters and the diode clipper, plus the filter factory.
pub use wdfilters_core::*;

#[cfg(feature = "wdf")]
pub use wdfilters_wdf as wdf;

#[cfg(feature = "circuits")]
pub use wdfilters_circuits as circuits;
