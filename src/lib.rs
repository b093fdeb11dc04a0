//! Operating-point solver for photoelectrochemical cells.
//!
//! A 1-3 junction photovoltaic stack drives a CO2-to-ethylene or hydrogen
//! evolution electrolyzer. The crate finds where the stack's J-V curve meets
//! the electrolyzer's demand under several coupling regimes and reports
//! Faradaic efficiency, production rate and solar-to-fuel efficiency.

pub mod catalyst;
pub mod config;
pub mod constants;
pub mod curve;
pub mod error;
pub mod metrics;
pub mod output;
pub mod parser;
pub mod presets;
pub mod pv;
pub mod scenario;
pub mod spectrum;
pub mod stats;
