//! Engines that run on parsed records.
//!
//! - `Simulator`: decide a subject's passing situation
//! - `DiffCalculator`: field-level changes between two grade snapshots

pub mod diff;
pub mod simulate;

pub use diff::DiffCalculator;
pub use simulate::Simulator;
