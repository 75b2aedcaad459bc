//! Seeded synthetic data generation.
//!
//! This module contains:
//! - A generic Markov chain
//! - Activity (steps) and derived heart-rate synthesis
//! - Sleep, readiness and glucose synthesis
//! - Daily dropout injection
//!
//! Every pipeline takes one RNG seeded from the device's init params and
//! consumes it in a fixed order, so identical init params reproduce
//! identical output.

pub mod activity;
pub mod dropout;
pub mod glucose;
pub mod markov;
pub mod sleep;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;

use crate::core::types::{DataSeries, DataType};

// Re-export commonly used types
pub use activity::{ActivityDataset, ActivityPipeline, ActivityState};
pub use dropout::{DropoutModel, Gap};
pub use glucose::GlucosePipeline;
pub use markov::MarkovChain;
pub use sleep::{SleepPipeline, SleepStage};

/// Full-range series for every data type of one device instance.
pub type SyntheticStore = BTreeMap<DataType, DataSeries>;

/// The RNG every generator draws from.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
