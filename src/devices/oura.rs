//! Oura Ring 3: nightly sleep and readiness.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::core::params::InitParams;
use crate::core::types::{DataSeries, DataType};
use crate::device::DeviceModel;
use crate::synthetic::{seeded_rng, SleepPipeline, SyntheticStore};

pub const KEY: &str = "oura/ring_3";

/// Init key: sleep duration readiness is scored against, in minutes.
pub const SLEEP_TARGET_MINUTES: &str = "sleep_target_minutes";

#[derive(Debug, Clone, Copy, Default)]
pub struct Ring3;

impl DeviceModel for Ring3 {
    fn capabilities(&self) -> BTreeSet<DataType> {
        BTreeSet::from([DataType::Sleep, DataType::Readiness])
    }

    fn default_init_params(&self) -> Map<String, Value> {
        let mut map = InitParams::default_map();
        map.insert(SLEEP_TARGET_MINUTES.to_string(), Value::from(450.0));
        map
    }

    fn generate_synthetic(&self, init: &InitParams) -> SyntheticStore {
        let mut pipeline = SleepPipeline::default();
        if let Some(target) = init.vendor_f64(SLEEP_TARGET_MINUTES) {
            pipeline.readiness.target_sleep_minutes = target;
        }

        let mut rng = seeded_rng(init.seed);
        let (nights, readiness) = pipeline.run(init, &mut rng);

        SyntheticStore::from([
            (DataType::Sleep, DataSeries::Daily(nights)),
            (DataType::Readiness, DataSeries::Daily(readiness)),
        ])
    }
}
