//! Fitbit Charge 6: steps, heart rate and daily activity summaries.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::core::params::InitParams;
use crate::core::types::{DataSeries, DataType};
use crate::device::DeviceModel;
use crate::synthetic::activity::HeartRateModel;
use crate::synthetic::{seeded_rng, ActivityPipeline, DropoutModel, SyntheticStore};

pub const KEY: &str = "fitbit/charge_6";

/// Init key: baseline heart rate of the simulated wearer.
pub const RESTING_HEART_RATE: &str = "resting_heart_rate";
/// Init key: mean length of the daily sync gap, in minutes.
pub const MEAN_GAP_MINUTES: &str = "mean_gap_minutes";

#[derive(Debug, Clone, Copy, Default)]
pub struct Charge6;

impl Charge6 {
    fn pipeline(init: &InitParams) -> ActivityPipeline {
        let mut pipeline = ActivityPipeline::default();
        if let Some(bpm) = init.vendor_f64(RESTING_HEART_RATE) {
            pipeline.heart_rate = HeartRateModel::default().with_resting_bpm(bpm);
        }
        if let Some(minutes) = init.vendor_f64(MEAN_GAP_MINUTES) {
            pipeline.dropout = DropoutModel::new(minutes);
        }
        pipeline
    }
}

impl DeviceModel for Charge6 {
    fn capabilities(&self) -> BTreeSet<DataType> {
        BTreeSet::from([
            DataType::IntradaySteps,
            DataType::IntradayHeartRate,
            DataType::DailySummary,
        ])
    }

    fn default_init_params(&self) -> Map<String, Value> {
        let mut map = InitParams::default_map();
        map.insert(RESTING_HEART_RATE.to_string(), Value::from(62.0));
        map.insert(MEAN_GAP_MINUTES.to_string(), Value::from(90.0));
        map
    }

    fn generate_synthetic(&self, init: &InitParams) -> SyntheticStore {
        let mut rng = seeded_rng(init.seed);
        let dataset = Self::pipeline(init).run(init, &mut rng);

        SyntheticStore::from([
            (DataType::IntradaySteps, DataSeries::Timed(dataset.steps)),
            (DataType::IntradayHeartRate, DataSeries::Timed(dataset.heart_rate)),
            (DataType::DailySummary, DataSeries::Daily(dataset.daily)),
        ])
    }
}
