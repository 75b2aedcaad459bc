//! Dexcom G7: continuous glucose.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::core::params::InitParams;
use crate::core::types::{DataSeries, DataType, Reading, TimedSample};
use crate::device::DeviceModel;
use crate::synthetic::{seeded_rng, GlucosePipeline, SyntheticStore};

pub const KEY: &str = "dexcom/g7";

/// Init key: `"mg/dL"` or `"mmol/L"`.
pub const UNITS: &str = "units";

pub const MG_PER_DL: &str = "mg/dL";
pub const MMOL_PER_L: &str = "mmol/L";

/// mg/dL per mmol/L for glucose.
const MMOL_FACTOR: f64 = 18.0182;

#[derive(Debug, Clone, Copy, Default)]
pub struct G7;

fn to_mmol(sample: TimedSample) -> TimedSample {
    match sample.reading {
        Reading::Value(mg) => TimedSample::new(
            sample.timestamp,
            (mg / MMOL_FACTOR * 10.0).round() / 10.0,
        ),
        Reading::NoData => sample,
    }
}

impl DeviceModel for G7 {
    fn capabilities(&self) -> BTreeSet<DataType> {
        BTreeSet::from([DataType::Glucose])
    }

    fn default_init_params(&self) -> Map<String, Value> {
        let mut map = InitParams::default_map();
        map.insert(UNITS.to_string(), Value::from(MG_PER_DL));
        map
    }

    fn required_init_params(&self) -> &[&'static str] {
        &[UNITS]
    }

    fn generate_synthetic(&self, init: &InitParams) -> SyntheticStore {
        let mut rng = seeded_rng(init.seed);
        let mut readings = GlucosePipeline::default().run(init, &mut rng);

        if init.vendor_str(UNITS) == Some(MMOL_PER_L) {
            readings = readings.into_iter().map(to_mmol).collect();
        } else if init.vendor_str(UNITS) != Some(MG_PER_DL) {
            tracing::warn!(units = ?init.vendor.get(UNITS), "unknown glucose units, using mg/dL");
        }

        SyntheticStore::from([(DataType::Glucose, DataSeries::Timed(readings))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(units: &str) -> SyntheticStore {
        let overrides = json!({"synthetic_end": "2022-03-03", "units": units});
        let init = InitParams::resolve(
            &G7.default_init_params(),
            overrides.as_object().unwrap(),
            G7.required_init_params(),
        )
        .unwrap();
        G7.generate_synthetic(&init)
    }

    #[test]
    fn test_mmol_conversion() {
        let mg = store(MG_PER_DL);
        let mmol = store(MMOL_PER_L);
        let mg = mg[&DataType::Glucose].as_timed().unwrap();
        let mmol = mmol[&DataType::Glucose].as_timed().unwrap();

        assert_eq!(mg.len(), mmol.len());
        for (a, b) in mg.iter().zip(mmol) {
            assert_eq!(a.timestamp, b.timestamp);
            match (a.reading.value(), b.reading.value()) {
                (Some(a), Some(b)) => assert!((a / MMOL_FACTOR - b).abs() < 0.051),
                (None, None) => {}
                other => panic!("mismatched readings {other:?}"),
            }
        }
    }

    #[test]
    fn test_units_cannot_be_null() {
        let overrides = json!({"units": null});
        assert!(InitParams::resolve(
            &G7.default_init_params(),
            overrides.as_object().unwrap(),
            G7.required_init_params(),
        )
        .is_err());
    }
}
