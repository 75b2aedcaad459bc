//! Data-type keys, readings and the series shapes devices return.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DeviceError;

/// Every data type any built-in device can declare.
///
/// The string keys are what callers pass to [`crate::Device::get_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    IntradaySteps,
    IntradayHeartRate,
    DailySummary,
    Sleep,
    Readiness,
    Glucose,
}

/// How a data type's series is laid out, which decides how it is sliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesShape {
    /// Sorted time-keyed samples, sliced by binary search.
    Timed,
    /// One record per calendar day, sliced by day offset.
    Daily,
}

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::IntradaySteps,
        DataType::IntradayHeartRate,
        DataType::DailySummary,
        DataType::Sleep,
        DataType::Readiness,
        DataType::Glucose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::IntradaySteps => "intraday_steps",
            DataType::IntradayHeartRate => "intraday_heart_rate",
            DataType::DailySummary => "daily_summary",
            DataType::Sleep => "sleep",
            DataType::Readiness => "readiness",
            DataType::Glucose => "glucose",
        }
    }

    pub fn shape(&self) -> SeriesShape {
        match self {
            DataType::IntradaySteps | DataType::IntradayHeartRate | DataType::Glucose => {
                SeriesShape::Timed
            }
            DataType::DailySummary | DataType::Sleep | DataType::Readiness => SeriesShape::Daily,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .iter()
            .copied()
            .find(|dt| dt.as_str() == s)
            .ok_or_else(|| DeviceError::config(format!("unknown data type '{s}'")))
    }
}

/// A single reading. `NoData` marks the point where a device stopped reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reading {
    Value(f64),
    NoData,
}

impl Reading {
    pub fn value(&self) -> Option<f64> {
        match self {
            Reading::Value(v) => Some(*v),
            Reading::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Reading::NoData)
    }
}

/// A timestamped reading in a time-keyed series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSample {
    pub timestamp: DateTime<Utc>,
    pub reading: Reading,
}

impl TimedSample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            reading: Reading::Value(value),
        }
    }

    pub fn no_data(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            reading: Reading::NoData,
        }
    }
}

/// One calendar day of a per-day series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    /// Named daily metrics (totals, scores, minutes per stage)
    pub summary: BTreeMap<String, f64>,
    /// Nested intraday detail for the day, if any (e.g. a hypnogram)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<TimedSample>,
}

impl DayRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            summary: BTreeMap::new(),
            samples: Vec::new(),
        }
    }

    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.summary.insert(name.to_string(), value);
        self
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.summary.get(name).copied()
    }
}

/// A generated or sliced series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
pub enum DataSeries {
    /// Sorted ascending by timestamp, timestamps unique.
    Timed(Vec<TimedSample>),
    /// Consecutive calendar days, ascending.
    Daily(Vec<DayRecord>),
}

impl DataSeries {
    pub fn empty(shape: SeriesShape) -> Self {
        match shape {
            SeriesShape::Timed => DataSeries::Timed(Vec::new()),
            SeriesShape::Daily => DataSeries::Daily(Vec::new()),
        }
    }

    pub fn shape(&self) -> SeriesShape {
        match self {
            DataSeries::Timed(_) => SeriesShape::Timed,
            DataSeries::Daily(_) => SeriesShape::Daily,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DataSeries::Timed(samples) => samples.len(),
            DataSeries::Daily(days) => days.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_timed(&self) -> Option<&[TimedSample]> {
        match self {
            DataSeries::Timed(samples) => Some(samples),
            DataSeries::Daily(_) => None,
        }
    }

    pub fn as_daily(&self) -> Option<&[DayRecord]> {
        match self {
            DataSeries::Daily(days) => Some(days),
            DataSeries::Timed(_) => None,
        }
    }
}

/// Result of a `get_data` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "payload", rename_all = "snake_case")]
pub enum DeviceData {
    /// Slice of the instance's synthetic store.
    Synthetic(DataSeries),
    /// Vendor-native response returned untouched by the real fetcher.
    Vendor(serde_json::Value),
}

impl DeviceData {
    pub fn as_series(&self) -> Option<&DataSeries> {
        match self {
            DeviceData::Synthetic(series) => Some(series),
            DeviceData::Vendor(_) => None,
        }
    }

    pub fn into_series(self) -> Option<DataSeries> {
        match self {
            DeviceData::Synthetic(series) => Some(series),
            DeviceData::Vendor(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_keys_parse_back() {
        for dt in DataType::ALL {
            assert_eq!(dt.as_str().parse::<DataType>().unwrap(), dt);
        }
    }

    #[test]
    fn test_unknown_data_type_is_configuration_error() {
        let err = "heart_rate_variability".parse::<DataType>().unwrap_err();
        assert!(matches!(err, DeviceError::Configuration(_)));
    }

    #[test]
    fn test_shapes() {
        assert_eq!(DataType::IntradaySteps.shape(), SeriesShape::Timed);
        assert_eq!(DataType::Sleep.shape(), SeriesShape::Daily);
        assert!(DataSeries::empty(SeriesShape::Daily).as_daily().is_some());
    }

    #[test]
    fn test_reading_serialization() {
        let json = serde_json::to_string(&Reading::NoData).unwrap();
        assert_eq!(json, "\"no_data\"");
        let json = serde_json::to_string(&Reading::Value(3.0)).unwrap();
        assert_eq!(json, "{\"value\":3.0}");
    }
}
