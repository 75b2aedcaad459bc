//! Construction-time and request-time parameters.
//!
//! Init parameters arrive as a JSON map so that vendor-specific keys can sit
//! next to the common ones. They are merged over the device's defaults once,
//! validated, and frozen into [`InitParams`]. Request parameters are never
//! merged: a request either supplies a full [`RequestParams`] or falls back to
//! the device's default (normally the whole synthetic range).

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DeviceError;

/// Seed driving the synthetic generator.
pub const SEED: &str = "seed";
/// First day of the synthetic range (inclusive, `YYYY-MM-DD`).
pub const SYNTHETIC_START: &str = "synthetic_start";
/// Last day of the synthetic range (exclusive, `YYYY-MM-DD`).
pub const SYNTHETIC_END: &str = "synthetic_end";
/// IANA timezone used to lay out local days.
pub const TIMEZONE: &str = "timezone";

/// Keys every device requires after defaults are applied.
pub const REQUIRED_KEYS: [&str; 3] = [SEED, SYNTHETIC_START, SYNTHETIC_END];

/// Frozen construction parameters of a device instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InitParams {
    pub seed: u64,
    pub synthetic_start: NaiveDate,
    pub synthetic_end: NaiveDate,
    pub timezone: Tz,
    /// The merged map, including vendor-specific keys
    pub vendor: Map<String, Value>,
}

impl InitParams {
    /// The common keys with their stock defaults; devices extend this map.
    pub fn default_map() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(SEED.to_string(), Value::from(0u64));
        map.insert(SYNTHETIC_START.to_string(), Value::from("2022-03-01"));
        map.insert(SYNTHETIC_END.to_string(), Value::from("2022-06-17"));
        map.insert(TIMEZONE.to_string(), Value::from("UTC"));
        map
    }

    /// Merge `overrides` over `defaults`, check required keys and parse.
    ///
    /// A key absent from `defaults` is rejected, as is a required key whose
    /// merged value is still `null` (devices use `null` defaults for keys the
    /// caller must always supply).
    pub fn resolve(
        defaults: &Map<String, Value>,
        overrides: &Map<String, Value>,
        required: &[&str],
    ) -> Result<Self, DeviceError> {
        let mut merged = defaults.clone();
        for (key, value) in overrides {
            if !defaults.contains_key(key) {
                return Err(DeviceError::config(format!(
                    "unknown init parameter '{key}'"
                )));
            }
            merged.insert(key.clone(), value.clone());
        }

        for key in REQUIRED_KEYS.iter().chain(required.iter()) {
            if merged.get(*key).map_or(true, Value::is_null) {
                return Err(DeviceError::config(format!(
                    "missing required init parameter '{key}'"
                )));
            }
        }

        let seed = merged
            .get(SEED)
            .and_then(Value::as_u64)
            .ok_or_else(|| DeviceError::config("'seed' must be a non-negative integer"))?;
        let synthetic_start = parse_date(&merged, SYNTHETIC_START)?;
        let synthetic_end = parse_date(&merged, SYNTHETIC_END)?;
        let timezone = match merged.get(TIMEZONE).and_then(Value::as_str) {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|e| DeviceError::config(format!("invalid timezone '{name}': {e}")))?,
            None => Tz::UTC,
        };

        Ok(Self {
            seed,
            synthetic_start,
            synthetic_end,
            timezone,
            vendor: merged,
        })
    }

    /// Number of days in the synthetic range; zero when inverted.
    pub fn num_days(&self) -> usize {
        (self.synthetic_end - self.synthetic_start).num_days().max(0) as usize
    }

    /// Days of the synthetic range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.num_days())
            .map(move |offset| self.synthetic_start + Duration::days(offset as i64))
    }

    /// Read a numeric vendor key.
    pub fn vendor_f64(&self, key: &str) -> Option<f64> {
        self.vendor.get(key).and_then(Value::as_f64)
    }

    /// Read a string vendor key.
    pub fn vendor_str(&self, key: &str) -> Option<&str> {
        self.vendor.get(key).and_then(Value::as_str)
    }

    /// UTC instant of local midnight on `date` in the device timezone.
    pub fn local_day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let naive = date.and_time(NaiveTime::MIN);
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
    }

    /// Length of the local day `date`: 23 or 25 hours across a DST change.
    pub fn local_day_length(&self, date: NaiveDate) -> Duration {
        self.local_day_start(date + Duration::days(1)) - self.local_day_start(date)
    }
}

fn parse_date(map: &Map<String, Value>, key: &str) -> Result<NaiveDate, DeviceError> {
    let raw = map
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| DeviceError::config(format!("'{key}' must be a YYYY-MM-DD string")))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| DeviceError::config(format!("invalid date for '{key}': {e}")))
}

/// UTC midnight at the start of `date`.
pub fn utc_day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Request-scoped options for a single `get_data` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestParams {
    /// Inclusive start of the requested window
    pub start: DateTime<Utc>,
    /// Exclusive end of the requested window
    pub end: DateTime<Utc>,
    /// Extra options a device's filter or fetcher may read
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl RequestParams {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            options: Map::new(),
        }
    }

    /// Day-aligned window `[start 00:00 UTC, end 00:00 UTC)`.
    pub fn days(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(utc_day_start(start), utc_day_start(end))
    }

    /// The whole synthetic range of `init`, from local midnight of the first
    /// day to local midnight after the last.
    pub fn full_range(init: &InitParams) -> Self {
        Self::new(
            init.local_day_start(init.synthetic_start),
            init.local_day_start(init.synthetic_end),
        )
    }

    pub fn with_option(mut self, key: &str, value: Value) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }

    /// Calendar days touched by the window, in UTC.
    pub fn day_span(&self) -> Vec<NaiveDate> {
        let first = self.start.date_naive();
        let mut last = self.end.date_naive();
        if self.end.time() == NaiveTime::MIN {
            last -= Duration::days(1);
        }
        let mut days = Vec::new();
        let mut day = first;
        while day <= last && self.start < self.end {
            days.push(day);
            day += Duration::days(1);
        }
        days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> Map<String, Value> {
        json!({
            "seed": 0,
            "synthetic_start": "2022-03-01",
            "synthetic_end": "2022-06-17",
            "timezone": "UTC",
            "client_id": null,
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let init = InitParams::resolve(&defaults(), &Map::new(), &[]).unwrap();
        assert_eq!(init.seed, 0);
        assert_eq!(init.num_days(), 108);
        assert_eq!(init.timezone, Tz::UTC);
    }

    #[test]
    fn test_resolve_overrides() {
        let overrides = json!({"seed": 7, "timezone": "Europe/Paris"});
        let init =
            InitParams::resolve(&defaults(), overrides.as_object().unwrap(), &[]).unwrap();
        assert_eq!(init.seed, 7);
        assert_eq!(init.timezone, chrono_tz::Europe::Paris);
    }

    #[test]
    fn test_resolve_rejects_unknown_key() {
        let overrides = json!({"sede": 7});
        let err =
            InitParams::resolve(&defaults(), overrides.as_object().unwrap(), &[]).unwrap_err();
        assert!(matches!(err, DeviceError::Configuration(_)));
    }

    #[test]
    fn test_resolve_requires_null_defaults_to_be_supplied() {
        let err = InitParams::resolve(&defaults(), &Map::new(), &["client_id"]).unwrap_err();
        assert!(err.to_string().contains("client_id"));

        let overrides = json!({"client_id": "abc"});
        assert!(
            InitParams::resolve(&defaults(), overrides.as_object().unwrap(), &["client_id"])
                .is_ok()
        );
    }

    #[test]
    fn test_resolve_rejects_bad_values() {
        for bad in [
            json!({"seed": -1}),
            json!({"synthetic_start": "03/01/2022"}),
            json!({"timezone": "Mars/Olympus"}),
        ] {
            assert!(InitParams::resolve(&defaults(), bad.as_object().unwrap(), &[]).is_err());
        }
    }

    #[test]
    fn test_inverted_range_has_no_days() {
        let overrides = json!({"synthetic_start": "2022-06-17", "synthetic_end": "2022-03-01"});
        let init =
            InitParams::resolve(&defaults(), overrides.as_object().unwrap(), &[]).unwrap();
        assert_eq!(init.num_days(), 0);
        assert_eq!(init.days().count(), 0);
    }

    #[test]
    fn test_local_day_start_shifts_with_timezone() {
        let overrides = json!({"timezone": "America/New_York"});
        let init =
            InitParams::resolve(&defaults(), overrides.as_object().unwrap(), &[]).unwrap();
        let date = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        assert_eq!(init.local_day_start(date), utc_day_start(date) + Duration::hours(5));
    }

    #[test]
    fn test_local_day_length_across_dst() {
        let overrides = json!({"timezone": "America/New_York"});
        let init =
            InitParams::resolve(&defaults(), overrides.as_object().unwrap(), &[]).unwrap();
        let length = |m, d| init.local_day_length(NaiveDate::from_ymd_opt(2022, m, d).unwrap());

        assert_eq!(length(3, 12), Duration::hours(24));
        assert_eq!(length(3, 13), Duration::hours(23));
        assert_eq!(length(11, 6), Duration::hours(25));

        let utc = InitParams::resolve(&defaults(), &Map::new(), &[]).unwrap();
        assert_eq!(
            utc.local_day_length(NaiveDate::from_ymd_opt(2022, 3, 13).unwrap()),
            Duration::days(1)
        );
    }

    #[test]
    fn test_day_span() {
        let start = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 3, 4).unwrap();
        assert_eq!(RequestParams::days(start, end).day_span().len(), 3);

        let partial =
            RequestParams::new(utc_day_start(start), utc_day_start(end) + Duration::hours(1));
        assert_eq!(partial.day_span().len(), 4);

        assert!(RequestParams::days(end, start).day_span().is_empty());
    }
}
