//! Range slicing for generated series.
//!
//! Time-keyed series are cut with a lower-bound binary search on their
//! timestamps. Per-day series are cut with plain day-offset arithmetic.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::ops::Range;

use crate::core::types::{DataSeries, DayRecord, TimedSample};

/// Smallest index `i` with `key(&items[i]) >= target`, or `items.len()`.
///
/// `items` must be non-decreasing under `key`. An exact match returns
/// immediately, so with duplicate keys any matching index may come back;
/// callers that need a stable boundary must deduplicate first.
pub fn lower_bound_by_key<T, K, F>(items: &[T], target: &K, key: F) -> usize
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut start = 0;
    let mut end = items.len();

    while start < end {
        let mid = start + (end - start) / 2;
        let candidate = key(&items[mid]);
        if candidate == *target {
            return mid;
        }
        if candidate < *target {
            start = mid + 1;
        } else {
            end = mid;
        }
    }

    start
}

/// [`lower_bound_by_key`] over the elements themselves.
pub fn lower_bound<T: Ord + Clone>(items: &[T], target: &T) -> usize {
    lower_bound_by_key(items, target, T::clone)
}

/// Index range of the days `[start_day, end_day)` in a per-day series whose
/// first record is `first_day` and which holds `len` records.
pub fn day_offset_range(
    first_day: NaiveDate,
    len: usize,
    start_day: NaiveDate,
    end_day: NaiveDate,
) -> Range<usize> {
    let clamp = |offset: i64| offset.clamp(0, len as i64) as usize;
    let start = clamp((start_day - first_day).num_days());
    let end = clamp((end_day - first_day).num_days());
    start..end.max(start)
}

/// Samples with `start <= timestamp < end`.
pub fn slice_timed(
    samples: &[TimedSample],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> &[TimedSample] {
    if start >= end {
        return &[];
    }
    let from = lower_bound_by_key(samples, &start, |s| s.timestamp);
    let to = lower_bound_by_key(samples, &end, |s| s.timestamp);
    &samples[from..to.max(from)]
}

/// Day records touched by `[start, end)`; an end past midnight keeps its day.
pub fn slice_daily(
    days: &[DayRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> &[DayRecord] {
    let Some(first) = days.first() else {
        return &[];
    };
    if start >= end {
        return &[];
    }

    let start_day = start.date_naive();
    let mut end_day = end.date_naive();
    if end.time() > NaiveTime::MIN {
        end_day += Duration::days(1);
    }

    let range = day_offset_range(first.date, days.len(), start_day, end_day);
    &days[range]
}

impl DataSeries {
    /// Narrow the series to `[start, end)` using the policy of its shape.
    pub fn slice(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DataSeries {
        match self {
            DataSeries::Timed(samples) => {
                DataSeries::Timed(slice_timed(samples, start, end).to_vec())
            }
            DataSeries::Daily(days) => DataSeries::Daily(slice_daily(days, start, end).to_vec()),
        }
    }
}
