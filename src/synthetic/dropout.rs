//! Missing-data injection.
//!
//! Real wearables go quiet for a stretch most days (charging, off-wrist,
//! sensor warm-up). One contiguous gap is drawn per day: its length from an
//! exponential distribution, its start uniformly within the day, both
//! bounded to the day. The last thing a consumer sees before the gap is an
//! explicit [`Reading::NoData`] sentinel rather than silence.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::core::slicer::lower_bound_by_key;
use crate::core::types::{Reading, TimedSample};

/// A half-open interval `[start, end)` with no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Gap {
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Parameters of the daily dropout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DropoutModel {
    /// Mean gap length in minutes
    pub mean_gap_minutes: f64,
}

impl Default for DropoutModel {
    fn default() -> Self {
        Self {
            mean_gap_minutes: 90.0,
        }
    }
}

impl DropoutModel {
    pub fn new(mean_gap_minutes: f64) -> Self {
        Self { mean_gap_minutes }
    }

    /// Draw the gap for the day starting at `day_start` and lasting `day_length`.
    pub fn draw_gap<R: Rng + ?Sized>(
        &self,
        day_start: DateTime<Utc>,
        day_length: Duration,
        rng: &mut R,
    ) -> Gap {
        let day_secs = day_length.num_seconds().max(0) as f64;
        let length_secs = if self.mean_gap_minutes > 0.0 {
            Exp::new(1.0 / (self.mean_gap_minutes * 60.0))
                .map_or(0.0, |exp| exp.sample(rng))
                .min(day_secs)
        } else {
            0.0
        };
        let offset_secs = rng.gen_range(0.0..=(day_secs - length_secs));

        let start = day_start + Duration::seconds(offset_secs as i64);
        Gap {
            start,
            end: start + Duration::seconds(length_secs as i64),
        }
    }
}

/// Remove samples inside `gap`, leaving one `NoData` sentinel at the first
/// removed timestamp. Returns the number of samples removed.
pub fn drop_gap(samples: &mut Vec<TimedSample>, gap: &Gap) -> usize {
    let from = lower_bound_by_key(samples.as_slice(), &gap.start, |s| s.timestamp);
    let to = lower_bound_by_key(samples.as_slice(), &gap.end, |s| s.timestamp);
    if from >= to {
        return 0;
    }

    let sentinel = TimedSample::no_data(samples[from].timestamp);
    samples.splice(from..to, std::iter::once(sentinel));
    to - from
}

/// Keep the sample grid but blank every reading inside `gap`.
/// Returns the number of samples blanked.
pub fn mask_gap(samples: &mut [TimedSample], gap: &Gap) -> usize {
    let mut masked = 0;
    for sample in samples.iter_mut().filter(|s| gap.contains(s.timestamp)) {
        sample.reading = Reading::NoData;
        masked += 1;
    }
    masked
}
