//! Nightly sleep and readiness synthesis.
//!
//! A night is attributed to the local day on which it ends. Bedtime and
//! duration come from clamped normal draws; the hypnogram is a 5-minute
//! walk of a four-state chain. Readiness is scored from the same night.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::core::params::InitParams;
use crate::core::types::{DayRecord, TimedSample};
use crate::synthetic::markov::MarkovChain;

/// Hypnogram epoch length.
pub const EPOCH_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepStage {
    Awake,
    Light,
    Deep,
    Rem,
}

impl SleepStage {
    fn from_index(index: usize) -> Self {
        match index {
            0 => SleepStage::Awake,
            1 => SleepStage::Light,
            2 => SleepStage::Deep,
            _ => SleepStage::Rem,
        }
    }

    fn index(&self) -> usize {
        match self {
            SleepStage::Awake => 0,
            SleepStage::Light => 1,
            SleepStage::Deep => 2,
            SleepStage::Rem => 3,
        }
    }

    /// Numeric hypnogram code: 1 deep, 2 light, 3 REM, 4 awake.
    pub fn code(&self) -> f64 {
        match self {
            SleepStage::Deep => 1.0,
            SleepStage::Light => 2.0,
            SleepStage::Rem => 3.0,
            SleepStage::Awake => 4.0,
        }
    }

    fn metric(&self) -> &'static str {
        match self {
            SleepStage::Awake => "awake_minutes",
            SleepStage::Light => "light_minutes",
            SleepStage::Deep => "deep_minutes",
            SleepStage::Rem => "rem_minutes",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SleepModel {
    pub stages: MarkovChain<4>,
    /// Bedtime offset from local midnight, minutes (negative = evening before)
    pub bedtime_mean_minutes: f64,
    pub bedtime_std_minutes: f64,
    pub duration_mean_minutes: f64,
    pub duration_std_minutes: f64,
    pub duration_min_minutes: f64,
    pub duration_max_minutes: f64,
}

impl Default for SleepModel {
    fn default() -> Self {
        Self {
            // Rows: from Awake, Light, Deep, REM.
            stages: MarkovChain::new([
                [0.60, 0.35, 0.00, 0.05],
                [0.05, 0.75, 0.12, 0.08],
                [0.02, 0.18, 0.80, 0.00],
                [0.05, 0.15, 0.00, 0.80],
            ]),
            bedtime_mean_minutes: -75.0,
            bedtime_std_minutes: 30.0,
            duration_mean_minutes: 450.0,
            duration_std_minutes: 45.0,
            duration_min_minutes: 240.0,
            duration_max_minutes: 600.0,
        }
    }
}

fn normal<R: Rng + ?Sized>(mean: f64, std: f64, rng: &mut R) -> f64 {
    Normal::new(mean, std).map_or(mean, |n| n.sample(rng))
}

impl SleepModel {
    /// Simulate the night ending on the local day starting at `day_start`.
    pub fn simulate_night<R: Rng + ?Sized>(
        &self,
        day_start: DateTime<Utc>,
        rng: &mut R,
    ) -> (DateTime<Utc>, Vec<SleepStage>) {
        let bedtime_offset = normal(self.bedtime_mean_minutes, self.bedtime_std_minutes, rng)
            .clamp(-240.0, 120.0);
        let duration = normal(self.duration_mean_minutes, self.duration_std_minutes, rng)
            .clamp(self.duration_min_minutes, self.duration_max_minutes);

        let bedtime = day_start + Duration::minutes(bedtime_offset.round() as i64);
        let epochs = (duration / EPOCH_MINUTES as f64).round() as usize;

        let mut stage = SleepStage::Awake;
        let hypnogram = (0..epochs)
            .map(|_| {
                stage = SleepStage::from_index(self.stages.step(stage.index(), rng));
                stage
            })
            .collect();
        (bedtime, hypnogram)
    }
}

/// Summarise a night into a day record with the hypnogram nested inside.
pub fn sleep_record(
    date: NaiveDate,
    bedtime: DateTime<Utc>,
    hypnogram: &[SleepStage],
) -> DayRecord {
    let mut record = DayRecord::new(date);
    for stage in [SleepStage::Awake, SleepStage::Light, SleepStage::Deep, SleepStage::Rem] {
        let minutes = hypnogram.iter().filter(|s| **s == stage).count() as i64 * EPOCH_MINUTES;
        record = record.with_metric(stage.metric(), minutes as f64);
    }

    let time_in_bed = hypnogram.len() as i64 * EPOCH_MINUTES;
    let awake = record.metric("awake_minutes").unwrap_or(0.0);
    let total_sleep = time_in_bed as f64 - awake;
    let efficiency = if time_in_bed > 0 {
        100.0 * total_sleep / time_in_bed as f64
    } else {
        0.0
    };

    record.samples = hypnogram
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            TimedSample::new(bedtime + Duration::minutes(i as i64 * EPOCH_MINUTES), stage.code())
        })
        .collect();

    record
        .with_metric("time_in_bed_minutes", time_in_bed as f64)
        .with_metric("total_sleep_minutes", total_sleep)
        .with_metric("efficiency", efficiency.round())
}

/// Readiness score (0-100) from a night's sleep.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadinessModel {
    pub target_sleep_minutes: f64,
    pub noise_std: f64,
}

impl Default for ReadinessModel {
    fn default() -> Self {
        Self {
            target_sleep_minutes: 450.0,
            noise_std: 4.0,
        }
    }
}

impl ReadinessModel {
    pub fn score<R: Rng + ?Sized>(&self, night: &DayRecord, rng: &mut R) -> DayRecord {
        let total = night.metric("total_sleep_minutes").unwrap_or(0.0);
        let efficiency = night.metric("efficiency").unwrap_or(0.0);
        let deep = night.metric("deep_minutes").unwrap_or(0.0);

        let sleep_balance = (total / self.target_sleep_minutes).min(1.0) * 100.0;
        // A fifth of the night in deep sleep earns the full deep-sleep contribution.
        let deep_score = if total > 0.0 {
            (deep / total / 0.2).min(1.0) * 100.0
        } else {
            0.0
        };
        let bound = 3.0 * self.noise_std;
        let noise = normal(0.0, self.noise_std, rng).clamp(-bound, bound);
        let score = (0.5 * sleep_balance + 0.3 * efficiency + 0.2 * deep_score + noise)
            .clamp(0.0, 100.0)
            .round();

        DayRecord::new(night.date)
            .with_metric("score", score)
            .with_metric("sleep_balance", sleep_balance.round())
    }
}

/// Sleep and readiness for every day of the range, in one seeded pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SleepPipeline {
    pub sleep: SleepModel,
    pub readiness: ReadinessModel,
}

impl SleepPipeline {
    pub fn run<R: Rng + ?Sized>(
        &self,
        init: &InitParams,
        rng: &mut R,
    ) -> (Vec<DayRecord>, Vec<DayRecord>) {
        let mut nights = Vec::with_capacity(init.num_days());
        let mut readiness = Vec::with_capacity(init.num_days());

        for date in init.days() {
            let day_start = init.local_day_start(date);
            let (bedtime, hypnogram) = self.sleep.simulate_night(day_start, rng);
            let night = sleep_record(date, bedtime, &hypnogram);
            readiness.push(self.readiness.score(&night, rng));
            nights.push(night);
        }

        (nights, readiness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::utc_day_start;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 3, 1).unwrap()
    }

    #[test]
    fn test_night_duration_is_bounded() {
        let model = SleepModel::default();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let (bedtime, hypnogram) = model.simulate_night(utc_day_start(day()), &mut rng);
            let minutes = hypnogram.len() as f64 * EPOCH_MINUTES as f64;
            assert!((240.0..=600.0).contains(&minutes));
            assert!(bedtime >= utc_day_start(day()) - Duration::hours(4));
            assert!(bedtime <= utc_day_start(day()) + Duration::hours(2));
        }
    }

    #[test]
    fn test_sleep_record_minutes_add_up() {
        let model = SleepModel::default();
        let mut rng = StdRng::seed_from_u64(10);
        let (bedtime, hypnogram) = model.simulate_night(utc_day_start(day()), &mut rng);
        let record = sleep_record(day(), bedtime, &hypnogram);

        let stages = ["awake_minutes", "light_minutes", "deep_minutes", "rem_minutes"]
            .iter()
            .map(|m| record.metric(m).unwrap())
            .sum::<f64>();
        assert_eq!(stages, record.metric("time_in_bed_minutes").unwrap());
        assert_eq!(record.samples.len(), hypnogram.len());
        assert_eq!(record.samples[0].timestamp, bedtime);
        let efficiency = record.metric("efficiency").unwrap();
        assert!((0.0..=100.0).contains(&efficiency));
    }

    #[test]
    fn test_readiness_in_range_and_tracks_sleep() {
        let model = ReadinessModel {
            noise_std: 0.0,
            ..ReadinessModel::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let short = DayRecord::new(day())
            .with_metric("total_sleep_minutes", 200.0)
            .with_metric("efficiency", 70.0)
            .with_metric("deep_minutes", 20.0);
        let long = DayRecord::new(day())
            .with_metric("total_sleep_minutes", 470.0)
            .with_metric("efficiency", 92.0)
            .with_metric("deep_minutes", 90.0);

        let low = model.score(&short, &mut rng).metric("score").unwrap();
        let high = model.score(&long, &mut rng).metric("score").unwrap();
        assert!(high > low);
        assert!((0.0..=100.0).contains(&low));
        assert!((0.0..=100.0).contains(&high));
    }
}
