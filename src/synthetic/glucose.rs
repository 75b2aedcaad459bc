//! Continuous glucose synthesis.
//!
//! Readings every 5 minutes: a mean-reverting AR(1) deviation around a
//! fasting baseline plus a Gaussian-shaped response after each meal. Meal
//! times and sizes are jittered per day. The daily dropout pass removes one
//! stretch per day behind a sentinel.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::core::params::InitParams;
use crate::core::types::TimedSample;
use crate::synthetic::dropout::{drop_gap, DropoutModel};

/// CGM sampling interval.
pub const READING_INTERVAL_MINUTES: i64 = 5;

/// A meal response: peak offset from local midnight and peak rise in mg/dL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Meal {
    pub minutes_after_midnight: f64,
    pub peak_rise: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlucoseModel {
    pub baseline: f64,
    /// AR(1) coefficient per reading
    pub persistence: f64,
    pub noise_std: f64,
    pub meals: Vec<Meal>,
    pub meal_time_std_minutes: f64,
    /// Width (σ) of the meal response curve in minutes
    pub meal_width_minutes: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for GlucoseModel {
    fn default() -> Self {
        Self {
            baseline: 100.0,
            persistence: 0.92,
            noise_std: 3.0,
            meals: vec![
                Meal {
                    minutes_after_midnight: 8.0 * 60.0 + 45.0,
                    peak_rise: 40.0,
                },
                Meal {
                    minutes_after_midnight: 13.0 * 60.0 + 45.0,
                    peak_rise: 50.0,
                },
                Meal {
                    minutes_after_midnight: 19.0 * 60.0 + 45.0,
                    peak_rise: 55.0,
                },
            ],
            meal_time_std_minutes: 30.0,
            meal_width_minutes: 40.0,
            min: 40.0,
            max: 400.0,
        }
    }
}

impl GlucoseModel {
    /// Dense readings for the local day starting at `day_start` and lasting
    /// `day_length`. `deviation` carries the AR state across days.
    pub fn simulate_day<R: Rng + ?Sized>(
        &self,
        day_start: DateTime<Utc>,
        day_length: Duration,
        deviation: &mut f64,
        rng: &mut R,
    ) -> Vec<TimedSample> {
        let meals: Vec<Meal> = self
            .meals
            .iter()
            .map(|meal| Meal {
                minutes_after_midnight: sample_normal(
                    meal.minutes_after_midnight,
                    self.meal_time_std_minutes,
                    rng,
                ),
                peak_rise: meal.peak_rise * sample_normal(1.0, 0.2, rng).clamp(0.4, 1.6),
            })
            .collect();

        let readings = day_length.num_minutes().max(0) / READING_INTERVAL_MINUTES;
        (0..readings)
            .map(|i| {
                let minute = (i * READING_INTERVAL_MINUTES) as f64;
                *deviation =
                    self.persistence * *deviation + sample_normal(0.0, self.noise_std, rng);
                let meal_rise: f64 = meals
                    .iter()
                    .map(|meal| {
                        let z = (minute - meal.minutes_after_midnight) / self.meal_width_minutes;
                        meal.peak_rise * (-0.5 * z * z).exp()
                    })
                    .sum();
                let value = (self.baseline + *deviation + meal_rise)
                    .clamp(self.min, self.max)
                    .round();
                let timestamp = day_start + Duration::minutes(i * READING_INTERVAL_MINUTES);
                TimedSample::new(timestamp, value)
            })
            .collect()
    }
}

fn sample_normal<R: Rng + ?Sized>(mean: f64, std: f64, rng: &mut R) -> f64 {
    Normal::new(mean, std).map_or(mean, |n| n.sample(rng))
}

/// Glucose readings for the whole range with daily dropout.
#[derive(Debug, Clone, PartialEq)]
pub struct GlucosePipeline {
    pub glucose: GlucoseModel,
    pub dropout: DropoutModel,
}

impl Default for GlucosePipeline {
    fn default() -> Self {
        Self {
            glucose: GlucoseModel::default(),
            dropout: DropoutModel::new(60.0),
        }
    }
}

impl GlucosePipeline {
    pub fn run<R: Rng + ?Sized>(&self, init: &InitParams, rng: &mut R) -> Vec<TimedSample> {
        let mut readings = Vec::new();
        let mut deviation = 0.0;

        for date in init.days() {
            let day_start = init.local_day_start(date);
            let day_length = init.local_day_length(date);
            let mut day = self
                .glucose
                .simulate_day(day_start, day_length, &mut deviation, rng);
            let gap = self.dropout.draw_gap(day_start, day_length, rng);
            drop_gap(&mut day, &gap);
            readings.extend(day);
        }

        readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::utc_day_start;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day_start() -> DateTime<Utc> {
        utc_day_start(NaiveDate::from_ymd_opt(2022, 3, 1).unwrap())
    }

    #[test]
    fn test_day_has_288_readings_in_bounds() {
        let model = GlucoseModel::default();
        let mut rng = StdRng::seed_from_u64(21);
        let mut deviation = 0.0;
        let day = model.simulate_day(day_start(), Duration::days(1), &mut deviation, &mut rng);

        assert_eq!(day.len(), 288);
        for sample in &day {
            let value = sample.reading.value().unwrap();
            assert!((40.0..=400.0).contains(&value));
        }
    }

    #[test]
    fn test_meals_raise_glucose() {
        let model = GlucoseModel {
            noise_std: 0.0,
            meal_time_std_minutes: 0.0,
            ..GlucoseModel::default()
        };
        let mut rng = StdRng::seed_from_u64(22);
        let mut deviation = 0.0;
        let day = model.simulate_day(day_start(), Duration::days(1), &mut deviation, &mut rng);

        let at = |minute: i64| {
            day[(minute / READING_INTERVAL_MINUTES) as usize]
                .reading
                .value()
                .unwrap()
        };
        assert!(at(4 * 60) < at(13 * 60 + 45));
        assert_eq!(at(4 * 60), 100.0);
    }
}
