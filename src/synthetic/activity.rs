//! Activity and heart-rate synthesis.
//!
//! Each local day is split into fifteen-minute slots (96 on a 24 h day). A three-state
//! Markov chain walks the slots so activity comes in bursts, a Poisson draw
//! turns each slot's state into a step count, and a 2-minute heart-rate
//! stream is derived from the step count of the slot it falls in. Daily
//! aggregates are taken from the dense data, then one dropout gap per day is
//! applied to both intraday streams.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::core::params::InitParams;
use crate::core::slicer::lower_bound_by_key;
use crate::core::types::{DayRecord, TimedSample};
use crate::synthetic::dropout::{drop_gap, mask_gap, DropoutModel};
use crate::synthetic::markov::MarkovChain;

/// Fifteen-minute slots on a 24 h day.
pub const SLOTS_PER_DAY: usize = 96;

/// Length of one activity slot.
pub const SLOT_MINUTES: i64 = 15;

/// Heart-rate sampling interval.
pub const HEART_RATE_INTERVAL_MINUTES: i64 = 2;

/// Activity level of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityState {
    Sedentary,
    Moderate,
    Vigorous,
}

impl ActivityState {
    pub const ALL: [ActivityState; 3] = [
        ActivityState::Sedentary,
        ActivityState::Moderate,
        ActivityState::Vigorous,
    ];

    pub fn index(&self) -> usize {
        match self {
            ActivityState::Sedentary => 0,
            ActivityState::Moderate => 1,
            ActivityState::Vigorous => 2,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => ActivityState::Sedentary,
            1 => ActivityState::Moderate,
            _ => ActivityState::Vigorous,
        }
    }
}

/// One fifteen-minute activity slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySlot {
    pub start: DateTime<Utc>,
    pub state: ActivityState,
    pub steps: f64,
}

impl ActivitySlot {
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(SLOT_MINUTES)
    }
}

/// Parameters of the activity state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityModel {
    pub chain: MarkovChain<3>,
    /// Poisson mean of steps per slot, indexed by state
    pub step_means: [f64; 3],
    /// Poisson mean of steps per slot while asleep
    pub night_step_mean: f64,
    /// Local hour at which the night starts
    pub night_start_hour: i64,
    /// Local hour at which the night ends
    pub night_end_hour: i64,
}

impl Default for ActivityModel {
    fn default() -> Self {
        Self {
            // Rows: from Sedentary, Moderate, Vigorous.
            chain: MarkovChain::new([
                [0.92, 0.08, 0.00],
                [0.12, 0.80, 0.08],
                [0.05, 0.20, 0.75],
            ]),
            step_means: [20.0, 600.0, 1800.0],
            night_step_mean: 2.0,
            night_start_hour: 23,
            night_end_hour: 6,
        }
    }
}

impl ActivityModel {
    fn is_night(&self, slot: usize) -> bool {
        let hour = slot as i64 * SLOT_MINUTES / 60;
        hour >= self.night_start_hour || hour < self.night_end_hour
    }

    /// Walk the slots of the local day starting at `day_start` and lasting
    /// `day_length`, so consecutive days tile without overlap.
    ///
    /// `state` carries the chain across days.
    pub fn simulate_day<R: Rng + ?Sized>(
        &self,
        day_start: DateTime<Utc>,
        day_length: Duration,
        state: &mut ActivityState,
        rng: &mut R,
    ) -> Vec<ActivitySlot> {
        let slots = (day_length.num_minutes().max(0) / SLOT_MINUTES) as usize;
        (0..slots)
            .map(|slot| {
                let start = day_start + Duration::minutes(slot as i64 * SLOT_MINUTES);
                let mean = if self.is_night(slot) {
                    *state = ActivityState::Sedentary;
                    self.night_step_mean
                } else {
                    *state = ActivityState::from_index(self.chain.step(state.index(), rng));
                    self.step_means[state.index()]
                };
                ActivitySlot {
                    start,
                    state: *state,
                    steps: sample_poisson(mean, rng),
                }
            })
            .collect()
    }
}

fn sample_poisson<R: Rng + ?Sized>(mean: f64, rng: &mut R) -> f64 {
    if mean <= 0.0 {
        return 0.0;
    }
    Poisson::new(mean).map_or(0.0, |poisson| poisson.sample(rng))
}

/// Heart rate derived from co-located step counts.
#[derive(Debug, Clone, PartialEq)]
pub struct HeartRateModel {
    pub resting_bpm: f64,
    /// Extra bpm per step taken in the containing slot
    pub bpm_per_step: f64,
    pub noise_std: f64,
    pub min_bpm: f64,
    pub max_bpm: f64,
}

impl Default for HeartRateModel {
    fn default() -> Self {
        Self {
            resting_bpm: 62.0,
            bpm_per_step: 0.06,
            noise_std: 3.0,
            min_bpm: 38.0,
            max_bpm: 205.0,
        }
    }
}

impl HeartRateModel {
    pub fn with_resting_bpm(mut self, resting_bpm: f64) -> Self {
        self.resting_bpm = resting_bpm;
        self
    }

    /// Heart rate for a slot with `steps` steps, with noise clipped to ±3σ.
    pub fn value<R: Rng + ?Sized>(&self, steps: f64, rng: &mut R) -> f64 {
        let noise = match Normal::new(0.0, self.noise_std) {
            Ok(normal) => normal
                .sample(rng)
                .clamp(-3.0 * self.noise_std, 3.0 * self.noise_std),
            Err(_) => 0.0,
        };
        (self.resting_bpm + self.bpm_per_step * steps + noise)
            .clamp(self.min_bpm, self.max_bpm)
            .round()
    }

    /// Sample every 2 minutes across `slots`.
    pub fn derive<R: Rng + ?Sized>(&self, slots: &[ActivitySlot], rng: &mut R) -> Vec<TimedSample> {
        let (Some(first), Some(last)) = (slots.first(), slots.last()) else {
            return Vec::new();
        };

        let mut samples = Vec::new();
        let mut t = first.start;
        while t < last.end() {
            if let Some(slot) = containing_slot(slots, t) {
                samples.push(TimedSample::new(t, self.value(slot.steps, rng)));
            }
            t += Duration::minutes(HEART_RATE_INTERVAL_MINUTES);
        }
        samples
    }
}

/// The slot whose `[start, end)` window contains `t`.
pub fn containing_slot(slots: &[ActivitySlot], t: DateTime<Utc>) -> Option<&ActivitySlot> {
    let i = lower_bound_by_key(slots, &t, |s| s.start);
    let index = match slots.get(i) {
        Some(slot) if slot.start == t => i,
        _ => i.checked_sub(1)?,
    };
    slots.get(index).filter(|slot| t < slot.end())
}

/// Everything one pass of the activity pipeline produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityDataset {
    /// One sample per slot, gap slots blanked
    pub steps: Vec<TimedSample>,
    /// 2-minute samples, gaps removed behind a sentinel
    pub heart_rate: Vec<TimedSample>,
    /// Aggregates from the dense data
    pub daily: Vec<DayRecord>,
}

/// Markov activity, derived heart rate and dropout, in one seeded pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityPipeline {
    pub activity: ActivityModel,
    pub heart_rate: HeartRateModel,
    pub dropout: DropoutModel,
}

impl ActivityPipeline {
    /// Generate the whole synthetic range of `init`.
    ///
    /// An empty or inverted range yields an empty dataset.
    pub fn run<R: Rng + ?Sized>(&self, init: &InitParams, rng: &mut R) -> ActivityDataset {
        let mut dataset = ActivityDataset::default();
        let mut state = ActivityState::Sedentary;

        for date in init.days() {
            let day_start = init.local_day_start(date);
            let day_length = init.local_day_length(date);
            let slots = self.activity.simulate_day(day_start, day_length, &mut state, rng);
            let mut heart_rate = self.heart_rate.derive(&slots, rng);
            dataset.daily.push(daily_summary(date, &slots, &heart_rate));

            let mut steps: Vec<TimedSample> = slots
                .iter()
                .map(|slot| TimedSample::new(slot.start, slot.steps))
                .collect();
            let gap = self.dropout.draw_gap(day_start, day_length, rng);
            mask_gap(&mut steps, &gap);
            drop_gap(&mut heart_rate, &gap);

            dataset.steps.extend(steps);
            dataset.heart_rate.extend(heart_rate);
        }

        dataset
    }
}

fn daily_summary(
    date: NaiveDate,
    slots: &[ActivitySlot],
    heart_rate: &[TimedSample],
) -> DayRecord {
    let total_steps: f64 = slots.iter().map(|s| s.steps).sum();
    let mut record = DayRecord::new(date).with_metric("steps", total_steps);

    for state in ActivityState::ALL {
        let minutes = slots.iter().filter(|s| s.state == state).count() as i64 * SLOT_MINUTES;
        let name = match state {
            ActivityState::Sedentary => "sedentary_minutes",
            ActivityState::Moderate => "moderate_minutes",
            ActivityState::Vigorous => "vigorous_minutes",
        };
        record = record.with_metric(name, minutes as f64);
    }

    let bpm: Vec<f64> = heart_rate.iter().filter_map(|s| s.reading.value()).collect();
    if !bpm.is_empty() {
        let mean = bpm.iter().mean();
        let std_dev = bpm.iter().std_dev();
        let resting = Data::new(bpm).percentile(5);
        record = record
            .with_metric("mean_heart_rate", mean)
            .with_metric("heart_rate_std_dev", if std_dev.is_nan() { 0.0 } else { std_dev })
            .with_metric("resting_heart_rate", resting);
    }

    record
}
