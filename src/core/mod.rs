//! Core data model for the Synheart wearables facade.
//!
//! This module contains:
//! - Data-type keys and the series shapes devices return
//! - Init and request parameter resolution
//! - Range slicing over time-keyed and per-day series

pub mod params;
pub mod slicer;
pub mod types;

// Re-export commonly used types
pub use params::{utc_day_start, InitParams, RequestParams};
pub use slicer::{day_offset_range, lower_bound, lower_bound_by_key};
pub use types::{
    DataSeries, DataType, DayRecord, DeviceData, Reading, SeriesShape, TimedSample,
};
