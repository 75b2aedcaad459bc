//! Synheart Wearables - one facade over wearable vendors, live or synthetic.
//!
//! Every device is addressed by a `vendor/model` key and answers the same
//! `get_data(data_type, params)` call. Until it is authenticated a device
//! serves deterministic synthetic data: a seeded generator fills the whole
//! configured range once, and each request receives a slice of it. After a
//! successful `authenticate` the same call goes to the vendor instead.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      DeviceRegistry                          │
//! │        "fitbit/charge_6"  "oura/ring_3"  "dexcom/g7"          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   get_data   ┌──────────────────────┐       │
//! │  │   Device    │─────────────▶│ authenticated?        │       │
//! │  └─────────────┘              └──────────────────────┘       │
//! │         │ no                              │ yes               │
//! │         ▼                                 ▼                   │
//! │  ┌─────────────┐   ┌─────────┐    ┌─────────────┐            │
//! │  │  Synthetic  │──▶│ Slicer  │    │ RealFetcher │            │
//! │  │ (once/inst) │   │         │    │  (vendor)   │            │
//! │  └─────────────┘   └─────────┘    └─────────────┘            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use serde_json::Map;
//! use synheart_wearables::{DeviceRegistry, RequestParams};
//!
//! let registry = DeviceRegistry::builtin();
//! let device = registry.construct("fitbit/charge_6", &Map::new())?;
//!
//! let week = RequestParams::days(
//!     NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2022, 3, 8).unwrap(),
//! );
//! let steps = device.get_data("intraday_steps", Some(&week))?;
//! # Ok::<(), synheart_wearables::DeviceError>(())
//! ```

pub mod config;
pub mod core;
pub mod device;
pub mod devices;
pub mod error;
pub mod synthetic;
pub mod vendor;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{
    DataSeries, DataType, DayRecord, DeviceData, InitParams, Reading, RequestParams, TimedSample,
};
pub use device::{Device, DeviceDescriptor, DeviceModel, DeviceRegistry};
pub use error::DeviceError;
pub use synthetic::SyntheticStore;
pub use vendor::{AccessTokenAuthenticator, Authenticator, Credentials, RealFetcher, Session};

// HTTP collaborators (when enabled)
#[cfg(feature = "http")]
pub use vendor::{Endpoint, HttpConfig, HttpFetcher, PasswordAuthenticator};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
