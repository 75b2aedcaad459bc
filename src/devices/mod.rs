//! Built-in device models.

pub mod dexcom;
pub mod fitbit;
pub mod oura;

use crate::device::{DeviceDescriptor, DeviceModel, DeviceRegistry};
use crate::error::DeviceError;
use crate::vendor::AccessTokenAuthenticator;

// Re-export commonly used types
pub use dexcom::G7;
pub use fitbit::Charge6;
pub use oura::Ring3;

/// Register every built-in device into `registry`.
///
/// Keys already present are skipped with a warning.
pub fn register_builtin(registry: &mut DeviceRegistry) {
    let builtins = [
        describe(fitbit::KEY, Charge6),
        describe(oura::KEY, Ring3),
        describe(dexcom::KEY, G7),
    ];

    for descriptor in builtins {
        match descriptor.and_then(|d| registry.register(d)) {
            Ok(()) => {}
            Err(e) => tracing::warn!("skipping built-in device: {e}"),
        }
    }
}

fn describe(
    key: &str,
    model: impl DeviceModel + 'static,
) -> Result<DeviceDescriptor, DeviceError> {
    let descriptor =
        DeviceDescriptor::new(key, model)?.with_authenticator(AccessTokenAuthenticator);
    Ok(attach_fetcher(descriptor))
}

#[cfg(not(feature = "http"))]
fn attach_fetcher(descriptor: DeviceDescriptor) -> DeviceDescriptor {
    descriptor
}

#[cfg(feature = "http")]
fn attach_fetcher(descriptor: DeviceDescriptor) -> DeviceDescriptor {
    let Some(config) = http_config(descriptor.key()) else {
        return descriptor;
    };
    match crate::vendor::HttpFetcher::new(config) {
        Ok(fetcher) => descriptor.with_fetcher(fetcher),
        Err(e) => {
            tracing::warn!(device = %descriptor.key(), "live fetch unavailable: {e}");
            descriptor
        }
    }
}

#[cfg(feature = "http")]
fn http_config(key: &str) -> Option<crate::vendor::HttpConfig> {
    use crate::core::types::DataType;
    use crate::vendor::{Endpoint, HttpConfig};

    let config = match key {
        fitbit::KEY => HttpConfig::new("https://api.fitbit.com")
            .with_endpoint(
                DataType::IntradaySteps,
                Endpoint::per_day("/1/user/-/activities/steps/date/{date}/1d/15min.json"),
            )
            .with_endpoint(
                DataType::IntradayHeartRate,
                Endpoint::per_day("/1/user/-/activities/heart/date/{date}/1d/1min.json"),
            )
            .with_endpoint(
                DataType::DailySummary,
                Endpoint::per_day("/1/user/-/activities/date/{date}.json"),
            ),
        oura::KEY => HttpConfig::new("https://api.ouraring.com")
            .with_endpoint(
                DataType::Sleep,
                Endpoint::range("/v2/usercollection/sleep?start_date={start}&end_date={end}"),
            )
            .with_endpoint(
                DataType::Readiness,
                Endpoint::range(
                    "/v2/usercollection/daily_readiness?start_date={start}&end_date={end}",
                ),
            ),
        dexcom::KEY => HttpConfig::new("https://api.dexcom.com").with_endpoint(
            DataType::Glucose,
            Endpoint::range("/v3/users/self/egvs?startDate={start}&endDate={end}"),
        ),
        _ => return None,
    };
    Some(config)
}
