//! Registration record of a device model.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::core::params::InitParams;
use crate::core::types::DataType;
use crate::device::facade::Device;
use crate::device::model::DeviceModel;
use crate::error::DeviceError;
use crate::vendor::{Authenticator, RealFetcher};

/// Immutable description of one `vendor/model` device.
///
/// Capabilities are captured once from the model. Authentication and real
/// fetching are declared here at construction; a device without them can
/// still serve synthetic data.
pub struct DeviceDescriptor {
    key: String,
    capabilities: BTreeSet<DataType>,
    model: Arc<dyn DeviceModel>,
    authenticator: Option<Arc<dyn Authenticator>>,
    fetcher: Option<Arc<dyn RealFetcher>>,
}

impl DeviceDescriptor {
    /// Describe `model` under `key`, which must look like `vendor/model`.
    pub fn new(
        key: impl Into<String>,
        model: impl DeviceModel + 'static,
    ) -> Result<Self, DeviceError> {
        let key = key.into();
        match key.split_once('/') {
            Some((vendor, name))
                if !vendor.is_empty() && !name.is_empty() && !name.contains('/') => {}
            _ => {
                return Err(DeviceError::config(format!(
                    "device key '{key}' is not of the form vendor/model"
                )))
            }
        }

        let capabilities = model.capabilities();
        if capabilities.is_empty() {
            return Err(DeviceError::config(format!(
                "device '{key}' declares no data types"
            )));
        }

        Ok(Self {
            key,
            capabilities,
            model: Arc::new(model),
            authenticator: None,
            fetcher: None,
        })
    }

    pub fn with_authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    pub fn with_fetcher(mut self, fetcher: impl RealFetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn capabilities(&self) -> &BTreeSet<DataType> {
        &self.capabilities
    }

    pub fn model(&self) -> &dyn DeviceModel {
        self.model.as_ref()
    }

    pub fn authenticator(&self) -> Option<&dyn Authenticator> {
        self.authenticator.as_deref()
    }

    pub fn fetcher(&self) -> Option<&dyn RealFetcher> {
        self.fetcher.as_deref()
    }

    pub fn supports_authentication(&self) -> bool {
        self.authenticator.is_some()
    }

    /// Whether an authenticated instance can fetch `data_type` live.
    pub fn supports_real_fetch(&self, data_type: DataType) -> bool {
        self.capabilities.contains(&data_type)
            && self.fetcher.as_ref().is_some_and(|f| f.supports(data_type))
    }

    /// The device's default init map.
    pub fn default_init_params(&self) -> Map<String, Value> {
        self.model.default_init_params()
    }

    /// Build a fresh instance, merging `overrides` over the defaults.
    pub fn construct(
        self: &Arc<Self>,
        overrides: &Map<String, Value>,
    ) -> Result<Device, DeviceError> {
        let init = InitParams::resolve(
            &self.model.default_init_params(),
            overrides,
            self.model.required_init_params(),
        )?;
        Ok(Device::new(Arc::clone(self), init))
    }
}

impl fmt::Debug for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceDescriptor")
            .field("key", &self.key)
            .field("capabilities", &self.capabilities)
            .field("authenticator", &self.authenticator.is_some())
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}
