//! Registry of known devices, keyed by `vendor/model`.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::device::descriptor::DeviceDescriptor;
use crate::device::facade::Device;
use crate::error::DeviceError;

/// Maps `vendor/model` keys to their descriptors.
///
/// The registry is an ordinary value. Build one with [`DeviceRegistry::builtin`]
/// or start empty and [`register`](DeviceRegistry::register) your own.
#[derive(Debug, Default, Clone)]
pub struct DeviceRegistry {
    devices: BTreeMap<String, Arc<DeviceDescriptor>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in device.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::devices::register_builtin(&mut registry);
        registry
    }

    /// Add `descriptor`. A key may only be registered once.
    pub fn register(&mut self, descriptor: DeviceDescriptor) -> Result<(), DeviceError> {
        let key = descriptor.key().to_string();
        if self.devices.contains_key(&key) {
            return Err(DeviceError::config(format!(
                "device '{key}' is already registered"
            )));
        }
        tracing::debug!(device = %key, "registered device");
        self.devices.insert(key, Arc::new(descriptor));
        Ok(())
    }

    pub fn lookup(&self, key: &str) -> Result<&Arc<DeviceDescriptor>, DeviceError> {
        self.devices
            .get(key)
            .ok_or_else(|| DeviceError::NotFound(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.devices.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn all_keys(&self) -> Vec<&str> {
        self.devices.keys().map(String::as_str).collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<DeviceDescriptor>> {
        self.devices.values()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Look up `key` and construct an instance with `overrides` applied.
    pub fn construct(
        &self,
        key: &str,
        overrides: &Map<String, Value>,
    ) -> Result<Device, DeviceError> {
        self.lookup(key)?.construct(overrides)
    }
}
