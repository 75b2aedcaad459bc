//! The device facade.
//!
//! A [`Device`] answers `get_data` from one of two places: the vendor, once
//! `authenticate` has succeeded, or its own synthetic store otherwise. The
//! store is generated lazily, in a single pass over the whole init range,
//! and never regenerated; each request gets a slice of it.

use serde_json::Map;
use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::params::{InitParams, RequestParams};
use crate::core::types::{DataSeries, DataType, DeviceData};
use crate::device::descriptor::DeviceDescriptor;
use crate::error::DeviceError;
use crate::synthetic::SyntheticStore;
use crate::vendor::{Credentials, Session};

/// One configured handle on a `vendor/model` data source.
pub struct Device {
    id: Uuid,
    descriptor: Arc<DeviceDescriptor>,
    init: InitParams,
    /// Present once authenticated; replaced but never cleared
    session: Option<Session>,
    synthetic: OnceCell<SyntheticStore>,
}

impl Device {
    pub(crate) fn new(descriptor: Arc<DeviceDescriptor>, init: InitParams) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(device = %descriptor.key(), %id, seed = init.seed, "device constructed");
        Self {
            id,
            descriptor,
            init,
            session: None,
            synthetic: OnceCell::new(),
        }
    }

    /// Construct with default init params.
    pub fn with_defaults(descriptor: &Arc<DeviceDescriptor>) -> Result<Self, DeviceError> {
        descriptor.construct(&Map::new())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn key(&self) -> &str {
        self.descriptor.key()
    }

    pub fn capabilities(&self) -> &BTreeSet<DataType> {
        self.descriptor.capabilities()
    }

    pub fn init_params(&self) -> &InitParams {
        &self.init
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn synthetic_has_been_generated(&self) -> bool {
        self.synthetic.get().is_some()
    }

    /// The full-range store, if it has been generated.
    pub fn synthetic_store(&self) -> Option<&SyntheticStore> {
        self.synthetic.get()
    }

    /// Request parameters used when `get_data` is called without any.
    pub fn default_params(&self) -> RequestParams {
        self.descriptor.model().default_params(&self.init)
    }

    /// Fetch `data_type` by its string key.
    pub fn get_data(
        &self,
        data_type: &str,
        params: Option<&RequestParams>,
    ) -> Result<DeviceData, DeviceError> {
        self.get(data_type.parse()?, params)
    }

    /// Fetch `data_type`, live when authenticated, synthetic otherwise.
    pub fn get(
        &self,
        data_type: DataType,
        params: Option<&RequestParams>,
    ) -> Result<DeviceData, DeviceError> {
        if !self.capabilities().contains(&data_type) {
            return Err(DeviceError::config(format!(
                "{} does not support {data_type}",
                self.key()
            )));
        }

        let defaults;
        let params = match params {
            Some(params) => params,
            None => {
                defaults = self.default_params();
                &defaults
            }
        };

        match &self.session {
            Some(session) => self.fetch_real(data_type, params, session),
            None => Ok(DeviceData::Synthetic(self.slice_synthetic(data_type, params))),
        }
    }

    fn fetch_real(
        &self,
        data_type: DataType,
        params: &RequestParams,
        session: &Session,
    ) -> Result<DeviceData, DeviceError> {
        let fetcher = match self.descriptor.fetcher() {
            Some(fetcher) if fetcher.supports(data_type) => fetcher,
            _ => {
                return Err(DeviceError::UnsupportedOperation(format!(
                    "{} has no live fetch for {data_type}",
                    self.key()
                )))
            }
        };

        fetcher
            .fetch(data_type, params, session)
            .map(DeviceData::Vendor)
            .map_err(|e| {
                tracing::warn!(
                    device = %self.key(),
                    id = %self.id,
                    %data_type,
                    "live fetch failed: {e}"
                );
                e
            })
    }

    fn slice_synthetic(&self, data_type: DataType, params: &RequestParams) -> DataSeries {
        let store = self.synthetic.get_or_init(|| {
            let store = self.descriptor.model().generate_synthetic(&self.init);
            tracing::debug!(
                device = %self.key(),
                id = %self.id,
                days = self.init.num_days(),
                series = store.len(),
                "synthetic store generated"
            );
            store
        });

        let sliced = match store.get(&data_type) {
            Some(series) => self
                .descriptor
                .model()
                .filter_synthetic(series, data_type, params),
            None => DataSeries::empty(data_type.shape()),
        };
        tracing::debug!(
            device = %self.key(),
            %data_type,
            start = %params.start,
            end = %params.end,
            len = sliced.len(),
            "sliced synthetic series"
        );
        sliced
    }

    /// Run the vendor handshake and switch this instance to live data.
    ///
    /// Success is permanent. Calling again re-runs the handshake; a later
    /// success replaces the session, a later failure keeps the old one.
    pub fn authenticate(&mut self, credentials: &Credentials) -> Result<(), DeviceError> {
        let authenticator = self.descriptor.authenticator().ok_or_else(|| {
            DeviceError::UnsupportedOperation(format!("{} has no authentication", self.key()))
        })?;

        let session = authenticator.authenticate(credentials)?;
        tracing::info!(device = %self.key(), id = %self.id, "authenticated");
        self.session = Some(session);
        Ok(())
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("key", &self.key())
            .field("authenticated", &self.is_authenticated())
            .field("synthetic_has_been_generated", &self.synthetic_has_been_generated())
            .finish()
    }
}
