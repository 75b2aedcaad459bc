//! The per-device model trait.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::core::params::{InitParams, RequestParams};
use crate::core::types::{DataSeries, DataType};
use crate::synthetic::SyntheticStore;

/// What a device model must provide, plus the hooks it may override.
///
/// Real-data access is not part of this trait: it is attached to the
/// [`DeviceDescriptor`](crate::device::DeviceDescriptor) as optional
/// collaborators so that a device without it is visible at registration.
pub trait DeviceModel: Send + Sync {
    /// The data types this device serves. Must be non-empty.
    fn capabilities(&self) -> BTreeSet<DataType>;

    /// Every init key this device accepts, with its default value.
    ///
    /// A `null` default marks a key the caller must always supply.
    fn default_init_params(&self) -> Map<String, Value>;

    /// Vendor keys that must be non-null after defaults are applied.
    fn required_init_params(&self) -> &[&'static str] {
        &[]
    }

    /// Request parameters used when a caller supplies none.
    fn default_params(&self, init: &InitParams) -> RequestParams {
        RequestParams::full_range(init)
    }

    /// Generate every declared data type over the full synthetic range.
    ///
    /// Called at most once per device instance. Must be deterministic in
    /// `init` and must not fail; a degenerate range yields empty series.
    fn generate_synthetic(&self, init: &InitParams) -> SyntheticStore;

    /// Narrow a full-range series to the request.
    fn filter_synthetic(
        &self,
        series: &DataSeries,
        _data_type: DataType,
        params: &RequestParams,
    ) -> DataSeries {
        series.slice(params.start, params.end)
    }
}
