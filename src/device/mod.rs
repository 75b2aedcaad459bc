//! Device facade, model trait and registry.
//!
//! This module contains:
//! - The [`DeviceModel`] trait implemented per `vendor/model`
//! - [`DeviceDescriptor`], a model plus its optional vendor collaborators
//! - [`Device`], one instance serving synthetic or live data
//! - [`DeviceRegistry`], the key-to-descriptor map

pub mod descriptor;
pub mod facade;
pub mod model;
pub mod registry;

// Re-export commonly used types
pub use descriptor::DeviceDescriptor;
pub use facade::Device;
pub use model::DeviceModel;
pub use registry::DeviceRegistry;
