//! Core library for the diskprov volume provisioner.
//!
//! The crate turns storage claims into remote block disks and tears them
//! down again. [`DiskProvisioner`] drives the lifecycle (validate → create →
//! wait for availability → describe, and ownership check → wait → delete)
//! against any [`DiskClient`]; [`ScalewayDiskClient`] implements that client
//! for Scaleway Block Storage.

pub mod config;
pub mod disk;
pub mod manifest;
pub mod provisioner;
pub mod scaleway;
pub mod test_support;
pub mod volume;

pub use config::{ConfigError, ProvisionerConfig, ScalewayConfig};
pub use disk::{CreateDiskSpec, DiskClient, DiskFuture, DiskId, DiskStatus, WaitError};
pub use manifest::ManifestError;
pub use provisioner::{
    DELETE_TIMEOUT, DiskProvisioner, MIN_CAPACITY_GIB, PROVISION_TIMEOUT, ProvisionerError,
    ProvisionerSettings, RequestError, SUPPORTED_ACCESS_MODES, VolumeProvisioner,
};
pub use scaleway::{ScalewayClientError, ScalewayDiskClient};
pub use volume::{
    AccessMode, MountSource, ReclaimPolicy, VolumeDescriptor, VolumeRequest, VolumeRequestBuilder,
};
