//! Error types for the Scaleway disk client.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised by [`super::ScalewayDiskClient`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ScalewayClientError {
    /// Raised when the high-level configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
    /// Wrapper for transport and decoding failures.
    #[error("provider error: {message}")]
    Provider {
        /// Message from the HTTP client or decoder.
        message: String,
    },
    /// Raised when a disk identifier is not `<zone>/<volume>`.
    #[error("disk id {disk_id:?} is not of the form <zone>/<volume>")]
    InvalidDiskId {
        /// Identifier as received.
        disk_id: String,
    },
    /// Raised when a zone lies outside the requested region.
    #[error("zone {zone} does not belong to region {region}")]
    RegionMismatch {
        /// Region passed by the caller.
        region: String,
        /// Zone derived from the request or disk identifier.
        zone: String,
    },
    /// Raised when the disk category has no Block Storage equivalent.
    #[error("unsupported disk category {category:?}")]
    UnsupportedCategory {
        /// Category passed by the caller.
        category: String,
    },
    /// Raised when the volume does not exist or is not accessible.
    #[error("volume {volume_id} not found in zone {zone}")]
    DiskNotFound {
        /// Volume identifier that was not found.
        volume_id: String,
        /// Zone where lookup was attempted.
        zone: String,
    },
    /// Raised when the provider reports the volume in error state.
    #[error("volume {volume_id} in zone {zone} entered error state")]
    DiskFailed {
        /// Volume identifier.
        volume_id: String,
        /// Zone of the volume.
        zone: String,
    },
    /// Raised when a volume cannot be created.
    #[error("failed to create volume {name} in zone {zone}: {message}")]
    CreateFailed {
        /// Volume name requested.
        name: String,
        /// Zone where creation was attempted.
        zone: String,
        /// Error message from the provider.
        message: String,
    },
    /// Raised when a volume cannot be deleted.
    #[error("failed to delete volume {volume_id} in zone {zone}: {message}")]
    DeleteFailed {
        /// Volume identifier.
        volume_id: String,
        /// Zone of the volume.
        zone: String,
        /// Error message from the provider.
        message: String,
    },
}

impl From<ConfigError> for ScalewayClientError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}

impl From<reqwest::Error> for ScalewayClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Provider {
            message: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for ScalewayClientError {
    fn from(value: serde_json::Error) -> Self {
        Self::Provider {
            message: value.to_string(),
        }
    }
}
