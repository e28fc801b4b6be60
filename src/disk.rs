//! Contract for the remote disk service.
//!
//! The provisioner only ever talks to storage through [`DiskClient`], so the
//! lifecycle can be exercised against a recording double in tests and against
//! the Scaleway Block Storage API in production.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Future returned by disk client and provisioner operations.
pub type DiskFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Remote identifier of a disk.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DiskId(String);

impl DiskId {
    /// Wraps a provider identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the identifier.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the wrapper.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for DiskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DiskId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for DiskId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DiskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State reported by the remote service for a disk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DiskStatus {
    /// Still being allocated.
    Creating,
    /// Ready for use and not attached to any server.
    Available,
    /// Attached to a server.
    Attached,
    /// Being destroyed.
    Deleting,
    /// Failed on the provider side.
    Error,
    /// Any state this crate does not interpret.
    Unknown(String),
}

impl DiskStatus {
    /// Maps a provider status string onto a [`DiskStatus`].
    #[must_use]
    pub fn from_provider(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "creating" => Self::Creating,
            "available" => Self::Available,
            "in_use" => Self::Attached,
            "deleting" => Self::Deleting,
            "error" => Self::Error,
            _ => Self::Unknown(raw.to_owned()),
        }
    }

    /// Canonical lowercase spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "creating",
            Self::Available => "available",
            Self::Attached => "in_use",
            Self::Deleting => "deleting",
            Self::Error => "error",
            Self::Unknown(raw) => raw.as_str(),
        }
    }
}

impl fmt::Display for DiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for a create-disk call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateDiskSpec {
    /// Region the disk belongs to.
    pub region: String,
    /// Availability zone inside the region.
    pub zone: String,
    /// Provider specific disk category.
    pub category: String,
    /// Size in whole gibibytes.
    pub size_gib: u64,
    /// Human readable disk name.
    pub name: String,
}

/// Errors raised while waiting for a disk to reach a status.
#[derive(Debug, Error)]
pub enum WaitError<E>
where
    E: std::error::Error + 'static,
{
    /// The disk did not reach the wanted status before the deadline.
    #[error("disk {disk_id} did not reach status {status} within {waited:?}")]
    TimedOut {
        /// Disk being polled.
        disk_id: DiskId,
        /// Status that was wanted.
        status: DiskStatus,
        /// Last status observed, if any poll succeeded.
        last_seen: Option<DiskStatus>,
        /// How long the client waited.
        waited: Duration,
    },
    /// A status query itself failed.
    #[error(transparent)]
    Remote(E),
}

/// Capability exposed by the remote disk service.
pub trait DiskClient {
    /// Provider specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates a disk and returns its identifier.
    fn create_disk<'a>(&'a self, spec: &'a CreateDiskSpec) -> DiskFuture<'a, DiskId, Self::Error>;

    /// Destroys a disk.
    fn delete_disk<'a>(&'a self, disk_id: &'a DiskId) -> DiskFuture<'a, (), Self::Error>;

    /// Polls until the disk reports `status` or `timeout` elapses.
    fn wait_for_disk<'a>(
        &'a self,
        region: &'a str,
        disk_id: &'a DiskId,
        status: DiskStatus,
        timeout: Duration,
    ) -> DiskFuture<'a, (), WaitError<Self::Error>>;
}
