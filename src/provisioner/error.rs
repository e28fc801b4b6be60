//! Error types for the provisioning lifecycle.

use std::time::Duration;

use thiserror::Error;

use crate::disk::{DiskId, DiskStatus};
use crate::volume::AccessMode;

/// Reasons a [`crate::VolumeRequest`] is rejected before any remote call.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RequestError {
    /// The claim asked for a mode the disks cannot offer.
    #[error("invalid access modes: {requested:?}, supported access modes: {supported:?}")]
    UnsupportedAccessModes {
        /// Modes present on the request.
        requested: Vec<AccessMode>,
        /// Modes this provisioner supports.
        supported: Vec<AccessMode>,
    },
    /// The rounded capacity is below the provider minimum.
    #[error("volume size should be at least {minimum_gib}Gi, got {requested_gib}Gi")]
    CapacityBelowMinimum {
        /// Capacity after rounding up to whole gibibytes.
        requested_gib: u64,
        /// Smallest disk the provider will create.
        minimum_gib: u64,
    },
    /// A required placement parameter is missing or blank.
    #[error("missing placement parameter '{0}'")]
    MissingParameter(String),
}

/// Errors returned by [`crate::VolumeProvisioner`] operations.
#[derive(Debug, Error)]
pub enum ProvisionerError<E>
where
    E: std::error::Error + 'static,
{
    /// The request failed validation; nothing was created.
    #[error("invalid volume request: {0}")]
    InvalidRequest(#[from] RequestError),
    /// The create-disk call failed.
    #[error("failed to create disk: {0}")]
    Create(#[source] E),
    /// A status query failed while waiting on the disk.
    #[error("failed waiting for disk {disk_id} to become {status}: {source}")]
    Wait {
        /// Disk being waited on.
        disk_id: DiskId,
        /// Status that was wanted.
        status: DiskStatus,
        /// Provider error.
        #[source]
        source: E,
    },
    /// The disk did not reach the wanted status in time.
    #[error("timed out after {waited:?} waiting for disk {disk_id} to become {status}")]
    TimedOut {
        /// Disk being waited on.
        disk_id: DiskId,
        /// Status that was wanted.
        status: DiskStatus,
        /// Time spent waiting.
        waited: Duration,
    },
    /// The delete-disk call failed.
    #[error("failed to delete disk {disk_id}: {source}")]
    Delete {
        /// Disk that could not be deleted.
        disk_id: DiskId,
        /// Provider error.
        #[source]
        source: E,
    },
    /// The volume was not created by this provisioner; callers skip it.
    #[error("{reason}")]
    Ignored {
        /// Why the volume was skipped.
        reason: String,
    },
    /// The descriptor lacks the region needed to check the disk is free.
    #[error("volume {volume} has no region label; refusing to delete a disk that may be attached")]
    MissingRegion {
        /// Name of the offending volume.
        volume: String,
    },
}

impl<E> ProvisionerError<E>
where
    E: std::error::Error + 'static,
{
    /// Whether the caller should silently skip instead of retrying.
    #[must_use]
    pub const fn is_ignorable(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }

    /// Whether the failure was a wait deadline.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Disk created before the failure, if any, so callers can clean it up.
    #[must_use]
    pub const fn disk_id(&self) -> Option<&DiskId> {
        match self {
            Self::Wait { disk_id, .. }
            | Self::TimedOut { disk_id, .. }
            | Self::Delete { disk_id, .. } => Some(disk_id),
            Self::InvalidRequest(_)
            | Self::Create(_)
            | Self::Ignored { .. }
            | Self::MissingRegion { .. } => None,
        }
    }
}
