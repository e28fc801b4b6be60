//! Volume requests and descriptors exchanged with the orchestrator.
//!
//! A [`VolumeRequest`] is what a caller asks for; a [`VolumeDescriptor`] is
//! what the provisioner hands back once the remote disk is usable. Both are
//! serialisable so the CLI can read and write them as JSON manifests.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Allocation granularity for remote disks (one gibibyte).
pub const GIB: u64 = 1024 * 1024 * 1024;

/// Placement parameter naming the region the disk lives in.
pub const PARAM_REGION: &str = "region";

/// Placement parameter naming the availability zone.
pub const PARAM_ZONE: &str = "zone";

/// Placement parameter naming the disk category.
pub const PARAM_CATEGORY: &str = "type";

/// How a volume may be mounted by workloads.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum AccessMode {
    /// Read-write by a single node.
    ReadWriteOnce,
    /// Read-only by many nodes.
    ReadOnlyMany,
    /// Read-write by many nodes.
    ReadWriteMany,
    /// Read-write by a single pod.
    ReadWriteOncePod,
}

impl AccessMode {
    /// Returns the orchestrator's spelling of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadWriteOnce => "ReadWriteOnce",
            Self::ReadOnlyMany => "ReadOnlyMany",
            Self::ReadWriteMany => "ReadWriteMany",
            Self::ReadWriteOncePod => "ReadWriteOncePod",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the orchestrator does with the volume once its claim is released.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum ReclaimPolicy {
    /// Destroy the backing disk.
    #[default]
    Delete,
    /// Keep the backing disk for manual recovery.
    Retain,
    /// Scrub and reuse the volume.
    Recycle,
}

/// Caller supplied description of the storage to provision.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct VolumeRequest {
    /// Claim name, forwarded to the remote service as the disk name.
    #[serde(default)]
    pub name: String,
    /// Requested capacity in bytes, before rounding.
    pub capacity_bytes: u64,
    /// Access modes requested by the claim.
    #[serde(default)]
    pub access_modes: Vec<AccessMode>,
    /// Placement parameters (`region`, `zone`, `type`) plus any extras.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Free-form labels to carry onto the descriptor.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Reclaim policy to record on the descriptor.
    #[serde(default)]
    pub reclaim_policy: ReclaimPolicy,
}

impl VolumeRequest {
    /// Starts a builder for a [`VolumeRequest`].
    #[must_use]
    pub fn builder() -> VolumeRequestBuilder {
        VolumeRequestBuilder::new()
    }

    /// Returns a trimmed, non-empty placement parameter.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Capacity rounded up to whole gibibytes.
    #[must_use]
    pub const fn allocated_gib(&self) -> u64 {
        self.capacity_bytes.div_ceil(GIB)
    }
}

/// Builder for [`VolumeRequest`] that trims string inputs.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VolumeRequestBuilder {
    request: VolumeRequest,
}

impl VolumeRequestBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the claim name.
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.request.name = value.into().trim().to_owned();
        self
    }

    /// Sets the requested capacity in bytes.
    #[must_use]
    pub const fn capacity_bytes(mut self, value: u64) -> Self {
        self.request.capacity_bytes = value;
        self
    }

    /// Sets the requested capacity in whole gibibytes, saturating on overflow.
    #[must_use]
    pub const fn capacity_gib(mut self, value: u64) -> Self {
        self.request.capacity_bytes = value.saturating_mul(GIB);
        self
    }

    /// Adds a requested access mode.
    #[must_use]
    pub fn access_mode(mut self, mode: AccessMode) -> Self {
        self.request.access_modes.push(mode);
        self
    }

    /// Sets a placement parameter.
    #[must_use]
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .parameters
            .insert(key.into().trim().to_owned(), value.into().trim().to_owned());
        self
    }

    /// Sets the `region` placement parameter.
    #[must_use]
    pub fn region(self, value: impl Into<String>) -> Self {
        self.parameter(PARAM_REGION, value)
    }

    /// Sets the `zone` placement parameter.
    #[must_use]
    pub fn zone(self, value: impl Into<String>) -> Self {
        self.parameter(PARAM_ZONE, value)
    }

    /// Sets the disk category placement parameter.
    #[must_use]
    pub fn category(self, value: impl Into<String>) -> Self {
        self.parameter(PARAM_CATEGORY, value)
    }

    /// Adds a free-form label.
    #[must_use]
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .labels
            .insert(key.into().trim().to_owned(), value.into().trim().to_owned());
        self
    }

    /// Sets the reclaim policy.
    #[must_use]
    pub const fn reclaim_policy(mut self, policy: ReclaimPolicy) -> Self {
        self.request.reclaim_policy = policy;
        self
    }

    /// Finishes the request. Semantic validation happens at provision time.
    #[must_use]
    pub fn build(self) -> VolumeRequest {
        self.request
    }
}

/// How a node mounts the provisioned disk.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MountSource {
    /// Mount driver identifier (`vendor/driver`).
    pub driver: String,
    /// Driver options; carries the remote volume identifier.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    /// Whether the volume is mounted read-only.
    #[serde(default)]
    pub read_only: bool,
}

/// Volume handed back to the orchestrator once provisioning succeeds.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct VolumeDescriptor {
    /// Externally visible name; equal to the remote disk identifier.
    pub name: String,
    /// Metadata read by other components, including the ownership marker.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Copy of the request's placement parameters and labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Allocated capacity in gibibytes.
    pub capacity_gib: u64,
    /// Access modes granted.
    #[serde(default)]
    pub access_modes: Vec<AccessMode>,
    /// Reclaim policy copied from the request.
    #[serde(default)]
    pub reclaim_policy: ReclaimPolicy,
    /// Mount reference for the disk.
    pub source: MountSource,
}

impl VolumeDescriptor {
    /// Returns the region label used to gate deletion, if present.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.labels
            .get(PARAM_REGION)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Allocated capacity rendered as an orchestrator quantity (`25Gi`).
    #[must_use]
    pub fn capacity_quantity(&self) -> String {
        format!("{}Gi", self.capacity_gib)
    }
}
