//! Disk-backed volume provisioner.
//!
//! [`DiskProvisioner`] implements the two-method [`VolumeProvisioner`]
//! contract on top of any [`DiskClient`]:
//!
//! * provision: validate → create disk → wait until available → descriptor;
//! * delete: check ownership → wait until available → delete disk.
//!
//! Each call is a sequential pipeline of remote calls and keeps no state
//! between invocations.

mod error;
pub mod ownership;
mod validation;

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::disk::{CreateDiskSpec, DiskClient, DiskFuture, DiskId, DiskStatus, WaitError};
use crate::volume::{MountSource, VolumeDescriptor, VolumeRequest};
use ownership::{MOUNT_DRIVER, MOUNT_OPTION_VOLUME_ID};

pub use error::{ProvisionerError, RequestError};
pub use validation::{MIN_CAPACITY_GIB, SUPPORTED_ACCESS_MODES};

/// Default wait for a new disk to become available.
pub const PROVISION_TIMEOUT: Duration = Duration::from_secs(60);

/// Default wait for a disk to become free before deletion.
pub const DELETE_TIMEOUT: Duration = Duration::from_secs(30);

/// Interface the orchestration framework calls.
pub trait VolumeProvisioner {
    /// Error returned by both operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates the storage asset and returns its descriptor.
    fn provision<'a>(
        &'a self,
        request: &'a VolumeRequest,
    ) -> DiskFuture<'a, VolumeDescriptor, Self::Error>;

    /// Destroys the storage asset behind a descriptor this provisioner created.
    fn delete<'a>(&'a self, volume: &'a VolumeDescriptor) -> DiskFuture<'a, (), Self::Error>;
}

/// Wait budgets applied by [`DiskProvisioner`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProvisionerSettings {
    /// How long to wait for a new disk to become available.
    pub provision_timeout: Duration,
    /// How long to wait for a disk to become free before deleting it.
    pub delete_timeout: Duration,
}

impl Default for ProvisionerSettings {
    fn default() -> Self {
        Self {
            provision_timeout: PROVISION_TIMEOUT,
            delete_timeout: DELETE_TIMEOUT,
        }
    }
}

/// Provisions volumes as remote block disks.
#[derive(Clone, Debug)]
pub struct DiskProvisioner<C> {
    client: C,
    settings: ProvisionerSettings,
}

impl<C> DiskProvisioner<C>
where
    C: DiskClient + Sync,
{
    /// Creates a provisioner around an injected disk client.
    #[must_use]
    pub const fn new(client: C, settings: ProvisionerSettings) -> Self {
        Self { client, settings }
    }

    /// Borrows the disk client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Returns the configured wait budgets.
    #[must_use]
    pub const fn settings(&self) -> ProvisionerSettings {
        self.settings
    }

    #[instrument(skip_all, fields(claim = %request.name))]
    async fn provision_volume(
        &self,
        request: &VolumeRequest,
    ) -> Result<VolumeDescriptor, ProvisionerError<C::Error>> {
        let placement = validation::validate(request).inspect_err(|err| {
            warn!(error = %err, "rejecting volume request");
        })?;

        let spec = CreateDiskSpec {
            region: placement.region,
            zone: placement.zone,
            category: placement.category,
            size_gib: placement.size_gib,
            name: disk_name(request),
        };

        debug!(?spec, "creating disk");
        let disk_id = self.client.create_disk(&spec).await.map_err(|err| {
            error!(error = %err, region = %spec.region, zone = %spec.zone, "failed to create disk");
            ProvisionerError::Create(err)
        })?;

        self.await_available(&spec.region, &disk_id, self.settings.provision_timeout)
            .await?;

        info!(%disk_id, size_gib = spec.size_gib, "disk provisioned");
        Ok(build_descriptor(request, disk_id, spec.size_gib))
    }

    #[instrument(skip_all, fields(volume = %volume.name))]
    async fn delete_volume(
        &self,
        volume: &VolumeDescriptor,
    ) -> Result<(), ProvisionerError<C::Error>> {
        info!("delete called for volume");

        if let Some(reason) = ownership::foreign_volume_reason(volume) {
            return Err(ProvisionerError::Ignored { reason });
        }

        let Some(region) = volume.region() else {
            error!("volume has no region label");
            return Err(ProvisionerError::MissingRegion {
                volume: volume.name.clone(),
            });
        };

        let disk_id = ownership::disk_id_of(volume);
        self.await_available(region, &disk_id, self.settings.delete_timeout)
            .await?;

        self.client.delete_disk(&disk_id).await.map_err(|err| {
            error!(%disk_id, error = %err, "failed to delete disk");
            ProvisionerError::Delete {
                disk_id: disk_id.clone(),
                source: err,
            }
        })?;

        info!(%disk_id, "disk deleted");
        Ok(())
    }

    async fn await_available(
        &self,
        region: &str,
        disk_id: &DiskId,
        timeout: Duration,
    ) -> Result<(), ProvisionerError<C::Error>> {
        self.client
            .wait_for_disk(region, disk_id, DiskStatus::Available, timeout)
            .await
            .map_err(|err| match err {
                WaitError::TimedOut {
                    disk_id: polled,
                    status,
                    last_seen,
                    waited,
                } => {
                    warn!(disk_id = %polled, ?last_seen, ?waited, "disk not available in time");
                    ProvisionerError::TimedOut {
                        disk_id: polled,
                        status,
                        waited,
                    }
                }
                WaitError::Remote(source) => {
                    warn!(%disk_id, error = %source, "disk is not in available status");
                    ProvisionerError::Wait {
                        disk_id: disk_id.clone(),
                        status: DiskStatus::Available,
                        source,
                    }
                }
            })
    }
}

impl<C> VolumeProvisioner for DiskProvisioner<C>
where
    C: DiskClient + Sync,
{
    type Error = ProvisionerError<C::Error>;

    fn provision<'a>(
        &'a self,
        request: &'a VolumeRequest,
    ) -> DiskFuture<'a, VolumeDescriptor, Self::Error> {
        Box::pin(self.provision_volume(request))
    }

    fn delete<'a>(&'a self, volume: &'a VolumeDescriptor) -> DiskFuture<'a, (), Self::Error> {
        Box::pin(self.delete_volume(volume))
    }
}

fn disk_name(request: &VolumeRequest) -> String {
    if request.name.trim().is_empty() {
        format!("diskprov-{}", Uuid::new_v4().simple())
    } else {
        request.name.trim().to_owned()
    }
}

fn build_descriptor(request: &VolumeRequest, disk_id: DiskId, size_gib: u64) -> VolumeDescriptor {
    let mut labels = request.parameters.clone();
    for (key, value) in &request.labels {
        labels
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }

    VolumeDescriptor {
        name: disk_id.to_string(),
        annotations: ownership::annotations_for(&disk_id),
        labels,
        capacity_gib: size_gib,
        access_modes: request.access_modes.clone(),
        reclaim_policy: request.reclaim_policy,
        source: MountSource {
            driver: String::from(MOUNT_DRIVER),
            options: BTreeMap::from([(String::from(MOUNT_OPTION_VOLUME_ID), disk_id.into_inner())]),
            read_only: false,
        },
    }
}
