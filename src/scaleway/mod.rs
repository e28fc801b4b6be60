//! Scaleway Block Storage implementation of [`DiskClient`].
//!
//! Disk identifiers carry their zone (`fr-par-1/<uuid>`) because every
//! Block Storage endpoint is zoned while the provisioner only tracks the
//! region. The region passed to a wait must contain that zone.

mod error;
mod types;
mod wait;

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::config::ScalewayConfig;
use crate::disk::{CreateDiskSpec, DiskClient, DiskFuture, DiskId, DiskStatus, WaitError};
use crate::volume::GIB;
use types::{
    CreateVolumeRequest, FromEmpty, ScalewayVolume, VOLUME_TAG, ZonedId, perf_iops,
    provider_message, resolve_zone,
};

pub use error::ScalewayClientError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const BLOCK_API_PATH: &str = "block/v1alpha1";

/// Default delay between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Disk client backed by the Scaleway Block Storage API.
#[derive(Clone, Debug)]
pub struct ScalewayDiskClient {
    http: reqwest::Client,
    api_url: String,
    secret_key: String,
    project_id: String,
    poll_interval: Duration,
}

impl ScalewayDiskClient {
    /// Creates a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScalewayClientError::Config`] when required fields are
    /// missing, or [`ScalewayClientError::Provider`] when the HTTP client
    /// cannot be built.
    pub fn new(config: &ScalewayConfig, poll_interval: Duration) -> Result<Self, ScalewayClientError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| ScalewayClientError::Provider {
                message: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            secret_key: config.secret_key.clone(),
            project_id: config.default_project_id.clone(),
            poll_interval,
        })
    }

    fn volumes_url(&self, zone: &str) -> String {
        format!("{}/{BLOCK_API_PATH}/zones/{zone}/volumes", self.api_url)
    }

    fn volume_url(&self, volume: &ZonedId) -> String {
        format!("{}/{}", self.volumes_url(&volume.zone), volume.id)
    }

    async fn create_volume(&self, spec: &CreateDiskSpec) -> Result<DiskId, ScalewayClientError> {
        let zone = resolve_zone(&spec.region, &spec.zone)?;
        let payload = CreateVolumeRequest {
            name: spec.name.clone(),
            project_id: self.project_id.clone(),
            from_empty: FromEmpty {
                size: spec.size_gib.saturating_mul(GIB),
            },
            perf_iops: perf_iops(&spec.category)?,
            tags: vec![String::from(VOLUME_TAG)],
        };

        debug!(%zone, name = %payload.name, size = payload.from_empty.size, "creating volume");
        let response = self
            .http
            .post(self.volumes_url(&zone))
            .header("X-Auth-Token", &self.secret_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            let volume: ScalewayVolume = serde_json::from_slice(&body)?;
            return Ok(ZonedId {
                zone: volume.zone,
                id: volume.id,
            }
            .to_disk_id());
        }

        Err(ScalewayClientError::CreateFailed {
            name: spec.name.clone(),
            zone,
            message: provider_message(&body),
        })
    }

    pub(in crate::scaleway) async fn fetch_volume(
        &self,
        volume: &ZonedId,
    ) -> Result<Option<DiskStatus>, ScalewayClientError> {
        let response = self
            .http
            .get(self.volume_url(volume))
            .header("X-Auth-Token", &self.secret_key)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ScalewayClientError::Provider {
                message: provider_message(&body),
            });
        }

        let parsed: ScalewayVolume = serde_json::from_slice(&body)?;
        Ok(Some(DiskStatus::from_provider(&parsed.status)))
    }

    async fn delete_volume(&self, disk_id: &DiskId) -> Result<(), ScalewayClientError> {
        let volume = ZonedId::parse(disk_id)?;
        debug!(zone = %volume.zone, id = %volume.id, "deleting volume");
        let response = self
            .http
            .delete(self.volume_url(&volume))
            .header("X-Auth-Token", &self.secret_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.bytes().await?;
        Err(ScalewayClientError::DeleteFailed {
            volume_id: volume.id,
            zone: volume.zone,
            message: provider_message(&body),
        })
    }
}

impl DiskClient for ScalewayDiskClient {
    type Error = ScalewayClientError;

    fn create_disk<'a>(&'a self, spec: &'a CreateDiskSpec) -> DiskFuture<'a, DiskId, Self::Error> {
        Box::pin(self.create_volume(spec))
    }

    fn delete_disk<'a>(&'a self, disk_id: &'a DiskId) -> DiskFuture<'a, (), Self::Error> {
        Box::pin(self.delete_volume(disk_id))
    }

    fn wait_for_disk<'a>(
        &'a self,
        region: &'a str,
        disk_id: &'a DiskId,
        status: DiskStatus,
        timeout: Duration,
    ) -> DiskFuture<'a, (), WaitError<Self::Error>> {
        Box::pin(self.wait_for_status(region, disk_id, status, timeout))
    }
}
