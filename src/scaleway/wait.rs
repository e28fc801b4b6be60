//! Status polling for Block Storage volumes.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::disk::{DiskId, DiskStatus, WaitError};

use super::types::ZonedId;
use super::{ScalewayClientError, ScalewayDiskClient};

impl ScalewayDiskClient {
    pub(in crate::scaleway) async fn wait_for_status(
        &self,
        region: &str,
        disk_id: &DiskId,
        wanted: DiskStatus,
        timeout: Duration,
    ) -> Result<(), WaitError<ScalewayClientError>> {
        let volume = ZonedId::parse(disk_id).map_err(WaitError::Remote)?;
        volume.ensure_region(region).map_err(WaitError::Remote)?;

        // A budget too large to represent never expires.
        let deadline = Instant::now().checked_add(timeout);
        let mut last_seen = None;

        while deadline.is_none_or(|limit| Instant::now() <= limit) {
            let Some(current) = self.fetch_volume(&volume).await.map_err(WaitError::Remote)? else {
                return Err(WaitError::Remote(ScalewayClientError::DiskNotFound {
                    volume_id: volume.id,
                    zone: volume.zone,
                }));
            };

            if current == wanted {
                return Ok(());
            }
            if current == DiskStatus::Error {
                return Err(WaitError::Remote(ScalewayClientError::DiskFailed {
                    volume_id: volume.id,
                    zone: volume.zone,
                }));
            }

            debug!(%disk_id, status = %current, %wanted, "volume not ready");
            last_seen = Some(current);
            sleep(self.poll_interval).await;
        }

        Err(WaitError::TimedOut {
            disk_id: disk_id.clone(),
            status: wanted,
            last_seen,
            waited: timeout,
        })
    }
}
