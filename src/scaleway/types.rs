//! Wire types and identifier helpers for the Block Storage API.

use serde::{Deserialize, Serialize};

use crate::disk::DiskId;

use super::ScalewayClientError;

/// Tag attached to every volume this crate creates.
pub(super) const VOLUME_TAG: &str = "diskprov";

#[derive(Debug, Serialize)]
pub(super) struct CreateVolumeRequest {
    pub(super) name: String,
    pub(super) project_id: String,
    pub(super) from_empty: FromEmpty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) perf_iops: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(super) tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct FromEmpty {
    pub(super) size: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ScalewayVolume {
    pub(super) id: String,
    pub(super) zone: String,
    pub(super) status: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProviderMessage {
    #[serde(default)]
    pub(super) message: String,
}

/// Extracts the provider's `message` field, falling back to the raw body.
pub(super) fn provider_message(body: &[u8]) -> String {
    serde_json::from_slice::<ProviderMessage>(body)
        .ok()
        .map(|parsed| parsed.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}

/// A volume identifier qualified by its zone.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct ZonedId {
    pub(super) zone: String,
    pub(super) id: String,
}

impl ZonedId {
    pub(super) fn parse(disk_id: &DiskId) -> Result<Self, ScalewayClientError> {
        disk_id
            .as_str()
            .split_once('/')
            .filter(|(zone, id)| !zone.is_empty() && !id.is_empty() && !id.contains('/'))
            .map(|(zone, id)| Self {
                zone: zone.to_owned(),
                id: id.to_owned(),
            })
            .ok_or_else(|| ScalewayClientError::InvalidDiskId {
                disk_id: disk_id.to_string(),
            })
    }

    pub(super) fn to_disk_id(&self) -> DiskId {
        DiskId::new(format!("{}/{}", self.zone, self.id))
    }

    pub(super) fn ensure_region(&self, region: &str) -> Result<(), ScalewayClientError> {
        ensure_zone_in_region(region, &self.zone)
    }
}

/// Region a zone belongs to: `fr-par-1` lies in `fr-par`.
pub(super) fn region_of(zone: &str) -> Option<&str> {
    zone.rsplit_once('-').map(|(region, _)| region)
}

pub(super) fn ensure_zone_in_region(region: &str, zone: &str) -> Result<(), ScalewayClientError> {
    if region_of(zone) == Some(region) {
        return Ok(());
    }
    Err(ScalewayClientError::RegionMismatch {
        region: region.to_owned(),
        zone: zone.to_owned(),
    })
}

/// Resolves the zone for a new disk, defaulting to the region's first zone.
pub(super) fn resolve_zone(region: &str, zone: &str) -> Result<String, ScalewayClientError> {
    if zone.is_empty() {
        return Ok(format!("{region}-1"));
    }
    ensure_zone_in_region(region, zone)?;
    Ok(zone.to_owned())
}

/// Maps a disk category onto the provisioned IOPS tier.
pub(super) fn perf_iops(category: &str) -> Result<Option<u32>, ScalewayClientError> {
    match category {
        "" => Ok(None),
        "sbs_5k" => Ok(Some(5_000)),
        "sbs_15k" => Ok(Some(15_000)),
        other => Err(ScalewayClientError::UnsupportedCategory {
            category: other.to_owned(),
        }),
    }
}
