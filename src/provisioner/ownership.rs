//! Ownership marker stamped on every descriptor this provisioner creates.
//!
//! Deletion is gated on the marker so volumes created by hand or by another
//! provisioner are never destroyed here.

use std::collections::BTreeMap;

use crate::disk::DiskId;
use crate::volume::VolumeDescriptor;

/// Annotation key carrying the creator identity.
pub const ANN_CREATED_BY: &str = "kubernetes.io/createdby";

/// Creator identity written under [`ANN_CREATED_BY`].
pub const CREATED_BY: &str = "diskprov-provisioner";

/// Annotation key carrying the remote disk identifier.
pub const ANN_VOLUME_ID: &str = "diskprov.external-storage.io/VolumeID";

/// Mount driver identifier placed in the descriptor's source.
pub const MOUNT_DRIVER: &str = "diskprov/disk";

/// Driver option naming the remote disk.
pub const MOUNT_OPTION_VOLUME_ID: &str = "volumeId";

/// Builds the annotations for a freshly created disk.
pub(super) fn annotations_for(disk_id: &DiskId) -> BTreeMap<String, String> {
    BTreeMap::from([
        (String::from(ANN_CREATED_BY), String::from(CREATED_BY)),
        (String::from(ANN_VOLUME_ID), disk_id.to_string()),
    ])
}

/// Whether the descriptor carries this provisioner's marker, verbatim.
#[must_use]
pub fn provisioned_by_us(volume: &VolumeDescriptor) -> bool {
    volume
        .annotations
        .get(ANN_CREATED_BY)
        .is_some_and(|creator| creator == CREATED_BY)
}

/// Reason for skipping a descriptor this provisioner did not create.
///
/// Returns `None` when the marker is present and deletion may proceed.
#[must_use]
pub fn foreign_volume_reason(volume: &VolumeDescriptor) -> Option<String> {
    (!provisioned_by_us(volume)).then(|| {
        format!(
            "this provisioner {CREATED_BY} didn't provision volume {:?} and so can't delete it",
            volume.name
        )
    })
}

/// Remote identifier recorded on the descriptor, falling back to its name.
#[must_use]
pub fn disk_id_of(volume: &VolumeDescriptor) -> DiskId {
    volume
        .annotations
        .get(ANN_VOLUME_ID)
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map_or_else(|| DiskId::from(volume.name.as_str()), DiskId::from)
}
