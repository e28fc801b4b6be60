//! Request checks performed before any remote call.

use crate::volume::{AccessMode, PARAM_CATEGORY, PARAM_REGION, PARAM_ZONE, VolumeRequest};

use super::error::RequestError;

/// Access modes a single block disk can honour.
pub const SUPPORTED_ACCESS_MODES: &[AccessMode] = &[AccessMode::ReadWriteOnce];

/// Smallest disk, in gibibytes, the provider will allocate.
pub const MIN_CAPACITY_GIB: u64 = 20;

/// Validated placement and sizing for a create-disk call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct Placement {
    pub(super) region: String,
    pub(super) zone: String,
    pub(super) category: String,
    pub(super) size_gib: u64,
}

/// Validates the request in the order callers observe failures: access
/// modes, then capacity, then placement.
pub(super) fn validate(request: &VolumeRequest) -> Result<Placement, RequestError> {
    check_access_modes(&request.access_modes)?;

    let size_gib = request.allocated_gib();
    if size_gib < MIN_CAPACITY_GIB {
        return Err(RequestError::CapacityBelowMinimum {
            requested_gib: size_gib,
            minimum_gib: MIN_CAPACITY_GIB,
        });
    }

    let region = request
        .parameter(PARAM_REGION)
        .ok_or_else(|| RequestError::MissingParameter(PARAM_REGION.to_owned()))?;

    Ok(Placement {
        region: region.to_owned(),
        zone: request.parameter(PARAM_ZONE).unwrap_or_default().to_owned(),
        category: request
            .parameter(PARAM_CATEGORY)
            .unwrap_or_default()
            .to_owned(),
        size_gib,
    })
}

fn check_access_modes(requested: &[AccessMode]) -> Result<(), RequestError> {
    if requested
        .iter()
        .all(|mode| SUPPORTED_ACCESS_MODES.contains(mode))
    {
        return Ok(());
    }
    Err(RequestError::UnsupportedAccessModes {
        requested: requested.to_vec(),
        supported: SUPPORTED_ACCESS_MODES.to_vec(),
    })
}
