//! Shared fixtures for provisioner BDD scenarios.

use diskprov::test_support::RecordingDiskClient;
use diskprov::{AccessMode, VolumeDescriptor, VolumeRequest};
use rstest::fixture;
use thiserror::Error;

pub const DISK_ID: &str = "fr-par-1/vol-123";
pub const REGION: &str = "fr-par";

#[derive(Clone, Debug)]
pub struct ProvisionerContext {
    pub client: RecordingDiskClient,
    pub request: VolumeRequest,
    pub volume: Option<VolumeDescriptor>,
    pub outcome: Option<LifecycleResult>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    InvalidRequest,
    Create,
    Wait,
    Timeout,
    Delete,
    Ignored,
    MissingRegion,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LifecycleFailure {
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Clone, Debug)]
pub enum LifecycleResult {
    Success(Option<VolumeDescriptor>),
    Failure(LifecycleFailure),
}

#[derive(Clone, Debug, Error)]
pub enum ProvisionerTestError {
    #[error("invalid provisioner fixture: {0}")]
    Fixture(String),
}

#[fixture]
pub fn provisioner_context_result() -> Result<ProvisionerContext, ProvisionerTestError> {
    build_provisioner_context()
}

#[fixture]
pub fn provisioner_context(
    provisioner_context_result: Result<ProvisionerContext, ProvisionerTestError>,
) -> ProvisionerContext {
    provisioner_context_result
        .unwrap_or_else(|err| panic!("provisioner context fixture should initialise: {err}"))
}

fn build_provisioner_context() -> Result<ProvisionerContext, ProvisionerTestError> {
    let request = VolumeRequest::builder()
        .name("claim-a")
        .access_mode(AccessMode::ReadWriteOnce)
        .region(REGION)
        .zone("fr-par-1")
        .category("sbs_5k")
        .build();
    if request.parameter("region") != Some(REGION) {
        return Err(ProvisionerTestError::Fixture(String::from(
            "request builder dropped the region",
        )));
    }

    Ok(ProvisionerContext {
        client: RecordingDiskClient::new(DISK_ID),
        request,
        volume: None,
        outcome: None,
    })
}
