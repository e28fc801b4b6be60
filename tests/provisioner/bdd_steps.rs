//! BDD step definitions for the provisioner lifecycle.

use diskprov::provisioner::ownership;
use diskprov::test_support::{StubDiskError, foreign_descriptor, owned_descriptor};
use diskprov::volume::{GIB, PARAM_REGION};
use diskprov::{
    AccessMode, DiskProvisioner, ProvisionerError, ProvisionerSettings, VolumeProvisioner,
};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Runtime;

use super::test_helpers::{
    DISK_ID, FailureKind, LifecycleFailure, LifecycleResult, ProvisionerContext,
    ProvisionerTestError, REGION,
};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Setup(#[from] ProvisionerTestError),
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a provisioner backed by a recording disk client")]
fn ready_provisioner(provisioner_context: ProvisionerContext) -> ProvisionerContext {
    provisioner_context
}

#[given("a request for \"{size}\" GiB")]
fn request_gib(mut provisioner_context: ProvisionerContext, size: u64) -> ProvisionerContext {
    provisioner_context.request.capacity_bytes = size * GIB;
    provisioner_context
}

#[given("a request for \"{bytes}\" bytes")]
fn request_bytes(mut provisioner_context: ProvisionerContext, bytes: u64) -> ProvisionerContext {
    provisioner_context.request.capacity_bytes = bytes;
    provisioner_context
}

#[given("the request asks for access mode \"{mode}\"")]
fn request_mode(
    mut provisioner_context: ProvisionerContext,
    mode: String,
) -> Result<ProvisionerContext, StepError> {
    let parsed = parse_access_mode(&mode)?;
    provisioner_context.request.access_modes.push(parsed);
    Ok(provisioner_context)
}

#[given("the request has no region")]
fn request_without_region(mut provisioner_context: ProvisionerContext) -> ProvisionerContext {
    provisioner_context.request.parameters.remove(PARAM_REGION);
    provisioner_context
}

#[given("disk creation fails")]
fn creation_fails(provisioner_context: ProvisionerContext) -> ProvisionerContext {
    provisioner_context.client.fail_create();
    provisioner_context
}

#[given("the disk never becomes available")]
fn never_available(provisioner_context: ProvisionerContext) -> ProvisionerContext {
    provisioner_context.client.time_out_wait();
    provisioner_context
}

#[given("disk deletion fails")]
fn deletion_fails(provisioner_context: ProvisionerContext) -> ProvisionerContext {
    provisioner_context.client.fail_delete();
    provisioner_context
}

#[given("an existing volume created by this provisioner")]
fn owned_volume(mut provisioner_context: ProvisionerContext) -> ProvisionerContext {
    provisioner_context.volume = Some(owned_descriptor(DISK_ID, Some(REGION)));
    provisioner_context
}

#[given("an existing volume created by another provisioner")]
fn foreign_volume(mut provisioner_context: ProvisionerContext) -> ProvisionerContext {
    provisioner_context.volume = Some(foreign_descriptor(DISK_ID, Some(REGION)));
    provisioner_context
}

#[given("the volume has no region label")]
fn volume_without_region(mut provisioner_context: ProvisionerContext) -> ProvisionerContext {
    if let Some(volume) = provisioner_context.volume.as_mut() {
        volume.labels.remove(PARAM_REGION);
    }
    provisioner_context
}

#[when("I provision the volume")]
fn provision_volume(provisioner_context: ProvisionerContext) -> Result<ProvisionerContext, StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let provisioner =
        DiskProvisioner::new(provisioner_context.client.clone(), ProvisionerSettings::default());
    let request = provisioner_context.request.clone();

    let result = runtime.block_on(async move { provisioner.provision(&request).await });
    let outcome = match result {
        Ok(descriptor) => LifecycleResult::Success(Some(descriptor)),
        Err(err) => LifecycleResult::Failure(failure_from(&err)),
    };

    Ok(ProvisionerContext {
        outcome: Some(outcome),
        ..provisioner_context
    })
}

#[when("I delete the volume")]
fn delete_volume(provisioner_context: ProvisionerContext) -> Result<ProvisionerContext, StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let volume = provisioner_context
        .volume
        .clone()
        .ok_or_else(|| StepError::Assertion(String::from("no volume to delete")))?;
    let provisioner =
        DiskProvisioner::new(provisioner_context.client.clone(), ProvisionerSettings::default());

    let result = runtime.block_on(async move { provisioner.delete(&volume).await });
    let outcome = match result {
        Ok(()) => LifecycleResult::Success(None),
        Err(err) => LifecycleResult::Failure(failure_from(&err)),
    };

    Ok(ProvisionerContext {
        outcome: Some(outcome),
        ..provisioner_context
    })
}

#[then("the lifecycle succeeds")]
fn lifecycle_succeeds(provisioner_context: &ProvisionerContext) -> Result<(), StepError> {
    match provisioner_context.outcome {
        Some(LifecycleResult::Success(_)) => Ok(()),
        Some(LifecycleResult::Failure(ref failure)) => Err(StepError::Assertion(format!(
            "expected success, got failure: {}",
            failure.message
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}

#[then("the lifecycle error kind is \"{kind}\"")]
fn lifecycle_error_kind(
    provisioner_context: &ProvisionerContext,
    kind: String,
) -> Result<(), StepError> {
    let expected = parse_failure_kind(&kind)?;
    let Some(LifecycleResult::Failure(failure)) = &provisioner_context.outcome else {
        return Err(StepError::Assertion(String::from(
            "expected failure outcome",
        )));
    };
    if failure.kind == expected {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected failure kind {expected:?}, got {:?}: {}",
            failure.kind, failure.message
        )))
    }
}

#[then("the descriptor capacity is \"{quantity}\"")]
fn descriptor_capacity(
    provisioner_context: &ProvisionerContext,
    quantity: String,
) -> Result<(), StepError> {
    let descriptor = provisioned_descriptor(provisioner_context)?;
    let actual = descriptor.capacity_quantity();
    if actual == quantity {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected capacity {quantity}, got {actual}"
        )))
    }
}

#[then("the descriptor is marked as provisioned by this provisioner")]
fn descriptor_marked(provisioner_context: &ProvisionerContext) -> Result<(), StepError> {
    let descriptor = provisioned_descriptor(provisioner_context)?;
    if !ownership::provisioned_by_us(descriptor) {
        return Err(StepError::Assertion(String::from(
            "descriptor should carry the creator annotation",
        )));
    }
    if ownership::disk_id_of(descriptor).as_str() != DISK_ID {
        return Err(StepError::Assertion(format!(
            "descriptor should reference {DISK_ID}"
        )));
    }
    Ok(())
}

#[then("the disk client saw \"{operations}\"")]
fn client_saw(provisioner_context: &ProvisionerContext, operations: String) -> Result<(), StepError> {
    let expected: Vec<&str> = operations.split(',').map(str::trim).collect();
    let actual = provisioner_context.client.operations();
    if actual == expected {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected operations {expected:?}, got {actual:?}"
        )))
    }
}

#[then("no remote calls are made")]
fn no_remote_calls(provisioner_context: &ProvisionerContext) -> Result<(), StepError> {
    let calls = provisioner_context.client.calls();
    if calls.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected no remote calls, got {calls:?}"
        )))
    }
}

fn provisioned_descriptor(
    provisioner_context: &ProvisionerContext,
) -> Result<&diskprov::VolumeDescriptor, StepError> {
    match &provisioner_context.outcome {
        Some(LifecycleResult::Success(Some(descriptor))) => Ok(descriptor),
        other => Err(StepError::Assertion(format!(
            "expected a provisioned descriptor, got {other:?}"
        ))),
    }
}

fn failure_from(err: &ProvisionerError<StubDiskError>) -> LifecycleFailure {
    LifecycleFailure {
        kind: map_failure_kind(err),
        message: err.to_string(),
    }
}

const fn map_failure_kind(err: &ProvisionerError<StubDiskError>) -> FailureKind {
    match err {
        ProvisionerError::InvalidRequest(_) => FailureKind::InvalidRequest,
        ProvisionerError::Create(_) => FailureKind::Create,
        ProvisionerError::Wait { .. } => FailureKind::Wait,
        ProvisionerError::TimedOut { .. } => FailureKind::Timeout,
        ProvisionerError::Delete { .. } => FailureKind::Delete,
        ProvisionerError::Ignored { .. } => FailureKind::Ignored,
        ProvisionerError::MissingRegion { .. } => FailureKind::MissingRegion,
    }
}

fn parse_access_mode(mode: &str) -> Result<AccessMode, StepError> {
    match mode {
        "ReadWriteOnce" => Ok(AccessMode::ReadWriteOnce),
        "ReadOnlyMany" => Ok(AccessMode::ReadOnlyMany),
        "ReadWriteMany" => Ok(AccessMode::ReadWriteMany),
        "ReadWriteOncePod" => Ok(AccessMode::ReadWriteOncePod),
        _ => Err(StepError::Assertion(format!("unknown access mode: {mode}"))),
    }
}

fn parse_failure_kind(kind: &str) -> Result<FailureKind, StepError> {
    match kind {
        "invalid-request" => Ok(FailureKind::InvalidRequest),
        "create" => Ok(FailureKind::Create),
        "wait" => Ok(FailureKind::Wait),
        "timeout" => Ok(FailureKind::Timeout),
        "delete" => Ok(FailureKind::Delete),
        "ignored" => Ok(FailureKind::Ignored),
        "missing-region" => Ok(FailureKind::MissingRegion),
        _ => Err(StepError::Assertion(format!(
            "unknown failure kind: {kind}"
        ))),
    }
}
