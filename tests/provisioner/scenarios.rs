//! BDD scenarios for the provisioner lifecycle.

use rstest_bdd_macros::scenario;

use super::test_helpers::{ProvisionerContext, ProvisionerTestError, provisioner_context_result};

type ProvisionerContextResult = Result<ProvisionerContext, ProvisionerTestError>;

#[scenario(
    path = "tests/features/provisioner.feature",
    name = "Provision a disk for a valid request"
)]
fn scenario_provision(provisioner_context_result: ProvisionerContextResult) {
    drop(provisioner_context_result);
}

#[scenario(
    path = "tests/features/provisioner.feature",
    name = "Round partial gibibytes up"
)]
fn scenario_round_up(provisioner_context_result: ProvisionerContextResult) {
    drop(provisioner_context_result);
}

#[scenario(
    path = "tests/features/provisioner.feature",
    name = "Reject unsupported access modes"
)]
fn scenario_unsupported_modes(provisioner_context_result: ProvisionerContextResult) {
    drop(provisioner_context_result);
}

#[scenario(
    path = "tests/features/provisioner.feature",
    name = "Reject disks below the minimum size"
)]
fn scenario_small_disk(provisioner_context_result: ProvisionerContextResult) {
    drop(provisioner_context_result);
}

#[scenario(
    path = "tests/features/provisioner.feature",
    name = "Reject requests without a region"
)]
fn scenario_missing_region_on_provision(provisioner_context_result: ProvisionerContextResult) {
    drop(provisioner_context_result);
}

#[scenario(
    path = "tests/features/provisioner.feature",
    name = "Surface disk creation failures"
)]
fn scenario_create_failure(provisioner_context_result: ProvisionerContextResult) {
    drop(provisioner_context_result);
}

#[scenario(
    path = "tests/features/provisioner.feature",
    name = "Treat a slow disk as a provisioning failure"
)]
fn scenario_provision_timeout(provisioner_context_result: ProvisionerContextResult) {
    drop(provisioner_context_result);
}

#[scenario(
    path = "tests/features/provisioner.feature",
    name = "Delete a disk this provisioner created"
)]
fn scenario_delete(provisioner_context_result: ProvisionerContextResult) {
    drop(provisioner_context_result);
}

#[scenario(
    path = "tests/features/provisioner.feature",
    name = "Skip volumes created by someone else"
)]
fn scenario_foreign_volume(provisioner_context_result: ProvisionerContextResult) {
    drop(provisioner_context_result);
}

#[scenario(
    path = "tests/features/provisioner.feature",
    name = "Refuse to delete a volume without a region"
)]
fn scenario_missing_region_on_delete(provisioner_context_result: ProvisionerContextResult) {
    drop(provisioner_context_result);
}

#[scenario(
    path = "tests/features/provisioner.feature",
    name = "Keep a busy disk when it never becomes free"
)]
fn scenario_delete_timeout(provisioner_context_result: ProvisionerContextResult) {
    drop(provisioner_context_result);
}

#[scenario(
    path = "tests/features/provisioner.feature",
    name = "Surface disk deletion failures"
)]
fn scenario_delete_failure(provisioner_context_result: ProvisionerContextResult) {
    drop(provisioner_context_result);
}
