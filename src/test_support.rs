//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

use crate::disk::{CreateDiskSpec, DiskClient, DiskFuture, DiskId, DiskStatus, WaitError};
use crate::provisioner::ownership::{
    ANN_CREATED_BY, ANN_VOLUME_ID, CREATED_BY, MOUNT_DRIVER, MOUNT_OPTION_VOLUME_ID,
};
use crate::volume::{AccessMode, MountSource, PARAM_REGION, ReclaimPolicy, VolumeDescriptor};

/// A single call observed by [`RecordingDiskClient`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DiskCall {
    /// `create_disk` with the spec it received.
    Create(CreateDiskSpec),
    /// `wait_for_disk` with its arguments.
    Wait {
        /// Region passed to the wait.
        region: String,
        /// Disk polled.
        disk_id: DiskId,
        /// Status wanted.
        status: DiskStatus,
        /// Timeout budget.
        timeout: Duration,
    },
    /// `delete_disk` with the disk it targeted.
    Delete(DiskId),
}

impl DiskCall {
    /// Short name of the operation, for sequence assertions.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Wait { .. } => "wait",
            Self::Delete(_) => "delete",
        }
    }
}

/// Failures the stub can inject.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum StubDiskError {
    /// Injected create failure.
    #[error("create disk rejected by stub")]
    Create,
    /// Injected status query failure.
    #[error("disk status query rejected by stub")]
    Wait,
    /// Injected delete failure.
    #[error("delete disk rejected by stub")]
    Delete,
    /// The disk was already deleted through this stub.
    #[error("disk {0} not found")]
    NotFound(DiskId),
}

#[derive(Debug, Default)]
struct StubState {
    next_disk_id: String,
    calls: Vec<DiskCall>,
    fail_create: bool,
    fail_wait: bool,
    time_out_wait: bool,
    fail_delete: bool,
    deleted: Vec<DiskId>,
}

/// Call-recording [`DiskClient`] with scriptable failures.
///
/// Deleted disks are remembered: later waits on or deletes of them report
/// [`StubDiskError::NotFound`].
///
/// Clones share state, so a test can hand one clone to the provisioner and
/// inspect calls through another.
#[derive(Clone, Debug)]
pub struct RecordingDiskClient {
    state: Arc<Mutex<StubState>>,
}

impl RecordingDiskClient {
    /// Creates a stub whose `create_disk` returns `disk_id`.
    #[must_use]
    pub fn new(disk_id: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StubState {
                next_disk_id: disk_id.into(),
                ..StubState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes `create_disk` fail.
    pub fn fail_create(&self) {
        self.lock().fail_create = true;
    }

    /// Makes `wait_for_disk` fail with a remote error.
    pub fn fail_wait(&self) {
        self.lock().fail_wait = true;
    }

    /// Makes `wait_for_disk` report a timeout.
    pub fn time_out_wait(&self) {
        self.lock().time_out_wait = true;
    }

    /// Makes `delete_disk` fail.
    pub fn fail_delete(&self) {
        self.lock().fail_delete = true;
    }

    /// Returns every call recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<DiskCall> {
        self.lock().calls.clone()
    }

    /// Returns the operation names recorded so far, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<&'static str> {
        self.lock().calls.iter().map(DiskCall::operation).collect()
    }

    /// Counts calls of the named operation.
    #[must_use]
    pub fn count(&self, operation: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }
}

impl DiskClient for RecordingDiskClient {
    type Error = StubDiskError;

    fn create_disk<'a>(&'a self, spec: &'a CreateDiskSpec) -> DiskFuture<'a, DiskId, Self::Error> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.push(DiskCall::Create(spec.clone()));
            if state.fail_create {
                return Err(StubDiskError::Create);
            }
            Ok(DiskId::from(state.next_disk_id.as_str()))
        })
    }

    fn delete_disk<'a>(&'a self, disk_id: &'a DiskId) -> DiskFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.push(DiskCall::Delete(disk_id.clone()));
            if state.fail_delete {
                return Err(StubDiskError::Delete);
            }
            if state.deleted.contains(disk_id) {
                return Err(StubDiskError::NotFound(disk_id.clone()));
            }
            state.deleted.push(disk_id.clone());
            Ok(())
        })
    }

    fn wait_for_disk<'a>(
        &'a self,
        region: &'a str,
        disk_id: &'a DiskId,
        status: DiskStatus,
        timeout: Duration,
    ) -> DiskFuture<'a, (), WaitError<Self::Error>> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.push(DiskCall::Wait {
                region: region.to_owned(),
                disk_id: disk_id.clone(),
                status: status.clone(),
                timeout,
            });
            if state.fail_wait {
                return Err(WaitError::Remote(StubDiskError::Wait));
            }
            if state.deleted.contains(disk_id) {
                return Err(WaitError::Remote(StubDiskError::NotFound(disk_id.clone())));
            }
            if state.time_out_wait {
                return Err(WaitError::TimedOut {
                    disk_id: disk_id.clone(),
                    status,
                    last_seen: Some(DiskStatus::Attached),
                    waited: timeout,
                });
            }
            Ok(())
        })
    }
}

/// Builds a descriptor carrying this provisioner's marker.
#[must_use]
pub fn owned_descriptor(disk_id: &str, region: Option<&str>) -> VolumeDescriptor {
    let mut descriptor = foreign_descriptor(disk_id, region);
    descriptor
        .annotations
        .insert(String::from(ANN_CREATED_BY), String::from(CREATED_BY));
    descriptor
        .annotations
        .insert(String::from(ANN_VOLUME_ID), disk_id.to_owned());
    descriptor
}

/// Builds a descriptor with no ownership marker.
#[must_use]
pub fn foreign_descriptor(disk_id: &str, region: Option<&str>) -> VolumeDescriptor {
    let labels = region
        .map(|value| BTreeMap::from([(String::from(PARAM_REGION), value.to_owned())]))
        .unwrap_or_default();
    VolumeDescriptor {
        name: disk_id.to_owned(),
        annotations: BTreeMap::new(),
        labels,
        capacity_gib: 20,
        access_modes: vec![AccessMode::ReadWriteOnce],
        reclaim_policy: ReclaimPolicy::Delete,
        source: MountSource {
            driver: String::from(MOUNT_DRIVER),
            options: BTreeMap::from([(String::from(MOUNT_OPTION_VOLUME_ID), disk_id.to_owned())]),
            read_only: false,
        },
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: AsyncMutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
