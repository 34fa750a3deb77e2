//! Single-slot supervisor for the serving process.

use std::sync::Arc;
use std::time::SystemTime;

use tokio::process::Child;
use tokio::sync::Mutex;
use tracing::{info, warn};

use vllmd_core::{HubClient, ProcessStatus, ServeConfig, SupervisorError, TerminationOutcome};

use crate::invocation::{build_command, render_command, SERVE_PROGRAM};
use crate::shutdown::terminate_tree;

/// The tracked child and its launch metadata.
struct TrackedProcess {
    child: Child,
    pid: u32,
    started_at: SystemTime,
}

/// Owns at most one serving process at a time.
///
/// The slot is a single exclusively-locked resource: launch, terminate, and
/// liveness each hold the lock for their full duration, so two concurrent
/// launches can never both see an empty slot, and a terminate can never race
/// a launch into a half-updated handle. Termination holds the lock across its
/// bounded waits by design; no other operation may proceed mid-termination.
pub struct Supervisor {
    slot: Mutex<Option<TrackedProcess>>,
    hub: Arc<dyn HubClient>,
    program: String,
}

impl Supervisor {
    /// Create a supervisor driving the default `vllm` binary.
    pub fn new(hub: Arc<dyn HubClient>) -> Self {
        Self::with_program(hub, SERVE_PROGRAM)
    }

    /// Create a supervisor driving a specific serving binary.
    pub fn with_program(hub: Arc<dyn HubClient>, program: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(None),
            hub,
            program: program.into(),
        }
    }

    /// Launch the serving process described by `config`.
    ///
    /// Fails with `AlreadyRunning` while a live process is tracked. When the
    /// config requests local-only loading and the snapshot directory is
    /// missing, the artifact is downloaded first, blocking the launch.
    pub async fn launch(&self, config: &ServeConfig) -> Result<u32, SupervisorError> {
        config.validate()?;

        let mut slot = self.slot.lock().await;
        if let Some(tracked) = slot.as_mut() {
            match tracked.child.try_wait() {
                Ok(None) => {
                    return Err(SupervisorError::AlreadyRunning { pid: tracked.pid });
                }
                Ok(Some(status)) => {
                    // Self-healing: the previous child exited on its own
                    info!(pid = tracked.pid, ?status, "tracked process already exited, slot reclaimed");
                    *slot = None;
                }
                Err(e) => {
                    warn!(pid = tracked.pid, error = %e, "could not inspect tracked process");
                    return Err(SupervisorError::AlreadyRunning { pid: tracked.pid });
                }
            }
        }

        if config.load_local {
            let artifact = config.local_artifact_path();
            if !artifact.exists() {
                info!(
                    model_id = %config.model_id,
                    path = %artifact.display(),
                    "local artifact missing, downloading snapshot before launch"
                );
                self.hub
                    .snapshot_download(&config.model_id, &config.download_dir, &[])
                    .await?;
            }
        }

        info!(command = %render_command(&self.program, config), "launching serving process");
        let mut child = build_command(&self.program, config)
            .spawn()
            .map_err(|e| SupervisorError::SpawnFailed(e.to_string()))?;

        let Some(pid) = child.id() else {
            // Spawned but no pid to track: tear the partial child down before
            // surfacing the failure so nothing leaks untracked.
            let _ = child.kill().await;
            let _ = child.wait().await;
            return Err(SupervisorError::SpawnFailed(
                "child exited before a pid could be recorded".to_string(),
            ));
        };

        *slot = Some(TrackedProcess {
            child,
            pid,
            started_at: SystemTime::now(),
        });
        info!(pid, model_id = %config.model_id, "serving process launched");
        Ok(pid)
    }

    /// Terminate the tracked process tree.
    ///
    /// The slot is cleared unconditionally: on graceful exit, on forced exit,
    /// and on the soft-failure path where neither wait confirmed exit.
    pub async fn terminate(&self) -> Result<TerminationOutcome, SupervisorError> {
        let mut slot = self.slot.lock().await;
        let Some(mut tracked) = slot.take() else {
            return Err(SupervisorError::NotRunning);
        };

        if let Ok(Some(status)) = tracked.child.try_wait() {
            info!(pid = tracked.pid, ?status, "process already exited before terminate");
            return Err(SupervisorError::NotRunning);
        }

        info!(pid = tracked.pid, "shutting down serving process");
        let outcome = terminate_tree(&mut tracked.child, tracked.pid).await;
        match &outcome {
            Ok(how) => info!(pid = tracked.pid, outcome = ?how, "serving process shut down"),
            Err(e) => warn!(pid = tracked.pid, error = %e, "termination unconfirmed, handle cleared"),
        }
        outcome
    }

    /// Non-blocking liveness query.
    ///
    /// Observing an independent exit collapses the slot, so `JustTerminated`
    /// is reported exactly once.
    pub async fn status(&self) -> ProcessStatus {
        let mut slot = self.slot.lock().await;
        let Some(tracked) = slot.as_mut() else {
            return ProcessStatus::NotRunning;
        };

        match tracked.child.try_wait() {
            Ok(None) => ProcessStatus::Running { pid: tracked.pid },
            Ok(Some(status)) => {
                info!(pid = tracked.pid, ?status, "tracked process exited on its own");
                let exit_code = status.code();
                *slot = None;
                ProcessStatus::JustTerminated { exit_code }
            }
            Err(e) => {
                warn!(pid = tracked.pid, error = %e, "liveness check failed, dropping handle");
                *slot = None;
                ProcessStatus::JustTerminated { exit_code: None }
            }
        }
    }

    /// Unix time the tracked process started, if one is tracked.
    pub async fn started_at(&self) -> Option<SystemTime> {
        self.slot.lock().await.as_ref().map(|t| t.started_at)
    }

    #[cfg(test)]
    pub(crate) async fn adopt(&self, child: Child) -> u32 {
        let pid = child.id().expect("adopted child must be running");
        *self.slot.lock().await = Some(TrackedProcess {
            child,
            pid,
            started_at: SystemTime::now(),
        });
        pid
    }
}
