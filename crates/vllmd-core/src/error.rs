//! Supervisor error taxonomy.
//!
//! Every failure is terminal for its request: the supervisor performs no
//! retries, and each variant maps onto a distinct HTTP outcome at the edge.

use thiserror::Error;

use crate::config::ConfigError;
use crate::ports::hub::HubError;

/// Errors surfaced by the process supervisor's three operations.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A launch was requested while a process is already tracked.
    #[error("a serving process is already running (pid {pid}); shut it down first")]
    AlreadyRunning { pid: u32 },

    /// A terminate was requested with no live tracked process.
    #[error("no serving process is running")]
    NotRunning,

    /// The launch configuration failed validation.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The OS failed to start the process (or its process group).
    #[error("failed to spawn serving process: {0}")]
    SpawnFailed(String),

    /// A pre-launch artifact download failed.
    #[error(transparent)]
    Hub(#[from] HubError),

    /// Neither the graceful nor the forceful window confirmed exit.
    ///
    /// The supervisor's slot is cleared regardless, so a lingering OS process
    /// may remain while the bookkeeping reports nothing running.
    #[error("process {pid} did not confirm exit after forceful kill; handle cleared")]
    TerminationIncomplete { pid: u32 },
}
