//! Supervisor status vocabulary shared across adapters.

use serde::Serialize;

/// Tri-state result of a liveness query.
///
/// `JustTerminated` is reported exactly once: observing an independent child
/// exit collapses the supervisor's slot, so the next query returns
/// `NotRunning` until a new launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessStatus {
    /// No tracked process.
    NotRunning,
    /// The tracked process is alive.
    Running { pid: u32 },
    /// The tracked process exited on its own since the last query.
    ///
    /// The exit code is absent when the child was killed by a signal.
    JustTerminated { exit_code: Option<i32> },
}

/// How a successful termination concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationOutcome {
    /// Exit confirmed within the graceful-signal window.
    Graceful,
    /// Exit confirmed only after the forceful signal.
    Forced,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_with_tag() {
        let json = serde_json::to_value(ProcessStatus::Running { pid: 42 }).unwrap();
        assert_eq!(json["status"], "running");
        assert_eq!(json["pid"], 42);

        let json = serde_json::to_value(ProcessStatus::JustTerminated { exit_code: Some(1) }).unwrap();
        assert_eq!(json["status"], "just_terminated");
        assert_eq!(json["exit_code"], 1);
    }
}
