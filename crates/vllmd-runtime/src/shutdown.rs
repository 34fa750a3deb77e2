//! Process-tree termination with graceful-then-forceful escalation.
//!
//! One abstract capability, two platform implementations: on unix the child
//! is a process-group leader and the whole group is signaled at once; where
//! group signaling is unavailable the tree is enumerated via sysinfo and each
//! member signaled individually.
//!
//! Known risk, kept on purpose: the caller clears its bookkeeping even when
//! neither wait window confirms exit, so an unkillable process can linger
//! untracked. Changing that would alter the observable termination contract.

use std::io;
use std::time::Duration;

use tokio::process::Child;
use tokio::time::timeout;
use tracing::{debug, warn};

use vllmd_core::{SupervisorError, TerminationOutcome};

/// Wait window after the graceful signal.
pub const GRACE_TIMEOUT: Duration = Duration::from_secs(10);
/// Wait window after the forceful signal.
pub const KILL_TIMEOUT: Duration = Duration::from_secs(5);

/// Terminate the tracked child and its whole process tree.
///
/// Graceful signal, wait up to [`GRACE_TIMEOUT`]; then forceful signal, wait
/// up to [`KILL_TIMEOUT`]. Returns how exit was confirmed, or
/// `TerminationIncomplete` when it never was.
pub async fn terminate_tree(
    child: &mut Child,
    pid: u32,
) -> Result<TerminationOutcome, SupervisorError> {
    terminate_tree_with(child, pid, GRACE_TIMEOUT, KILL_TIMEOUT).await
}

pub(crate) async fn terminate_tree_with(
    child: &mut Child,
    pid: u32,
    grace: Duration,
    kill_wait: Duration,
) -> Result<TerminationOutcome, SupervisorError> {
    debug!(pid, "sending graceful signal to process tree");
    match signal_tree(pid, false) {
        Ok(()) => {}
        Err(e) if gone(&e) => {
            // Tree vanished between liveness check and signal; reap and done.
            let _ = child.wait().await;
            return Ok(TerminationOutcome::Graceful);
        }
        Err(e) => warn!(pid, error = %e, "graceful signal failed"),
    }

    if let Ok(waited) = timeout(grace, child.wait()).await {
        if let Err(e) = waited {
            warn!(pid, error = %e, "wait after graceful signal failed");
        } else {
            debug!(pid, "process tree exited gracefully");
            return Ok(TerminationOutcome::Graceful);
        }
    }

    debug!(pid, "grace window expired, sending forceful signal");
    match signal_tree(pid, true) {
        Ok(()) => {}
        Err(e) if gone(&e) => {
            let _ = child.wait().await;
            return Ok(TerminationOutcome::Forced);
        }
        Err(e) => warn!(pid, error = %e, "forceful signal failed"),
    }

    match timeout(kill_wait, child.wait()).await {
        Ok(Ok(_)) => Ok(TerminationOutcome::Forced),
        Ok(Err(e)) => {
            warn!(pid, error = %e, "wait after forceful signal failed");
            Err(SupervisorError::TerminationIncomplete { pid })
        }
        Err(_) => Err(SupervisorError::TerminationIncomplete { pid }),
    }
}

fn gone(e: &io::Error) -> bool {
    // ESRCH surfaces as NotFound from the signal paths below
    e.kind() == io::ErrorKind::NotFound
}

#[cfg(unix)]
fn signal_tree(pid: u32, forceful: bool) -> io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let signal = if forceful {
        Signal::SIGKILL
    } else {
        Signal::SIGTERM
    };
    // The child was spawned as its own group leader, so pgid == pid and one
    // group signal reaches every descendant.
    match killpg(Pid::from_raw(pid as i32), signal) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(io::Error::new(io::ErrorKind::NotFound, "no such process group")),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(not(unix))]
fn signal_tree(pid: u32, forceful: bool) -> io::Result<()> {
    use sysinfo::{Pid, System};

    let mut system = System::new_all();
    system.refresh_all();

    let root = Pid::from_u32(pid);
    if system.process(root).is_none() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "no such process"));
    }

    // Breadth-first walk over parent links; children go down before the root.
    let mut tree = vec![root];
    let mut frontier = vec![root];
    while let Some(parent) = frontier.pop() {
        for (child_pid, process) in system.processes() {
            if process.parent() == Some(parent) {
                tree.push(*child_pid);
                frontier.push(*child_pid);
            }
        }
    }
    tree.reverse();

    for member in tree {
        if let Some(process) = system.process(member) {
            if forceful {
                process.kill();
            } else {
                // Term is unsupported on some platforms; fall back to kill
                if process.kill_with(sysinfo::Signal::Term).is_none() {
                    process.kill();
                }
            }
        }
    }
    Ok(())
}
