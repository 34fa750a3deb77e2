//! Process supervision for the external serving binary.
//!
//! The supervisor owns at most one child serving process at a time: launch,
//! terminate, and liveness all go through a single exclusively-locked slot.
//! Termination acts on the whole process tree with graceful-then-forceful
//! escalation.

pub mod autoserve;
pub mod invocation;
pub mod shutdown;
pub mod supervisor;

pub use autoserve::schedule_auto_launch;
pub use supervisor::Supervisor;
