//! Core domain types and port definitions for vllmd.
//!
//! This crate holds everything the adapters share: the launch configuration,
//! environment-driven settings, the supervisor's status/error vocabulary, and
//! the Hugging Face Hub port. No adapter-specific dependencies live here.

pub mod config;
pub mod error;
pub mod ports;
pub mod process;
pub mod settings;

pub use config::{ConfigError, Dtype, KvCacheDtype, ServeConfig};
pub use error::SupervisorError;
pub use ports::hub::{AllowPatterns, HubClient, HubError, HubRequest, SnapshotReport};
pub use process::{ProcessStatus, TerminationOutcome};
pub use settings::Settings;
