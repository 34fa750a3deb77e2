//! Hugging Face Hub client for vllmd.
//!
//! Implements the [`vllmd_core::HubClient`] port: model existence checks and
//! blocking snapshot downloads into a flat local directory. HTTP access goes
//! through the [`http::HttpBackend`] seam so tests run against canned
//! responses.

mod client;
mod config;
mod http;
mod patterns;

pub use client::HfHubClient;
pub use config::HfClientConfig;
