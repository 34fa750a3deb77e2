//! Artifact hub port.
//!
//! The hub collaborator answers two questions: does a model exist remotely,
//! and can its files be fetched into a local snapshot directory. The concrete
//! client lives in `vllmd-hf`; the supervisor and HTTP handlers depend only
//! on this trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::local_snapshot_dir;

/// Errors from hub lookups and downloads.
#[derive(Debug, Error)]
pub enum HubError {
    /// The model id does not exist on the hub.
    #[error("model '{model_id}' not found on the hub")]
    ModelNotFound { model_id: String },

    /// The hub API answered with a non-success status.
    #[error("hub API request failed with status {status}: {url}")]
    ApiRequestFailed { status: u16, url: String },

    /// Network or HTTP client failure.
    #[error("network error: {0}")]
    Network(String),

    /// Local filesystem failure while writing a snapshot.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The hub returned a payload we could not decode.
    #[error("invalid hub response: {0}")]
    InvalidResponse(String),
}

/// Allow-pattern filter as accepted on the wire: either a JSON list or a
/// comma-separated string. Both normalize to a trimmed list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AllowPatterns {
    List(Vec<String>),
    Csv(String),
}

impl AllowPatterns {
    /// Normalize to a list of trimmed, non-empty patterns.
    pub fn normalize(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::List(items) => items.iter().map(String::as_str).collect(),
            Self::Csv(csv) => csv.split(',').collect(),
        };
        raw.iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

/// Request body for the hub endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct HubRequest {
    pub model_id: String,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    #[serde(default)]
    pub allow_patterns: Option<AllowPatterns>,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("/models/huggingface")
}

impl HubRequest {
    /// Flat snapshot directory this request downloads into.
    pub fn snapshot_dir(&self) -> PathBuf {
        local_snapshot_dir(&self.download_dir, &self.model_id)
    }
}

/// Result of a completed snapshot download.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotReport {
    pub model_id: String,
    pub snapshot_dir: PathBuf,
    pub files_downloaded: usize,
}

/// Remote artifact hub collaborator.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait HubClient: Send + Sync {
    /// Check that `model_id` exists on the hub.
    async fn model_exists(&self, model_id: &str) -> Result<(), HubError>;

    /// Download a model snapshot into `download_dir`, optionally filtered by
    /// glob-like allow patterns. Blocking from the caller's point of view.
    async fn snapshot_download(
        &self,
        model_id: &str,
        download_dir: &Path,
        allow_patterns: &[String],
    ) -> Result<SnapshotReport, HubError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_patterns_normalize_to_list() {
        let patterns = AllowPatterns::Csv("*.safetensors, *.json".to_string());
        assert_eq!(patterns.normalize(), vec!["*.safetensors", "*.json"]);
    }

    #[test]
    fn list_patterns_are_trimmed() {
        let patterns = AllowPatterns::List(vec![" *.bin ".to_string(), String::new()]);
        assert_eq!(patterns.normalize(), vec!["*.bin"]);
    }

    #[test]
    fn request_accepts_string_or_list_patterns() {
        let req: HubRequest =
            serde_json::from_str(r#"{"model_id": "m", "allow_patterns": "*.json,*.txt"}"#).unwrap();
        assert_eq!(
            req.allow_patterns.unwrap().normalize(),
            vec!["*.json", "*.txt"]
        );

        let req: HubRequest =
            serde_json::from_str(r#"{"model_id": "m", "allow_patterns": ["*.json"]}"#).unwrap();
        assert_eq!(req.allow_patterns.unwrap().normalize(), vec!["*.json"]);
    }

    #[test]
    fn snapshot_dir_flattens_model_id() {
        let req: HubRequest = serde_json::from_str(r#"{"model_id": "org/repo"}"#).unwrap();
        assert_eq!(
            req.snapshot_dir(),
            PathBuf::from("/models/huggingface/org__repo")
        );
    }
}
