//! Hub client: existence checks and snapshot downloads.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use vllmd_core::config::local_snapshot_dir;
use vllmd_core::{HubClient, HubError, SnapshotReport};

use crate::config::HfClientConfig;
use crate::http::{get_typed, HttpBackend, ReqwestBackend};
use crate::patterns::PatternSet;

/// Model metadata as returned by `/api/models/{id}`. Only the pieces the
/// controller needs; everything else in the payload is ignored.
#[derive(Debug, Deserialize)]
struct ModelInfo {
    #[serde(default)]
    siblings: Vec<Sibling>,
}

/// One file in a model repository.
#[derive(Debug, Deserialize)]
struct Sibling {
    rfilename: String,
}

/// Hub client over an injectable HTTP backend.
pub struct HfHubClient {
    backend: Box<dyn HttpBackend>,
    base_url: String,
}

impl HfHubClient {
    /// Create a production client from configuration.
    pub fn new(config: HfClientConfig) -> Result<Self, HubError> {
        let backend = ReqwestBackend::new(
            &config.user_agent,
            config.timeout,
            config.token.clone(),
            config.max_retries,
            config.retry_base_delay,
        )?;
        Ok(Self {
            backend: Box::new(backend),
            base_url: config.base_url,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_backend(backend: Box<dyn HttpBackend>, base_url: impl Into<String>) -> Self {
        Self {
            backend,
            base_url: base_url.into(),
        }
    }

    fn api_url(&self, model_id: &str) -> Result<Url, HubError> {
        parse_url(&format!(
            "{}/api/models/{model_id}",
            self.base_url.trim_end_matches('/')
        ))
    }

    fn file_url(&self, model_id: &str, rfilename: &str) -> Result<Url, HubError> {
        parse_url(&format!(
            "{}/{model_id}/resolve/main/{rfilename}",
            self.base_url.trim_end_matches('/')
        ))
    }
}

fn parse_url(raw: &str) -> Result<Url, HubError> {
    Url::parse(raw).map_err(|e| HubError::InvalidResponse(format!("bad URL '{raw}': {e}")))
}

#[async_trait]
impl HubClient for HfHubClient {
    async fn model_exists(&self, model_id: &str) -> Result<(), HubError> {
        let url = self.api_url(model_id)?;
        // The metadata fetch itself is the existence check; a missing repo
        // surfaces as ModelNotFound from the backend.
        let _: ModelInfo = get_typed(self.backend.as_ref(), &url).await?;
        Ok(())
    }

    async fn snapshot_download(
        &self,
        model_id: &str,
        download_dir: &Path,
        allow_patterns: &[String],
    ) -> Result<SnapshotReport, HubError> {
        let url = self.api_url(model_id)?;
        let info: ModelInfo = get_typed(self.backend.as_ref(), &url).await?;
        let patterns = PatternSet::compile(allow_patterns)?;

        let snapshot_dir = local_snapshot_dir(download_dir, model_id);
        tokio::fs::create_dir_all(&snapshot_dir).await?;

        let mut files_downloaded = 0usize;
        for sibling in &info.siblings {
            if !patterns.allows(&sibling.rfilename) {
                debug!(file = %sibling.rfilename, "skipped by allow patterns");
                continue;
            }
            let file_url = self.file_url(model_id, &sibling.rfilename)?;
            let dest = snapshot_dir.join(&sibling.rfilename);
            debug!(file = %sibling.rfilename, dest = %dest.display(), "downloading");
            self.backend.download_to(&file_url, &dest).await?;
            files_downloaded += 1;
        }

        info!(
            model_id,
            files = files_downloaded,
            dir = %snapshot_dir.display(),
            "snapshot download complete"
        );
        Ok(SnapshotReport {
            model_id: model_id.to_string(),
            snapshot_dir,
            files_downloaded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeBackend;
    use serde_json::json;

    const BASE: &str = "https://hub.test";

    fn repo_json() -> serde_json::Value {
        json!({
            "id": "org/repo",
            "siblings": [
                {"rfilename": "config.json"},
                {"rfilename": "model-00001-of-00002.safetensors"},
                {"rfilename": "model-00002-of-00002.safetensors"},
                {"rfilename": "pytorch_model.bin"},
            ]
        })
    }

    #[tokio::test]
    async fn model_exists_for_known_repo() {
        let backend = FakeBackend::new().with_response("/api/models/org/repo", repo_json());
        let client = HfHubClient::with_backend(Box::new(backend), BASE);
        assert!(client.model_exists("org/repo").await.is_ok());
    }

    #[tokio::test]
    async fn missing_repo_reports_model_not_found() {
        let backend = FakeBackend::new().with_missing("/api/models/org/ghost");
        let client = HfHubClient::with_backend(Box::new(backend), BASE);
        let err = client.model_exists("org/ghost").await.unwrap_err();
        assert!(matches!(err, HubError::ModelNotFound { model_id } if model_id == "org/ghost"));
    }

    #[tokio::test]
    async fn snapshot_download_filters_and_writes_files() {
        let backend = FakeBackend::new().with_response("/api/models/org/repo", repo_json());
        let client = HfHubClient::with_backend(Box::new(backend), BASE);
        let dir = tempfile::tempdir().unwrap();

        let patterns = vec!["*.safetensors".to_string(), "*.json".to_string()];
        let report = client
            .snapshot_download("org/repo", dir.path(), &patterns)
            .await
            .unwrap();

        assert_eq!(report.files_downloaded, 3);
        assert_eq!(report.snapshot_dir, dir.path().join("org__repo"));
        assert!(report.snapshot_dir.join("config.json").exists());
        assert!(report
            .snapshot_dir
            .join("model-00001-of-00002.safetensors")
            .exists());
        assert!(!report.snapshot_dir.join("pytorch_model.bin").exists());
    }

    #[tokio::test]
    async fn snapshot_download_without_patterns_takes_everything() {
        let backend = FakeBackend::new().with_response("/api/models/org/repo", repo_json());
        let client = HfHubClient::with_backend(Box::new(backend), BASE);
        let dir = tempfile::tempdir().unwrap();

        let report = client
            .snapshot_download("org/repo", dir.path(), &[])
            .await
            .unwrap();
        assert_eq!(report.files_downloaded, 4);
    }

    #[tokio::test]
    async fn download_urls_resolve_against_main_revision() {
        let backend = std::sync::Arc::new(FakeBackend::new().with_response(
            "/api/models/org/repo",
            json!({"siblings": [{"rfilename": "config.json"}]}),
        ));
        let client = HfHubClient::with_backend(Box::new(backend.clone()), BASE);
        let dir = tempfile::tempdir().unwrap();
        client
            .snapshot_download("org/repo", dir.path(), &[])
            .await
            .unwrap();

        let downloads = backend.downloads.lock().unwrap();
        assert_eq!(
            downloads.as_slice(),
            ["https://hub.test/org/repo/resolve/main/config.json"]
        );
    }
}
