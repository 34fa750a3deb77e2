//! HTTP backend abstraction for the hub API.
//!
//! A trait-based backend keeps the client testable without a network. The
//! production implementation uses reqwest with bounded retry for transient
//! errors; downloads stream straight to disk.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use url::Url;

use vllmd_core::HubError;

/// HTTP operations the hub client needs.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Fetch JSON from a URL and deserialize it.
    async fn get_json(&self, url: &Url) -> Result<serde_json::Value, HubError>;

    /// Stream the body at `url` into the file at `dest`.
    async fn download_to(&self, url: &Url, dest: &Path) -> Result<(), HubError>;
}

/// Deserialize helper shared by backends.
pub(crate) async fn get_typed<T: DeserializeOwned>(
    backend: &dyn HttpBackend,
    url: &Url,
) -> Result<T, HubError> {
    let value = backend.get_json(url).await?;
    serde_json::from_value(value).map_err(|e| HubError::InvalidResponse(e.to_string()))
}

fn network_error(e: &reqwest::Error) -> HubError {
    HubError::Network(e.to_string())
}

/// Try to extract an `owner/repo` model id from an API path, so 404s can be
/// reported as `ModelNotFound` instead of a bare status code.
fn model_id_from_path(path: &str) -> Option<String> {
    let rest = path.trim_start_matches('/').strip_prefix("api/models/")?;
    let parts: Vec<&str> = rest.splitn(3, '/').collect();
    if parts.len() >= 2 {
        Some(format!("{}/{}", parts[0], parts[1]))
    } else {
        Some(parts.first()?.to_string()).filter(|s| !s.is_empty())
    }
}

/// Per-request timeout used for snapshot file downloads.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Production backend: reqwest with retry for 5xx and network errors.
pub struct ReqwestBackend {
    client: reqwest::Client,
    max_retries: u8,
    retry_base_delay: Duration,
    auth_token: Option<String>,
}

impl ReqwestBackend {
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        token: Option<String>,
        max_retries: u8,
        retry_base_delay: Duration,
    ) -> Result<Self, HubError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(timeout)
            .build()
            .map_err(|e| network_error(&e))?;
        Ok(Self {
            client,
            max_retries,
            retry_base_delay,
            auth_token: token,
        })
    }

    fn build_request(&self, url: &Url, timeout: Option<Duration>) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url.as_str());
        if let Some(ref token) = self.auth_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        request
    }

    async fn fetch_with_retry(
        &self,
        url: &Url,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, HubError> {
        let mut last_error: Option<HubError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_base_delay * 2u32.pow(u32::from(attempt) - 1);
                tokio::time::sleep(delay).await;
            }

            match self.build_request(url, timeout).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    // Transient server-side failures are worth retrying
                    if status.is_server_error() && attempt < self.max_retries {
                        last_error = Some(HubError::ApiRequestFailed {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                        continue;
                    }

                    if status.as_u16() == 404 {
                        if let Some(model_id) = model_id_from_path(url.path()) {
                            return Err(HubError::ModelNotFound { model_id });
                        }
                    }

                    return Err(HubError::ApiRequestFailed {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        last_error = Some(network_error(&e));
                        continue;
                    }
                    return Err(network_error(&e));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| HubError::InvalidResponse("unknown error during fetch".to_string())))
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json(&self, url: &Url) -> Result<serde_json::Value, HubError> {
        let response = self.fetch_with_retry(url, None).await?;
        response.json().await.map_err(|e| network_error(&e))
    }

    async fn download_to(&self, url: &Url, dest: &Path) -> Result<(), HubError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // A large shard can legitimately take much longer than the API
        // timeout, so downloads get their own generous window.
        let response = self.fetch_with_retry(url, Some(DOWNLOAD_TIMEOUT)).await?;
        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| network_error(&e))?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_extraction_from_api_path() {
        assert_eq!(
            model_id_from_path("/api/models/org/repo"),
            Some("org/repo".to_string())
        );
        assert_eq!(
            model_id_from_path("/api/models/org/repo/revision/main"),
            Some("org/repo".to_string())
        );
        assert_eq!(model_id_from_path("/api/models/"), None);
        assert_eq!(model_id_from_path("/other"), None);
    }
}
