//! Public configuration for the hub client.

use std::time::Duration;

/// Configuration for [`crate::HfHubClient`].
#[derive(Debug, Clone)]
pub struct HfClientConfig {
    /// Base URL of the hub (API and file resolution share it).
    pub(crate) base_url: String,
    /// User agent string for HTTP requests.
    pub(crate) user_agent: String,
    /// Request timeout for API calls. File downloads are not bounded by this.
    pub(crate) timeout: Duration,
    /// Optional bearer token for gated models.
    pub(crate) token: Option<String>,
    /// Maximum retry attempts for transient errors.
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff.
    pub(crate) retry_base_delay: Duration,
}

impl Default for HfClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://huggingface.co".to_string(),
            user_agent: concat!("vllmd/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            token: None,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl HfClientConfig {
    /// Create a configuration with default settings, picking up `HF_TOKEN`
    /// from the environment when present.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_optional_token(std::env::var("HF_TOKEN").ok())
    }

    /// Set the hub base URL. Defaults to `https://huggingface.co`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout for API calls.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set an optional bearer token for gated models.
    #[must_use]
    pub fn with_optional_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Set the maximum retry attempts for transient errors.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }
}
