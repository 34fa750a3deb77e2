//! Per-launch serving configuration.
//!
//! A `ServeConfig` fully determines the external `vllm serve` invocation and
//! is never mutated after construction. Defaults match the env-driven
//! defaults in [`crate::settings`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric precision mode passed to `--dtype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Auto,
    Half,
    Float16,
    #[default]
    Bfloat16,
    Float,
    Float32,
}

impl Dtype {
    /// Flag value as the serving binary expects it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Half => "half",
            Self::Float16 => "float16",
            Self::Bfloat16 => "bfloat16",
            Self::Float => "float",
            Self::Float32 => "float32",
        }
    }
}

/// KV-cache precision mode passed to `--kv-cache-dtype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KvCacheDtype {
    #[default]
    Auto,
    Fp8,
}

impl KvCacheDtype {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Fp8 => "fp8",
        }
    }
}

/// Validation failure for a [`ServeConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The model identifier is missing or empty.
    #[error("model_id must not be empty")]
    EmptyModelId,

    /// A field that must be a positive integer was zero.
    #[error("{field} must be at least 1 (got {value})")]
    NonPositive { field: &'static str, value: u64 },

    /// GPU memory utilization outside (0, 1].
    #[error("gpu_memory_utilization must be in (0, 1] (got {0})")]
    MemoryUtilizationOutOfRange(f64),
}

/// Immutable per-launch configuration for the serving process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    /// Hub identifier or local path of the model to serve.
    pub model_id: String,
    /// Tokenizer override. `""` and the literal `"string"` (a placeholder
    /// some API consoles submit) are treated as "use the model's own".
    #[serde(default)]
    pub tokenizer: Option<String>,
    /// Directory model snapshots are downloaded into.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    /// Bind address for the serving process.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port for the serving process.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum context length.
    #[serde(default = "default_max_model_len")]
    pub max_model_len: u32,
    #[serde(default = "default_parallel_size")]
    pub pipeline_parallel_size: u32,
    #[serde(default = "default_parallel_size")]
    pub tensor_parallel_size: u32,
    /// Fraction of GPU memory the serving process may claim, in (0, 1].
    #[serde(default = "default_gpu_memory_utilization")]
    pub gpu_memory_utilization: f64,
    #[serde(default)]
    pub dtype: Dtype,
    #[serde(default)]
    pub kv_cache_dtype: KvCacheDtype,
    /// When set, the model is loaded from the local snapshot directory and
    /// `--download-dir` is omitted from the invocation.
    #[serde(default)]
    pub load_local: bool,
    /// Optional `--tool-call-parser` name.
    #[serde(default)]
    pub tool_call_parser: Option<String>,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("/models/huggingface")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    12434
}

const fn default_max_model_len() -> u32 {
    8192
}

const fn default_parallel_size() -> u32 {
    1
}

const fn default_gpu_memory_utilization() -> f64 {
    0.95
}

impl ServeConfig {
    /// Create a config for `model_id` with all other fields defaulted.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            tokenizer: None,
            download_dir: default_download_dir(),
            host: default_host(),
            port: default_port(),
            max_model_len: default_max_model_len(),
            pipeline_parallel_size: default_parallel_size(),
            tensor_parallel_size: default_parallel_size(),
            gpu_memory_utilization: default_gpu_memory_utilization(),
            dtype: Dtype::default(),
            kv_cache_dtype: KvCacheDtype::default(),
            load_local: false,
            tool_call_parser: None,
        }
    }

    /// Validate field ranges before launch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_id.trim().is_empty() {
            return Err(ConfigError::EmptyModelId);
        }
        for (field, value) in [
            ("max_model_len", self.max_model_len),
            ("pipeline_parallel_size", self.pipeline_parallel_size),
            ("tensor_parallel_size", self.tensor_parallel_size),
        ] {
            if value == 0 {
                return Err(ConfigError::NonPositive {
                    field,
                    value: u64::from(value),
                });
            }
        }
        if !(self.gpu_memory_utilization > 0.0 && self.gpu_memory_utilization <= 1.0) {
            return Err(ConfigError::MemoryUtilizationOutOfRange(
                self.gpu_memory_utilization,
            ));
        }
        Ok(())
    }

    /// Effective tokenizer after placeholder normalization.
    pub fn effective_tokenizer(&self) -> Option<&str> {
        match self.tokenizer.as_deref() {
            None | Some("" | "string") => None,
            other => other,
        }
    }

    /// Local snapshot directory for this model:
    /// `download_dir/<model_id with '/' replaced by '__'>`.
    pub fn local_artifact_path(&self) -> PathBuf {
        local_snapshot_dir(&self.download_dir, &self.model_id)
    }
}

/// Map a hub model id onto its flat on-disk snapshot directory.
pub fn local_snapshot_dir(download_dir: &Path, model_id: &str) -> PathBuf {
    download_dir.join(model_id.replace('/', "__"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ServeConfig::new("org/model");
        assert_eq!(config.port, 12434);
        assert_eq!(config.max_model_len, 8192);
        assert_eq!(config.pipeline_parallel_size, 1);
        assert_eq!(config.tensor_parallel_size, 1);
        assert!((config.gpu_memory_utilization - 0.95).abs() < f64::EPSILON);
        assert_eq!(config.dtype, Dtype::Bfloat16);
        assert_eq!(config.kv_cache_dtype, KvCacheDtype::Auto);
        assert!(!config.load_local);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserializes_with_partial_body() {
        let config: ServeConfig =
            serde_json::from_str(r#"{"model_id": "m", "port": 8000, "dtype": "float16"}"#).unwrap();
        assert_eq!(config.model_id, "m");
        assert_eq!(config.port, 8000);
        assert_eq!(config.dtype, Dtype::Float16);
        assert_eq!(config.download_dir, PathBuf::from("/models/huggingface"));
    }

    #[test]
    fn rejects_empty_model_id() {
        let config = ServeConfig::new("  ");
        assert_eq!(config.validate(), Err(ConfigError::EmptyModelId));
    }

    #[test]
    fn rejects_zero_parallel_sizes() {
        let mut config = ServeConfig::new("m");
        config.tensor_parallel_size = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "tensor_parallel_size",
                value: 0
            })
        );
    }

    #[test]
    fn memory_utilization_bounds() {
        let mut config = ServeConfig::new("m");
        config.gpu_memory_utilization = 0.0;
        assert!(config.validate().is_err());
        config.gpu_memory_utilization = 1.0;
        assert!(config.validate().is_ok());
        config.gpu_memory_utilization = 1.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn tokenizer_placeholders_are_dropped() {
        let mut config = ServeConfig::new("m");
        assert_eq!(config.effective_tokenizer(), None);
        config.tokenizer = Some(String::new());
        assert_eq!(config.effective_tokenizer(), None);
        config.tokenizer = Some("string".to_string());
        assert_eq!(config.effective_tokenizer(), None);
        config.tokenizer = Some("org/tok".to_string());
        assert_eq!(config.effective_tokenizer(), Some("org/tok"));
    }

    #[test]
    fn local_artifact_path_flattens_model_id() {
        let config = ServeConfig::new("meta-llama/Llama-3-8B");
        assert_eq!(
            config.local_artifact_path(),
            PathBuf::from("/models/huggingface/meta-llama__Llama-3-8B")
        );
    }
}
