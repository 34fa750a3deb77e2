//! Environment-driven defaults.
//!
//! Every knob the daemon reads from the environment lives here, parsed
//! through an injected lookup so tests never touch process env. Malformed
//! values fall back to their defaults with a logged warning rather than
//! aborting startup.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::config::{Dtype, KvCacheDtype, ServeConfig};

/// Daemon and serving defaults resolved from `VLLM_*` environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Port the controller's own HTTP server binds (`VLLM_CONTROLLER_PORT`).
    pub controller_port: u16,
    /// Launch a model automatically at startup (`AUTO_SERVE_MODEL`).
    pub auto_serve: bool,
    /// Model to auto-launch (`VLLM_MODEL_NAME`).
    pub model_name: Option<String>,

    pub tokenizer: Option<String>,
    pub download_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub max_model_len: u32,
    pub pipeline_parallel_size: u32,
    pub tensor_parallel_size: u32,
    pub gpu_memory_utilization: f64,
    pub dtype: Dtype,
    pub kv_cache_dtype: KvCacheDtype,
    pub load_local: bool,
    pub tool_call_parser: Option<String>,
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings from an arbitrary lookup (used by tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            controller_port: parse_or(&lookup, "VLLM_CONTROLLER_PORT", 12435),
            auto_serve: flag(&lookup, "AUTO_SERVE_MODEL"),
            model_name: non_empty(lookup("VLLM_MODEL_NAME")),
            tokenizer: non_empty(lookup("VLLM_TOKENIZER")),
            download_dir: lookup("VLLM_DOWNLOAD_DIR")
                .map_or_else(|| PathBuf::from("/models/huggingface"), PathBuf::from),
            host: lookup("VLLM_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "VLLM_PORT", 12434),
            max_model_len: parse_or(&lookup, "VLLM_MAX_MODEL_LEN", 32768),
            pipeline_parallel_size: parse_or(&lookup, "VLLM_PIPELINE_PARALLEL_SIZE", 1),
            tensor_parallel_size: parse_or(&lookup, "VLLM_TENSOR_PARALLEL_SIZE", 1),
            gpu_memory_utilization: parse_or(&lookup, "VLLM_GPU_MEMORY_UTILIZATION", 0.95),
            dtype: parse_enum_or(&lookup, "VLLM_DTYPE", Dtype::Bfloat16),
            kv_cache_dtype: parse_enum_or(&lookup, "VLLM_KV_CACHE_DTYPE", KvCacheDtype::Auto),
            load_local: flag(&lookup, "VLLM_LOAD_LOCAL"),
            tool_call_parser: non_empty(lookup("VLLM_TOOL_CALL_PARSER")),
        }
    }

    /// Build the auto-launch configuration for `model_id` from these defaults.
    pub fn serve_config(&self, model_id: impl Into<String>) -> ServeConfig {
        let model_id = model_id.into();
        ServeConfig {
            tokenizer: Some(self.tokenizer.clone().unwrap_or_else(|| model_id.clone())),
            download_dir: self.download_dir.clone(),
            host: self.host.clone(),
            port: self.port,
            max_model_len: self.max_model_len,
            pipeline_parallel_size: self.pipeline_parallel_size,
            tensor_parallel_size: self.tensor_parallel_size,
            gpu_memory_utilization: self.gpu_memory_utilization,
            dtype: self.dtype,
            kv_cache_dtype: self.kv_cache_dtype,
            load_local: self.load_local,
            tool_call_parser: self.tool_call_parser.clone(),
            model_id,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn flag(lookup: impl Fn(&str) -> Option<String>, key: &str) -> bool {
    lookup(key).is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

fn parse_or<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, %default, "unparseable env value, using default");
            default
        }),
    }
}

fn parse_enum_or<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: serde::de::DeserializeOwned + Copy + std::fmt::Debug,
{
    match lookup(key) {
        None => default,
        Some(raw) => {
            serde_json::from_value(serde_json::Value::String(raw.trim().to_lowercase()))
                .unwrap_or_else(|_| {
                    warn!(key, value = %raw, ?default, "unknown env value, using default");
                    default
                })
        }
    }
}
