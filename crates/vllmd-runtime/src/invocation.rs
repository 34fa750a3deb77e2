//! `vllm serve` command construction.

use tokio::process::Command;

use vllmd_core::ServeConfig;

/// Default serving binary, expected on PATH.
pub const SERVE_PROGRAM: &str = "vllm";

/// Argument vector for `program serve <model> ...` derived from the config.
///
/// Fixed flags always present; `--tokenizer`, `--tool-call-parser` and
/// `--download-dir` are conditional. `--download-dir` is omitted when the
/// model is loaded from the local snapshot directory.
pub fn serve_args(config: &ServeConfig) -> Vec<String> {
    let mut args = vec![
        "serve".to_string(),
        config.model_id.clone(),
        "--host".to_string(),
        config.host.clone(),
        "--port".to_string(),
        config.port.to_string(),
        "--trust-remote-code".to_string(),
        "--max-model-len".to_string(),
        config.max_model_len.to_string(),
        "--pipeline-parallel-size".to_string(),
        config.pipeline_parallel_size.to_string(),
        "--tensor-parallel-size".to_string(),
        config.tensor_parallel_size.to_string(),
        "--gpu-memory-utilization".to_string(),
        config.gpu_memory_utilization.to_string(),
        "--dtype".to_string(),
        config.dtype.as_str().to_string(),
        "--kv-cache-dtype".to_string(),
        config.kv_cache_dtype.as_str().to_string(),
        "--enable-auto-tool-choice".to_string(),
    ];

    if let Some(tokenizer) = config.effective_tokenizer() {
        args.push("--tokenizer".to_string());
        args.push(tokenizer.to_string());
    }
    if let Some(parser) = &config.tool_call_parser {
        args.push("--tool-call-parser".to_string());
        args.push(parser.clone());
    }
    if !config.load_local {
        args.push("--download-dir".to_string());
        args.push(config.download_dir.display().to_string());
    }

    args
}

/// Build the spawnable command.
///
/// On unix the child becomes its own process-group leader so the whole
/// subtree can be signaled as one unit at shutdown.
pub fn build_command(program: &str, config: &ServeConfig) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(serve_args(config));
    #[cfg(unix)]
    cmd.process_group(0);
    cmd
}

/// Human-readable rendering for launch logs.
pub fn render_command(program: &str, config: &ServeConfig) -> String {
    let mut line = program.to_string();
    for arg in serve_args(config) {
        line.push(' ');
        line.push_str(&arg);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use vllmd_core::{Dtype, KvCacheDtype};

    fn windows(args: &[String]) -> Vec<(&str, &str)> {
        args.windows(2).map(|w| (w[0].as_str(), w[1].as_str())).collect()
    }

    #[test]
    fn fixed_flags_are_always_present() {
        let config = ServeConfig::new("org/model");
        let args = serve_args(&config);

        assert_eq!(args[0], "serve");
        assert_eq!(args[1], "org/model");
        assert!(args.contains(&"--trust-remote-code".to_string()));
        assert!(args.contains(&"--enable-auto-tool-choice".to_string()));

        let pairs = windows(&args);
        assert!(pairs.contains(&("--host", "0.0.0.0")));
        assert!(pairs.contains(&("--port", "12434")));
        assert!(pairs.contains(&("--max-model-len", "8192")));
        assert!(pairs.contains(&("--pipeline-parallel-size", "1")));
        assert!(pairs.contains(&("--tensor-parallel-size", "1")));
        assert!(pairs.contains(&("--gpu-memory-utilization", "0.95")));
        assert!(pairs.contains(&("--dtype", "bfloat16")));
        assert!(pairs.contains(&("--kv-cache-dtype", "auto")));
    }

    #[test]
    fn download_dir_is_omitted_for_local_load() {
        let mut config = ServeConfig::new("org/model");
        config.load_local = true;
        let args = serve_args(&config);
        assert!(!args.contains(&"--download-dir".to_string()));

        config.load_local = false;
        let args = serve_args(&config);
        assert!(windows(&args).contains(&("--download-dir", "/models/huggingface")));
    }

    #[test]
    fn conditional_flags_follow_config() {
        let mut config = ServeConfig::new("org/model");
        config.tokenizer = Some("string".to_string());
        config.tool_call_parser = None;
        let args = serve_args(&config);
        assert!(!args.contains(&"--tokenizer".to_string()));
        assert!(!args.contains(&"--tool-call-parser".to_string()));

        config.tokenizer = Some("org/tok".to_string());
        config.tool_call_parser = Some("hermes".to_string());
        let args = serve_args(&config);
        let pairs = windows(&args);
        assert!(pairs.contains(&("--tokenizer", "org/tok")));
        assert!(pairs.contains(&("--tool-call-parser", "hermes")));
    }

    #[test]
    fn dtype_flags_render_lowercase() {
        let mut config = ServeConfig::new("m");
        config.dtype = Dtype::Float16;
        config.kv_cache_dtype = KvCacheDtype::Fp8;
        let pairs_owner = serve_args(&config);
        let pairs = windows(&pairs_owner);
        assert!(pairs.contains(&("--dtype", "float16")));
        assert!(pairs.contains(&("--kv-cache-dtype", "fp8")));
    }

    #[test]
    fn render_is_a_single_shell_like_line() {
        let config = ServeConfig::new("m");
        let line = render_command(SERVE_PROGRAM, &config);
        assert!(line.starts_with("vllm serve m --host"));
    }
}
