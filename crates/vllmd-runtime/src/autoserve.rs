//! One-shot deferred auto-launch at daemon startup.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use vllmd_core::Settings;

use crate::supervisor::Supervisor;

/// Delay before the deferred launch attempt, letting the HTTP surface come
/// up first.
pub const SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Schedule a single background launch attempt when auto-serve is enabled
/// and a model name is configured.
///
/// The task runs concurrently with request handling. A failed launch is
/// logged and never retried; it does not take the daemon down.
pub fn schedule_auto_launch(
    supervisor: Arc<Supervisor>,
    settings: &Settings,
) -> Option<JoinHandle<()>> {
    if !settings.auto_serve {
        info!("auto-serve disabled");
        return None;
    }
    let Some(model_id) = settings.model_name.clone() else {
        info!("auto-serve enabled but no model name configured, skipping");
        return None;
    };

    let config = settings.serve_config(model_id.clone());
    info!(%model_id, delay_secs = SETTLE_DELAY.as_secs(), "auto-serve scheduled");

    Some(tokio::spawn(async move {
        tokio::time::sleep(SETTLE_DELAY).await;
        match supervisor.launch(&config).await {
            Ok(pid) => info!(%model_id, pid, "auto-serve launched model"),
            Err(e) => error!(%model_id, error = %e, "auto-serve launch failed"),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vllmd_core::ports::hub::MockHubClient;
    use vllmd_core::ProcessStatus;

    fn settings_with(auto_serve: bool, model: Option<&str>) -> Settings {
        let model = model.map(ToString::to_string);
        Settings::from_lookup(move |key| match key {
            "AUTO_SERVE_MODEL" if auto_serve => Some("true".to_string()),
            "VLLM_MODEL_NAME" => model.clone(),
            _ => None,
        })
    }

    fn supervisor(program: &str) -> Arc<Supervisor> {
        Arc::new(Supervisor::with_program(
            Arc::new(MockHubClient::new()),
            program,
        ))
    }

    #[tokio::test]
    async fn disabled_flag_schedules_nothing() {
        let handle = schedule_auto_launch(supervisor("true"), &settings_with(false, Some("m")));
        assert!(handle.is_none());
    }

    #[tokio::test]
    async fn missing_model_name_schedules_nothing() {
        let handle = schedule_auto_launch(supervisor("true"), &settings_with(true, None));
        assert!(handle.is_none());
    }

    #[cfg(unix)]
    #[tokio::test(start_paused = true)]
    async fn scheduled_launch_fires_after_settle_delay() {
        let supervisor = supervisor("true");
        let handle =
            schedule_auto_launch(supervisor.clone(), &settings_with(true, Some("org/model")))
                .expect("task should be scheduled");

        // Nothing launched before the settle delay elapses
        assert_eq!(supervisor.status().await, ProcessStatus::NotRunning);

        tokio::time::advance(SETTLE_DELAY).await;
        handle.await.unwrap();

        // `true` exits immediately; the launch still happened
        assert!(matches!(
            supervisor.status().await,
            ProcessStatus::Running { .. } | ProcessStatus::JustTerminated { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_launch_is_swallowed() {
        let supervisor = supervisor("/nonexistent/serving-binary");
        let handle =
            schedule_auto_launch(supervisor.clone(), &settings_with(true, Some("org/model")))
                .expect("task should be scheduled");

        tokio::time::advance(SETTLE_DELAY).await;
        // The task completes without panicking even though the spawn failed
        handle.await.unwrap();
        assert_eq!(supervisor.status().await, ProcessStatus::NotRunning);
    }
}
