//! Calculation results queue client.
//!
//! A submitted calculation resolves asynchronously; its task-set id is
//! polled against the queue endpoint until the task-set reports ready.
//! A ready-but-failed task-set surfaces as
//! [`ApiError::Calculation`] carrying the per-slot sub-task messages.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use saia_core::measurements::{CalculationResult, PhotoParams, VolumeParams};

use crate::client::{build_http_client, parse_json, trim_base_url};
use crate::config::WidgetConfig;
use crate::error::{ApiError, SubTask};

/// The results queue, as the pipeline consumes it.
#[async_trait]
pub trait ResultsQueue: Send + Sync {
    /// Poll the queue until the task-set resolves, returning the
    /// calculation result or the structured failure.
    async fn get_results(&self, task_set_id: &str) -> Result<CalculationResult, ApiError>;
}

/// Pacing and teardown for the poll loop.
#[derive(Debug, Clone)]
pub struct QueuePollConfig {
    /// Delay between status probes.
    pub interval: Duration,
    /// Cancelled by the owning session on teardown; an in-flight poll
    /// then resolves to [`ApiError::Cancelled`] instead of continuing.
    pub cancel: CancellationToken,
}

impl Default for QueuePollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(crate::config::DEFAULT_QUEUE_INTERVAL_MS),
            cancel: CancellationToken::new(),
        }
    }
}

/// Status of a task-set as reported by the queue endpoint.
#[derive(Debug, Deserialize)]
struct TaskSetStatus {
    #[serde(default)]
    is_ready: bool,
    #[serde(default)]
    is_successful: Option<bool>,
    #[serde(default)]
    sub_tasks: Vec<SubTask>,
    front_params: Option<PhotoParams>,
    side_params: Option<PhotoParams>,
    volume_params: Option<VolumeParams>,
}

/// HTTP client for the results queue.
pub struct QueueClient {
    http: reqwest::Client,
    base_url: String,
    config: QueuePollConfig,
}

impl QueueClient {
    pub fn new(config: &WidgetConfig, poll: QueuePollConfig) -> Result<Self, ApiError> {
        Ok(Self::with_client(
            build_http_client(&config.api_key)?,
            &config.api_host,
            poll,
        ))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, config: QueuePollConfig) -> Self {
        Self {
            http,
            base_url: trim_base_url(base_url),
            config,
        }
    }

    fn status_url(&self, task_set_id: &str) -> String {
        format!("{}/queue/{}/", self.base_url, task_set_id)
    }

    async fn probe(&self, task_set_id: &str) -> Result<TaskSetStatus, ApiError> {
        let response = self.http.get(self.status_url(task_set_id)).send().await?;
        parse_json(response).await
    }
}

#[async_trait]
impl ResultsQueue for QueueClient {
    async fn get_results(&self, task_set_id: &str) -> Result<CalculationResult, ApiError> {
        let mut attempt = 0u32;

        loop {
            let status = self.probe(task_set_id).await?;

            if !status.is_ready {
                attempt += 1;
                tracing::debug!(task_set_id, attempt, "Task-set not ready yet");
                tokio::select! {
                    _ = self.config.cancel.cancelled() => return Err(ApiError::Cancelled),
                    _ = tokio::time::sleep(self.config.interval) => continue,
                }
            }

            if status.is_successful == Some(false) {
                tracing::warn!(
                    task_set_id,
                    sub_tasks = status.sub_tasks.len(),
                    "Task-set resolved as failed",
                );
                return Err(ApiError::Calculation {
                    sub_tasks: status.sub_tasks,
                });
            }

            return assemble_result(status);
        }
    }
}

/// Turn a ready, successful status into a [`CalculationResult`].
fn assemble_result(status: TaskSetStatus) -> Result<CalculationResult, ApiError> {
    match (status.front_params, status.side_params, status.volume_params) {
        (Some(front_params), Some(side_params), Some(volume_params)) => Ok(CalculationResult {
            front_params,
            side_params,
            volume_params,
        }),
        _ => Err(ApiError::Malformed(
            "ready task-set is missing calculation parameters".to_string(),
        )),
    }
}
