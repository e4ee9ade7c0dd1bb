use super::types::*;
use crate::{Error, Result, config::ApiConfig};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::{path::Path, time::Duration};
use tracing::{debug, warn};

const TOKEN_HEADER: &str = "Token";

/// The remote side of every call: file uploads and blocking task execution.
#[async_trait]
pub trait CloudClient: Send + Sync {
    async fn upload_file(&self, path: &Path) -> Result<String>;
    async fn run_task(&self, task: &Task) -> Result<TaskResult>;
}

/// HTTP client for the DDS cloud API.
pub struct DdsClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    poll_interval: Duration,
}

impl DdsClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        debug!("Creating DDS client for: {}", config.base_url);

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            poll_interval: config.poll_interval(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: &Value) -> std::result::Result<ApiEnvelope, String> {
        let response = self
            .http
            .post(self.endpoint(path))
            .header(TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("failed to send request to {}: {}", path, e))?;

        Self::read_envelope(path, response).await
    }

    async fn get(&self, path: &str) -> std::result::Result<ApiEnvelope, String> {
        let response = self
            .http
            .get(self.endpoint(path))
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| format!("failed to send request to {}: {}", path, e))?;

        Self::read_envelope(path, response).await
    }

    async fn read_envelope(
        path: &str,
        response: reqwest::Response,
    ) -> std::result::Result<ApiEnvelope, String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read response from {}: {}", path, e))?;

        let envelope: ApiEnvelope = serde_json::from_str(&body).map_err(|e| {
            format!(
                "invalid response from {} (HTTP {}): {}: {}",
                path, status, e, body
            )
        })?;

        if envelope.code != 0 {
            return Err(envelope.msg);
        }

        Ok(envelope)
    }

    fn decode<T: DeserializeOwned>(what: &str, data: Value) -> std::result::Result<T, String> {
        serde_json::from_value(data).map_err(|e| format!("malformed {}: {}", what, e))
    }

    async fn create_task(&self, task: &Task) -> Result<String> {
        let path = format!("tasks/{}", task.api_path());
        let envelope = self
            .post(&path, &task.body())
            .await
            .map_err(Error::remote_task)?;
        let created: TaskCreated =
            Self::decode("task creation response", envelope.data).map_err(Error::remote_task)?;
        Ok(created.task_uuid)
    }

    async fn task_status(&self, task_uuid: &str) -> Result<TaskStatus> {
        let envelope = self
            .get(&format!("task_statuses/{}", task_uuid))
            .await
            .map_err(Error::remote_task)?;
        Self::decode("task status", envelope.data).map_err(Error::remote_task)
    }
}

#[async_trait]
impl CloudClient for DdsClient {
    async fn upload_file(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::upload(format!("failed to read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::upload(format!("invalid file name: {}", path.display())))?;

        debug!("Uploading {} ({} bytes)", file_name, bytes.len());

        let envelope = self
            .post("upload_signature", &json!({ "file_name": file_name }))
            .await
            .map_err(Error::upload)?;
        let signature: UploadSignature =
            Self::decode("upload signature", envelope.data).map_err(Error::upload)?;

        let response = self
            .http
            .put(&signature.upload_url)
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::upload(format!("failed to upload {}: {}", file_name, e)))?;

        if !response.status().is_success() {
            return Err(Error::upload(format!(
                "upload of {} rejected with status {}",
                file_name,
                response.status()
            )));
        }

        debug!("Uploaded {} to {}", file_name, signature.url);
        Ok(signature.url)
    }

    async fn run_task(&self, task: &Task) -> Result<TaskResult> {
        let task_uuid = self.create_task(task).await?;
        debug!("Created task {} ({})", task_uuid, task.api_path());

        loop {
            let status = self.task_status(&task_uuid).await?;
            match status.status {
                TaskState::Success => {
                    debug!("Task {} succeeded", task_uuid);
                    return status.result.ok_or_else(|| {
                        Error::remote_task(format!("task {} finished without result", task_uuid))
                    });
                }
                TaskState::Failed => {
                    return Err(Error::remote_task(status.error.unwrap_or_else(|| {
                        format!("task {} failed", task_uuid)
                    })));
                }
                TaskState::Waiting | TaskState::Running => {}
                TaskState::Unknown => {
                    warn!("Task {} reported an unknown status, still polling", task_uuid);
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
