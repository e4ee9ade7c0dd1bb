use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use trex_rust::{
    Error, Result,
    api::{CloudClient, Task, TaskResult},
};

/// Upload seen by the mock, with whether the file existed at that moment
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub path: PathBuf,
    pub existed: bool,
}

/// Mock cloud client for testing
#[derive(Debug)]
pub struct MockCloudClient {
    pub uploads: Arc<Mutex<Vec<RecordedUpload>>>,
    pub tasks: Arc<Mutex<Vec<Task>>>,
    pub result: TaskResult,
    pub upload_error: Option<String>,
    pub task_error: Option<String>,
}

impl MockCloudClient {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            tasks: Arc::new(Mutex::new(Vec::new())),
            result: TaskResult::default(),
            upload_error: None,
            task_error: None,
        }
    }

    pub fn with_result(mut self, result: TaskResult) -> Self {
        self.result = result;
        self
    }

    pub fn with_upload_error(mut self, error: &str) -> Self {
        self.upload_error = Some(error.to_string());
        self
    }

    pub fn with_task_error(mut self, error: &str) -> Self {
        self.task_error = Some(error.to_string());
        self
    }

    pub fn get_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn get_tasks(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }
}

impl Default for MockCloudClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CloudClient for MockCloudClient {
    async fn upload_file(&self, path: &Path) -> Result<String> {
        self.uploads.lock().unwrap().push(RecordedUpload {
            path: path.to_path_buf(),
            existed: path.exists(),
        });

        if let Some(ref error) = self.upload_error {
            return Err(Error::upload(error.clone()));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(format!("https://files.test/{}", file_name))
    }

    async fn run_task(&self, task: &Task) -> Result<TaskResult> {
        self.tasks.lock().unwrap().push(task.clone());

        if let Some(ref error) = self.task_error {
            return Err(Error::remote_task(error.clone()));
        }

        Ok(self.result.clone())
    }
}
