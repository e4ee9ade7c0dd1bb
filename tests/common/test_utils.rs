use std::path::PathBuf;
use tempfile::TempDir;
use trex_rust::{
    api::{RawObject, TaskResult},
    config::ApiConfig,
    prompt::BoxXyxy,
};

/// Create an API configuration pointing at a test server
pub fn create_test_api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        token: "test-token".to_string(),
        poll_interval_ms: 10,
        request_timeout_secs: 5,
    }
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Write a file into a temporary directory and return its path
pub fn write_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

pub fn create_raw_object(score: f32, category_id: Option<u32>, bbox: BoxXyxy) -> RawObject {
    RawObject {
        category_id,
        score,
        bbox,
    }
}

pub fn create_batches_result(object_batches: Vec<Vec<RawObject>>) -> TaskResult {
    TaskResult {
        object_batches: Some(object_batches),
        ..TaskResult::default()
    }
}

pub fn create_objects_result(objects: Vec<RawObject>) -> TaskResult {
    TaskResult {
        objects: Some(objects),
        ..TaskResult::default()
    }
}

pub fn create_embd_result(url: &str) -> TaskResult {
    TaskResult {
        embd: Some(url.to_string()),
        ..TaskResult::default()
    }
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
api:
  base_url: "http://127.0.0.1:9000"
  token: "yaml-token"
  poll_interval_ms: 50
logs:
  level: "debug"
"#;
