use crate::prompt::PromptKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid prompt type: {0}")]
    InvalidPromptType(String),

    #[error("Prompt type must be consistent, found: {}", format_kinds(.found))]
    InconsistentPromptType { found: Vec<PromptKind> },

    #[error("At least one prompt is required")]
    EmptyPrompts,

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Remote task failed: {0}")]
    RemoteTask(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

fn format_kinds(kinds: &[PromptKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    pub fn invalid_prompt_type(msg: impl Into<String>) -> Self {
        Self::InvalidPromptType(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    pub fn remote_task(msg: impl Into<String>) -> Self {
        Self::RemoteTask(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }
}
