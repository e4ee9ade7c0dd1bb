use crate::prompt::{BoxXyxy, Point, PromptKind};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRectPrompt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub rects: Vec<BoxXyxy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPointPrompt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEmbdPrompt {
    pub category_id: u32,
    pub embd: String,
}

/// One image of an interactive batch with the prompts drawn on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchInfer {
    Rect {
        image: String,
        prompts: Vec<BatchRectPrompt>,
    },
    Point {
        image: String,
        prompts: Vec<BatchPointPrompt>,
    },
}

impl BatchInfer {
    pub fn kind(&self) -> PromptKind {
        match self {
            Self::Rect { .. } => PromptKind::Rect,
            Self::Point { .. } => PromptKind::Point,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEmbdInfer {
    pub image: String,
    pub prompts: Vec<BatchEmbdPrompt>,
}

/// Reference-image prompts of a single modality.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchPrompts {
    Rect(Vec<BatchRectPrompt>),
    Point(Vec<BatchPointPrompt>),
}

impl BatchPrompts {
    pub fn kind(&self) -> PromptKind {
        match self {
            Self::Rect(_) => PromptKind::Rect,
            Self::Point(_) => PromptKind::Point,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Rect(prompts) => prompts.len(),
            Self::Point(prompts) => prompts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Rect(prompts) => json!(prompts),
            Self::Point(prompts) => json!(prompts),
        }
    }
}

/// A fully resolved request, ready to be submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    InteractiveInfer(Vec<BatchInfer>),
    GenericInfer { image: String, prompts: BatchPrompts },
    EmbdCustomize(BatchPrompts),
    EmbdInfer(Vec<BatchEmbdInfer>),
}

impl Task {
    pub fn api_path(&self) -> &'static str {
        match self {
            Self::InteractiveInfer(_) => "trex_interactive_inference",
            Self::GenericInfer { .. } => "trex_generic_inference",
            Self::EmbdCustomize(_) => "trex_embedding_customize",
            Self::EmbdInfer(_) => "trex_embedding_inference",
        }
    }

    pub fn body(&self) -> Value {
        match self {
            Self::InteractiveInfer(batches) => json!({ "prompts": batches }),
            Self::GenericInfer { image, prompts } => json!({
                "image": image,
                "type": prompts.kind(),
                "prompts": prompts.to_value(),
            }),
            Self::EmbdCustomize(prompts) => json!({
                "type": prompts.kind(),
                "prompts": prompts.to_value(),
            }),
            Self::EmbdInfer(batches) => json!({ "prompts": batches }),
        }
    }
}

/// A detected object as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObject {
    #[serde(default)]
    pub category_id: Option<u32>,
    pub score: f32,
    pub bbox: BoxXyxy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub object_batches: Option<Vec<Vec<RawObject>>>,
    #[serde(default)]
    pub objects: Option<Vec<RawObject>>,
    #[serde(default)]
    pub embd: Option<String>,
}

/// Envelope wrapping every JSON response of the cloud API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSignature {
    pub upload_url: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskCreated {
    pub task_uuid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Waiting,
    Running,
    Success,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatus {
    pub status: TaskState,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub result: Option<TaskResult>,
}
