mod client;
mod types;

pub use client::{CloudClient, DdsClient};
pub use types::{
    ApiEnvelope, BatchEmbdInfer, BatchEmbdPrompt, BatchInfer, BatchPointPrompt, BatchPrompts,
    BatchRectPrompt, RawObject, Task, TaskCreated, TaskResult, TaskState, TaskStatus,
    UploadSignature,
};
