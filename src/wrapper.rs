use crate::{
    Error, Result,
    api::{CloudClient, DdsClient, Task, TaskResult},
    builder::RequestBuilder,
    config::ApiConfig,
    normalize::{DetectionResult, normalize, normalize_one},
    prompt::{EmbeddingItem, GenericPrompt, ImageInput, InteractiveItem},
    resolver::ImageResolver,
};
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

/// Entry point for T-Rex2 calls.
///
/// Holds the authenticated client and nothing else, so one value can be
/// cloned into as many concurrent callers as needed. Batches of the
/// interactive and embedding modes are limited to 4 images by the service.
#[derive(Clone)]
pub struct Trex2Api {
    client: Arc<dyn CloudClient>,
}

impl Trex2Api {
    pub fn new(client: Arc<dyn CloudClient>) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(DdsClient::new(config)?)))
    }

    /// Runs box or point prompts on each image and returns detections for
    /// that same image, one result per item.
    pub async fn interactive_inference(
        &self,
        items: &[InteractiveItem],
    ) -> Result<Vec<DetectionResult>> {
        let span = info_span!("interactive_inference", call_id = %Uuid::new_v4(), items = items.len());
        async {
            let resolver = ImageResolver::new(self.client.as_ref());
            let task = RequestBuilder::new(&resolver).interactive(items).await?;
            let result = self.submit(&task).await?;
            let batches = result
                .object_batches
                .ok_or_else(|| Error::remote_task("task result has no object_batches"))?;
            Ok(normalize(batches))
        }
        .instrument(span)
        .await
    }

    /// Finds instances of the category shown on every reference image in
    /// `target`. All references must use the same prompt type.
    pub async fn generic_inference(
        &self,
        target: &ImageInput,
        prompts: &[GenericPrompt],
    ) -> Result<DetectionResult> {
        let span = info_span!("generic_inference", call_id = %Uuid::new_v4(), prompts = prompts.len());
        async {
            let resolver = ImageResolver::new(self.client.as_ref());
            let task = RequestBuilder::new(&resolver)
                .generic(target, prompts)
                .await?;
            let result = self.submit(&task).await?;
            let objects = result
                .objects
                .ok_or_else(|| Error::remote_task("task result has no objects"))?;
            Ok(normalize_one(objects))
        }
        .instrument(span)
        .await
    }

    /// Condenses the reference prompts into one embedding and returns the
    /// URL it can be downloaded from.
    pub async fn customize_embedding(&self, prompts: &[GenericPrompt]) -> Result<String> {
        let span = info_span!("customize_embedding", call_id = %Uuid::new_v4(), prompts = prompts.len());
        async {
            let resolver = ImageResolver::new(self.client.as_ref());
            let task = RequestBuilder::new(&resolver)
                .customize_embedding(prompts)
                .await?;
            let result = self.submit(&task).await?;
            let embd = result
                .embd
                .ok_or_else(|| Error::remote_task("task result has no embd"))?;
            info!("Customized embedding available at {}", embd);
            Ok(embd)
        }
        .instrument(span)
        .await
    }

    /// Runs saved embeddings as prompts on each image.
    pub async fn embedding_inference(
        &self,
        items: &[EmbeddingItem],
    ) -> Result<Vec<DetectionResult>> {
        let span = info_span!("embedding_inference", call_id = %Uuid::new_v4(), items = items.len());
        async {
            let resolver = ImageResolver::new(self.client.as_ref());
            let task = RequestBuilder::new(&resolver).embedding(items).await?;
            let result = self.submit(&task).await?;
            let batches = result
                .object_batches
                .ok_or_else(|| Error::remote_task("task result has no object_batches"))?;
            Ok(normalize(batches))
        }
        .instrument(span)
        .await
    }

    async fn submit(&self, task: &Task) -> Result<TaskResult> {
        debug!("Submitting {} task", task.api_path());
        self.client.run_task(task).await
    }
}
