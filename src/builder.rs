use crate::{
    Error, Result,
    api::{
        BatchEmbdInfer, BatchEmbdPrompt, BatchInfer, BatchPointPrompt, BatchPrompts,
        BatchRectPrompt, Task,
    },
    prompt::{
        EmbeddingItem, GenericPrompt, ImageInput, InteractiveItem, InteractivePrompts,
        PromptKind, VisualPrompt,
    },
    resolver::ImageResolver,
};
use tracing::debug;

/// Builds fully resolved tasks for each call mode.
pub struct RequestBuilder<'a> {
    resolver: &'a ImageResolver<'a>,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(resolver: &'a ImageResolver<'a>) -> Self {
        Self { resolver }
    }

    pub async fn interactive(&self, items: &[InteractiveItem]) -> Result<Task> {
        let mut batches = Vec::with_capacity(items.len());
        for item in items {
            let image = self.resolver.resolve(&item.image).await?;
            let batch = match &item.prompts {
                InteractivePrompts::Rect(prompts) => BatchInfer::Rect {
                    image,
                    prompts: prompts
                        .iter()
                        .map(|prompt| BatchRectPrompt {
                            category_id: Some(prompt.category_id),
                            image: None,
                            rects: prompt.rects.clone(),
                        })
                        .collect(),
                },
                InteractivePrompts::Point(prompts) => BatchInfer::Point {
                    image,
                    prompts: prompts
                        .iter()
                        .map(|prompt| BatchPointPrompt {
                            category_id: Some(prompt.category_id),
                            image: None,
                            points: prompt.points.clone(),
                        })
                        .collect(),
                },
            };
            debug!(
                "Built {} batch with {} prompts",
                batch.kind(),
                item.prompts.len()
            );
            batches.push(batch);
        }
        Ok(Task::InteractiveInfer(batches))
    }

    pub async fn generic(&self, target: &ImageInput, prompts: &[GenericPrompt]) -> Result<Task> {
        let kind = uniform_kind(prompts)?;
        let image = self.resolver.resolve(target).await?;
        let prompts = self.reference_prompts(kind, prompts).await?;
        Ok(Task::GenericInfer { image, prompts })
    }

    pub async fn customize_embedding(&self, prompts: &[GenericPrompt]) -> Result<Task> {
        let kind = uniform_kind(prompts)?;
        let prompts = self.reference_prompts(kind, prompts).await?;
        Ok(Task::EmbdCustomize(prompts))
    }

    pub async fn embedding(&self, items: &[EmbeddingItem]) -> Result<Task> {
        let mut batches = Vec::with_capacity(items.len());
        for item in items {
            let image = self.resolver.resolve(&item.image).await?;
            let mut prompts = Vec::with_capacity(item.prompts.len());
            for prompt in &item.prompts {
                prompts.push(BatchEmbdPrompt {
                    category_id: prompt.category_id,
                    embd: self.resolver.resolve(&prompt.embedding).await?,
                });
            }
            batches.push(BatchEmbdInfer { image, prompts });
        }
        Ok(Task::EmbdInfer(batches))
    }

    async fn reference_prompts(
        &self,
        kind: PromptKind,
        prompts: &[GenericPrompt],
    ) -> Result<BatchPrompts> {
        let mut rects = Vec::new();
        let mut points = Vec::new();
        for prompt in prompts {
            let image = Some(self.resolver.resolve(&prompt.image).await?);
            match &prompt.prompt {
                VisualPrompt::Rects(boxes) => rects.push(BatchRectPrompt {
                    category_id: None,
                    image,
                    rects: boxes.clone(),
                }),
                VisualPrompt::Points(coords) => points.push(BatchPointPrompt {
                    category_id: None,
                    image,
                    points: coords.clone(),
                }),
            }
        }

        Ok(match kind {
            PromptKind::Rect => BatchPrompts::Rect(rects),
            PromptKind::Point => BatchPrompts::Point(points),
        })
    }
}

/// Returns the single prompt modality shared by every entry.
pub fn uniform_kind(prompts: &[GenericPrompt]) -> Result<PromptKind> {
    let mut found: Vec<PromptKind> = Vec::new();
    for prompt in prompts {
        let kind = prompt.prompt.kind();
        if !found.contains(&kind) {
            found.push(kind);
        }
    }

    match found.as_slice() {
        [] => Err(Error::EmptyPrompts),
        [kind] => Ok(*kind),
        _ => Err(Error::InconsistentPromptType { found }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_uniform_kind_single_modality() {
        let prompts = vec![
            GenericPrompt::rects("p1.jpg", vec![[692.0, 338.0, 725.0, 459.0]]),
            GenericPrompt::rects("p2.jpg", vec![[561.0, 231.0, 634.0, 351.0]]),
        ];
        assert_eq!(uniform_kind(&prompts).unwrap(), PromptKind::Rect);
    }

    #[test]
    fn test_uniform_kind_mixed_modalities() {
        let prompts = vec![
            GenericPrompt::rects("p1.jpg", vec![[0.0, 0.0, 1.0, 1.0]]),
            GenericPrompt::points("p2.jpg", vec![[0.5, 0.5]]),
            GenericPrompt::rects("p3.jpg", vec![[0.0, 0.0, 2.0, 2.0]]),
        ];

        match uniform_kind(&prompts) {
            Err(Error::InconsistentPromptType { found }) => {
                assert_eq!(found, vec![PromptKind::Rect, PromptKind::Point]);
            }
            other => panic!("expected InconsistentPromptType, got {:?}", other),
        }
    }

    #[test]
    fn test_uniform_kind_empty() {
        assert!(matches!(uniform_kind(&[]), Err(Error::EmptyPrompts)));
    }
}
