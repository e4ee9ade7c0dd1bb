use super::types::*;
use crate::{Error, Result};
use serde::{Deserialize, de::DeserializeOwned};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct RawInteractiveItem {
    #[serde(alias = "image")]
    pub prompt_image: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub prompts: Vec<RawCategoryPrompt>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCategoryPrompt {
    pub category_id: u32,
    #[serde(default)]
    pub rects: Option<Vec<BoxXyxy>>,
    #[serde(default)]
    pub points: Option<Vec<Point>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGenericPrompt {
    #[serde(alias = "image")]
    pub prompt_image: String,
    #[serde(default)]
    pub rects: Option<Vec<BoxXyxy>>,
    #[serde(default)]
    pub points: Option<Vec<Point>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEmbeddingItem {
    #[serde(alias = "prompt_image")]
    pub image: String,
    #[serde(default)]
    pub prompts: Vec<RawEmbeddingPrompt>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEmbeddingPrompt {
    pub category_id: u32,
    pub embd: String,
}

impl TryFrom<RawInteractiveItem> for InteractiveItem {
    type Error = Error;

    fn try_from(raw: RawInteractiveItem) -> Result<Self> {
        let kind: PromptKind = raw.kind.parse()?;
        let prompts = match kind {
            PromptKind::Rect => InteractivePrompts::Rect(
                raw.prompts
                    .into_iter()
                    .map(|prompt| {
                        let rects = prompt.rects.ok_or_else(|| {
                            Error::invalid_prompt_type(format!(
                                "rect prompt for category {} has no rects",
                                prompt.category_id
                            ))
                        })?;
                        Ok(RectPrompt {
                            category_id: prompt.category_id,
                            rects,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
            PromptKind::Point => InteractivePrompts::Point(
                raw.prompts
                    .into_iter()
                    .map(|prompt| {
                        let points = prompt.points.ok_or_else(|| {
                            Error::invalid_prompt_type(format!(
                                "point prompt for category {} has no points",
                                prompt.category_id
                            ))
                        })?;
                        Ok(PointPrompt {
                            category_id: prompt.category_id,
                            points,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        Ok(InteractiveItem {
            image: ImageInput::parse(&raw.prompt_image),
            prompts,
        })
    }
}

impl TryFrom<RawGenericPrompt> for GenericPrompt {
    type Error = Error;

    fn try_from(raw: RawGenericPrompt) -> Result<Self> {
        let prompt = match (raw.rects, raw.points) {
            (Some(rects), None) => VisualPrompt::Rects(rects),
            (None, Some(points)) => VisualPrompt::Points(points),
            (Some(_), Some(_)) => {
                return Err(Error::invalid_prompt_type(format!(
                    "{}: rects and points can not be provided at the same time",
                    raw.prompt_image
                )));
            }
            (None, None) => {
                return Err(Error::invalid_prompt_type(format!(
                    "{}: either rects or points is required",
                    raw.prompt_image
                )));
            }
        };

        Ok(GenericPrompt {
            image: ImageInput::parse(&raw.prompt_image),
            prompt,
        })
    }
}

impl From<RawEmbeddingItem> for EmbeddingItem {
    fn from(raw: RawEmbeddingItem) -> Self {
        EmbeddingItem {
            image: ImageInput::parse(&raw.image),
            prompts: raw
                .prompts
                .into_iter()
                .map(|prompt| EmbeddingPrompt {
                    category_id: prompt.category_id,
                    embedding: ImageInput::parse(&prompt.embd),
                })
                .collect(),
        }
    }
}

/// Reads a JSON array of loose prompt descriptions from `path`.
pub async fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    debug!("Loading prompts from: {}", path.display());

    let content = tokio::fs::read_to_string(path).await?;
    let items: Vec<T> = serde_json::from_str(&content)?;
    Ok(items)
}

pub fn parse_interactive(raw: Vec<RawInteractiveItem>) -> Result<Vec<InteractiveItem>> {
    raw.into_iter().map(InteractiveItem::try_from).collect()
}

pub fn parse_generic(raw: Vec<RawGenericPrompt>) -> Result<Vec<GenericPrompt>> {
    raw.into_iter().map(GenericPrompt::try_from).collect()
}

pub fn parse_embedding(raw: Vec<RawEmbeddingItem>) -> Vec<EmbeddingItem> {
    raw.into_iter().map(EmbeddingItem::from).collect()
}
