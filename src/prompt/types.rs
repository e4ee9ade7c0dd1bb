use crate::{Error, Result};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};

/// Axis-aligned box as `[xmin, ymin, xmax, ymax]`.
pub type BoxXyxy = [f32; 4];

/// Point as `[x, y]`.
pub type Point = [f32; 2];

/// Something that can be turned into a remote reference: a local file, an
/// already uploaded URL, or pixels held in memory.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Path(PathBuf),
    Url(String),
    /// Uploaded as PNG; float buffers are stored at 16 bits per channel.
    Pixels(DynamicImage),
}

impl ImageInput {
    /// Interprets `http://` and `https://` strings as remote references,
    /// everything else as a local path.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::Path(PathBuf::from(value))
        }
    }
}

impl From<DynamicImage> for ImageInput {
    fn from(image: DynamicImage) -> Self {
        Self::Pixels(image)
    }
}

impl From<PathBuf> for ImageInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&str> for ImageInput {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Rect,
    Point,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Point => "point",
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rect" => Ok(Self::Rect),
            "point" => Ok(Self::Point),
            other => Err(Error::invalid_prompt_type(format!(
                "expected 'rect' or 'point', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectPrompt {
    pub category_id: u32,
    pub rects: Vec<BoxXyxy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointPrompt {
    pub category_id: u32,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingPrompt {
    pub category_id: u32,
    pub embedding: ImageInput,
}

/// Prompts of one interactive item. An item is either all boxes or all points.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractivePrompts {
    Rect(Vec<RectPrompt>),
    Point(Vec<PointPrompt>),
}

impl InteractivePrompts {
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
}

#[derive(Debug, Clone)]
pub struct InteractiveItem {
    pub image: ImageInput,
    pub prompts: InteractivePrompts,
}

impl InteractiveItem {
    pub fn rect(image: impl Into<ImageInput>, prompts: Vec<RectPrompt>) -> Self {
        Self {
            image: image.into(),
            prompts: InteractivePrompts::Rect(prompts),
        }
    }

    pub fn point(image: impl Into<ImageInput>, prompts: Vec<PointPrompt>) -> Self {
        Self {
            image: image.into(),
            prompts: InteractivePrompts::Point(prompts),
        }
    }
}

/// Geometry drawn on a single reference image.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualPrompt {
    Rects(Vec<BoxXyxy>),
    Points(Vec<Point>),
}

impl VisualPrompt {
    pub fn kind(&self) -> PromptKind {
        match self {
            Self::Rects(_) => PromptKind::Rect,
            Self::Points(_) => PromptKind::Point,
        }
    }
}

/// One reference image for generic inference or embedding customization.
/// It carries no category id: every entry describes the same single category.
#[derive(Debug, Clone)]
pub struct GenericPrompt {
    pub image: ImageInput,
    pub prompt: VisualPrompt,
}

impl GenericPrompt {
    pub fn rects(image: impl Into<ImageInput>, rects: Vec<BoxXyxy>) -> Self {
        Self {
            image: image.into(),
            prompt: VisualPrompt::Rects(rects),
        }
    }

    pub fn points(image: impl Into<ImageInput>, points: Vec<Point>) -> Self {
        Self {
            image: image.into(),
            prompt: VisualPrompt::Points(points),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingItem {
    pub image: ImageInput,
    pub prompts: Vec<EmbeddingPrompt>,
}
