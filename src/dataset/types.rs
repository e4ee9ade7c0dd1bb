use crate::prompt::{BoxXyxy, GenericPrompt, ImageInput};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoFile {
    pub images: Vec<CocoImage>,
    #[serde(default)]
    pub annotations: Vec<CocoAnnotation>,
    #[serde(default)]
    pub categories: Vec<CocoCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: u64,
    pub file_name: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoAnnotation {
    pub id: u64,
    pub image_id: u64,
    pub category_id: u32,
    /// `[x, y, width, height]`
    pub bbox: [f32; 4],
    #[serde(default)]
    pub area: Option<f32>,
    #[serde(default)]
    pub iscrowd: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoCategory {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Sample {
    pub image_id: u64,
    pub image_path: PathBuf,
    pub annotations: Vec<CocoAnnotation>,
    /// Exemplar boxes in `[x, y, width, height]`, when an exemplar file was given.
    pub exemplar_boxes: Option<Vec<[f32; 4]>>,
}

impl Sample {
    pub fn ground_truth_count(&self) -> usize {
        self.annotations.len()
    }

    pub fn exemplar_rects(&self) -> Option<Vec<BoxXyxy>> {
        self.exemplar_boxes
            .as_ref()
            .map(|boxes| boxes.iter().map(|&b| xywh_to_xyxy(b)).collect())
    }

    /// The sample's exemplars as a reference prompt for generic inference.
    pub fn generic_prompt(&self) -> Option<GenericPrompt> {
        self.exemplar_rects()
            .map(|rects| GenericPrompt::rects(ImageInput::Path(self.image_path.clone()), rects))
    }
}

pub fn xywh_to_xyxy([x, y, w, h]: [f32; 4]) -> BoxXyxy {
    [x, y, x + w, y + h]
}
