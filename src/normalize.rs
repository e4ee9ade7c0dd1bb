use crate::{api::RawObject, prompt::BoxXyxy};
use serde::Serialize;

/// Label used for objects that come back without a category id, which is
/// the case for class-agnostic generic inference.
pub const DEFAULT_LABEL: u32 = 0;

/// Detections for one image. `scores`, `labels` and `boxes` are co-indexed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionResult {
    scores: Vec<f32>,
    labels: Vec<u32>,
    boxes: Vec<BoxXyxy>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection<'a> {
    pub score: f32,
    pub label: u32,
    pub bbox: &'a BoxXyxy,
}

impl DetectionResult {
    pub fn push(&mut self, score: f32, label: u32, bbox: BoxXyxy) {
        self.scores.push(score);
        self.labels.push(label);
        self.boxes.push(bbox);
    }

    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub fn boxes(&self) -> &[BoxXyxy] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Detection<'_>> {
        self.scores
            .iter()
            .zip(&self.labels)
            .zip(&self.boxes)
            .map(|((&score, &label), bbox)| Detection { score, label, bbox })
    }

    /// Keeps detections whose score is strictly above `threshold`.
    pub fn retain_above(&self, threshold: f32) -> Self {
        let mut filtered = Self::default();
        for detection in self.iter().filter(|d| d.score > threshold) {
            filtered.push(detection.score, detection.label, *detection.bbox);
        }
        filtered
    }
}

impl FromIterator<RawObject> for DetectionResult {
    fn from_iter<I: IntoIterator<Item = RawObject>>(objects: I) -> Self {
        let mut result = Self::default();
        for object in objects {
            result.push(
                object.score,
                object.category_id.unwrap_or(DEFAULT_LABEL),
                object.bbox,
            );
        }
        result
    }
}

/// Normalizes one batch of objects per image, keeping the service's order.
pub fn normalize(object_batches: Vec<Vec<RawObject>>) -> Vec<DetectionResult> {
    object_batches
        .into_iter()
        .map(DetectionResult::from_iter)
        .collect()
}

pub fn normalize_one(objects: Vec<RawObject>) -> DetectionResult {
    objects.into_iter().collect()
}
