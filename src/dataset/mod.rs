mod types;

pub use types::*;

use crate::{Error, Result};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// A COCO-format counting dataset with an optional exemplar map of
/// `file_name -> [[x, y, w, h], ...]`.
pub struct CountingDataset {
    img_dir: PathBuf,
    images: Vec<CocoImage>,
    annotations: HashMap<u64, Vec<CocoAnnotation>>,
    categories: Vec<CocoCategory>,
    exemplars: Option<HashMap<String, Vec<[f32; 4]>>>,
}

impl CountingDataset {
    pub async fn open(
        img_dir: impl AsRef<Path>,
        ann_file: impl AsRef<Path>,
        exemplar_file: Option<&Path>,
    ) -> Result<Self> {
        let ann_file = ann_file.as_ref();
        debug!("Loading annotations from: {}", ann_file.display());

        let content = tokio::fs::read_to_string(ann_file).await?;
        let coco: CocoFile = serde_json::from_str(&content)?;

        let exemplars = match exemplar_file {
            Some(path) => {
                debug!("Loading exemplars from: {}", path.display());
                let content = tokio::fs::read_to_string(path).await?;
                Some(serde_json::from_str(&content)?)
            }
            None => None,
        };

        let dataset = Self::from_parts(img_dir.as_ref().to_path_buf(), coco, exemplars);
        info!(
            "Loaded {} images from {}",
            dataset.len(),
            ann_file.display()
        );
        Ok(dataset)
    }

    pub fn from_parts(
        img_dir: PathBuf,
        coco: CocoFile,
        exemplars: Option<HashMap<String, Vec<[f32; 4]>>>,
    ) -> Self {
        let mut images = coco.images;
        images.sort_by_key(|image| image.id);

        let mut annotations: HashMap<u64, Vec<CocoAnnotation>> = HashMap::new();
        for annotation in coco.annotations {
            annotations
                .entry(annotation.image_id)
                .or_default()
                .push(annotation);
        }

        Self {
            img_dir,
            images,
            annotations,
            categories: coco.categories,
            // An empty map means the dataset ships without exemplars.
            exemplars: exemplars.filter(|map| !map.is_empty()),
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn categories(&self) -> &[CocoCategory] {
        &self.categories
    }

    pub fn get(&self, idx: usize) -> Result<Option<Sample>> {
        let Some(image) = self.images.get(idx) else {
            return Ok(None);
        };

        let exemplar_boxes = match &self.exemplars {
            Some(map) => Some(map.get(&image.file_name).cloned().ok_or_else(|| {
                Error::dataset(format!("no exemplars for image {}", image.file_name))
            })?),
            None => None,
        };

        Ok(Some(Sample {
            image_id: image.id,
            image_path: self.img_dir.join(&image.file_name),
            annotations: self
                .annotations
                .get(&image.id)
                .cloned()
                .unwrap_or_default(),
            exemplar_boxes,
        }))
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<Sample>> + '_ {
        (0..self.len()).filter_map(move |idx| self.get(idx).transpose())
    }
}
