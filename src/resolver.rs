use crate::{Result, api::CloudClient, prompt::ImageInput};
use image::{DynamicImage, ImageFormat};
use std::io::{Cursor, Write};
use tempfile::NamedTempFile;
use tracing::debug;

/// Turns local images into references the cloud API can read.
pub struct ImageResolver<'a> {
    client: &'a dyn CloudClient,
}

impl<'a> ImageResolver<'a> {
    pub fn new(client: &'a dyn CloudClient) -> Self {
        Self { client }
    }

    pub async fn resolve(&self, input: &ImageInput) -> Result<String> {
        match input {
            ImageInput::Url(url) => Ok(url.clone()),
            ImageInput::Path(path) => self.client.upload_file(path).await,
            ImageInput::Pixels(image) => self.upload_pixels(image).await,
        }
    }

    async fn upload_pixels(&self, image: &DynamicImage) -> Result<String> {
        let image = image.clone();
        // Removed when `tmp_file` drops, whether or not the upload succeeded.
        let tmp_file = tokio::task::spawn_blocking(move || write_png(image))
            .await
            .map_err(std::io::Error::other)??;

        self.client.upload_file(tmp_file.path()).await
    }
}

/// PNG has no float pixel layout, so float buffers are stored as 16-bit.
fn write_png(image: DynamicImage) -> Result<NamedTempFile> {
    let image = match image {
        DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb16(image.to_rgb16()),
        DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba16(image.to_rgba16()),
        other => other,
    };

    let mut encoded = Vec::new();
    image.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)?;

    let mut tmp_file = tempfile::Builder::new()
        .prefix("trex-")
        .suffix(".png")
        .tempfile()?;
    tmp_file.write_all(&encoded)?;
    tmp_file.flush()?;

    debug!(
        "Encoded {}x{} image to {}",
        image.width(),
        image.height(),
        tmp_file.path().display()
    );
    Ok(tmp_file)
}
