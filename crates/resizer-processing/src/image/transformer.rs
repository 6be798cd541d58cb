//! Image transformer
//!
//! Decode whatever format the upload is in, stretch it to exactly the
//! requested size and re-encode as baseline JPEG.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader, Rgb, RgbImage};
use resizer_core::Dimensions;
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    Encode(String),
}

impl From<TransformError> for resizer_core::AppError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::Decode(msg) => resizer_core::AppError::Decode(msg),
            TransformError::Encode(msg) => resizer_core::AppError::Encode(msg),
        }
    }
}

pub struct ImageTransformer;

impl ImageTransformer {
    /// Decode `data`, resize to exactly `dimensions` ignoring aspect ratio,
    /// and encode as JPEG at `quality`.
    ///
    /// Transparent pixels are composited onto white. No metadata is carried
    /// over to the output.
    pub fn resize_to_jpeg(
        data: &[u8],
        dimensions: &Dimensions,
        quality: u8,
    ) -> Result<Bytes, TransformError> {
        let img = Self::decode(data)?;
        let (orig_width, orig_height) = img.dimensions();

        let resized = img.resize_exact(dimensions.width, dimensions.height, FilterType::Lanczos3);

        tracing::debug!(
            orig_width = orig_width,
            orig_height = orig_height,
            width = dimensions.width,
            height = dimensions.height,
            "Image resized"
        );

        let rgb = flatten_onto_white(&resized);

        let estimated_size = dimensions.pixel_count() as usize / 4;
        let mut buffer = Vec::with_capacity(estimated_size);
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        DynamicImage::ImageRgb8(rgb)
            .write_with_encoder(encoder)
            .map_err(|e| TransformError::Encode(e.to_string()))?;

        Ok(Bytes::from(buffer))
    }

    fn decode(data: &[u8]) -> Result<DynamicImage, TransformError> {
        if data.is_empty() {
            return Err(TransformError::Decode("source object is empty".to_string()));
        }

        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| TransformError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| TransformError::Decode(e.to_string()))
    }
}

fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (src, dst) in rgba.pixels().zip(out.pixels_mut()) {
        let alpha = u32::from(src[3]);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        *dst = Rgb([blend(src[0]), blend(src[1]), blend(src[2])]);
    }
    out
}
