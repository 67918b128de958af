//! Downscale-and-reencode for the image compressor tool.

use std::{fs, io::Cursor, path::Path};

use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, GenericImageView};
use tracing::{debug, info};

pub const DEFAULT_QUALITY: f32 = 0.6;
pub const DEFAULT_MAX_DIMENSION: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressOptions {
    /// JPEG quality in `0.0..=1.0`.
    pub quality: f32,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            max_width: DEFAULT_MAX_DIMENSION,
            max_height: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl CompressOptions {
    fn validate(&self) -> Result<(), CompressionError> {
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(CompressionError::InvalidQuality(self.quality));
        }
        if self.max_width == 0 || self.max_height == 0 {
            return Err(CompressionError::InvalidBounds {
                max_width: self.max_width,
                max_height: self.max_height,
            });
        }
        Ok(())
    }

    fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("Please select an image.")]
    MissingInput,
    #[error("quality must be between 0 and 1, got {0}")]
    InvalidQuality(f32),
    #[error("max dimensions must be positive, got {max_width}x{max_height}")]
    InvalidBounds { max_width: u32, max_height: u32 },
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Compressed {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
}

/// Largest size with the same aspect ratio that fits the bounds. Never
/// upscales.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    (
        ((width as f64 * scale).round() as u32).clamp(1, max_width),
        ((height as f64 * scale).round() as u32).clamp(1, max_height),
    )
}

pub fn compress_bytes(bytes: &[u8], options: &CompressOptions) -> Result<Compressed, CompressionError> {
    options.validate()?;
    let decoded =
        image::load_from_memory(bytes).map_err(|err| CompressionError::Decode(err.to_string()))?;

    let (original_width, original_height) = decoded.dimensions();
    let (width, height) = fit_within(
        original_width,
        original_height,
        options.max_width,
        options.max_height,
    );
    let resized = if (width, height) == (original_width, original_height) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Triangle)
    };

    let rgb = resized.to_rgb8();
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, options.jpeg_quality())
        .encode_image(&rgb)
        .map_err(|err| CompressionError::Encode(err.to_string()))?;

    debug!(
        original_width,
        original_height,
        width,
        height,
        quality = options.jpeg_quality(),
        "compress: re-encoded"
    );
    Ok(Compressed {
        bytes: out.into_inner(),
        width,
        height,
        original_width,
        original_height,
    })
}

/// Compresses `input` into `output` and reports through exactly one of the
/// callbacks. Returns whether it succeeded.
pub fn compress_file(
    input: Option<&Path>,
    output: &Path,
    options: &CompressOptions,
    success: impl FnOnce(&Compressed),
    error: impl FnOnce(&CompressionError),
) -> bool {
    match run(input, output, options) {
        Ok(result) => {
            info!(
                output = %output.display(),
                bytes = result.bytes.len(),
                "compress: wrote image"
            );
            success(&result);
            true
        }
        Err(err) => {
            error(&err);
            false
        }
    }
}

fn run(
    input: Option<&Path>,
    output: &Path,
    options: &CompressOptions,
) -> Result<Compressed, CompressionError> {
    let Some(input) = input.filter(|path| path.is_file()) else {
        return Err(CompressionError::MissingInput);
    };
    let bytes = fs::read(input).map_err(|source| CompressionError::Io {
        path: input.display().to_string(),
        source,
    })?;
    let result = compress_bytes(&bytes, options)?;
    fs::write(output, &result.bytes).map_err(|source| CompressionError::Io {
        path: output.display().to_string(),
        source,
    })?;
    Ok(result)
}

#[cfg(test)]
#[path = "tests/compress_tests.rs"]
mod tests;
