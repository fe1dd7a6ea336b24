use crate::{PixelImage, PreprocessError};
use common::span;
use image::ImageFormat;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Compressed formats a [`PixelImage`] can be written back to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EncodeFormat {
    #[default]
    Jpeg,
    Png,
}

impl EncodeFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            EncodeFormat::Jpeg => "jpg",
            EncodeFormat::Png => "png",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            EncodeFormat::Jpeg => ImageFormat::Jpeg,
            EncodeFormat::Png => ImageFormat::Png,
        }
    }
}

/// Decode an encoded image buffer into 8-bit RGB, dropping alpha and any
/// other extra channels.
pub fn decode(bytes: &[u8]) -> Result<PixelImage, PreprocessError> {
    let _s = span!("decode");

    let image = image::load_from_memory(bytes).map_err(PreprocessError::Decode)?;
    let (width, height) = (image.width(), image.height());

    tracing::trace!(
        width,
        height,
        color = ?image.color(),
        encoded_bytes = bytes.len(),
        "Decoded image"
    );

    if width == 0 || height == 0 {
        return Err(PreprocessError::EmptyImage { width, height });
    }

    Ok(image.into_rgb8())
}

pub fn encode(image: &PixelImage, format: EncodeFormat) -> Result<Vec<u8>, PreprocessError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format.image_format())
        .map_err(PreprocessError::Encode)?;
    Ok(buffer.into_inner())
}

/// Write `image` to `<dir>/<stem>.<ext>`, creating `dir` if needed.
pub fn save_diagnostic(
    image: &PixelImage,
    dir: &Path,
    stem: &str,
    format: EncodeFormat,
) -> Result<PathBuf, PreprocessError> {
    let bytes = encode(image, format)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", stem, format.extension()));
    fs::write(&path, bytes)?;

    tracing::debug!(path = %path.display(), "Saved preprocessed image");
    Ok(path)
}
