//! Geometric transforms applied before packing.
//!
//! Every transform samples with the triangle (bilinear) filter and uses integer
//! arithmetic for sizes and offsets, so crop windows land on the same pixels the
//! network saw during training.

use crate::{PixelImage, PreprocessError};
use common::span;
use image::imageops::{self, FilterType};

pub const RESAMPLE_FILTER: FilterType = FilterType::Triangle;

/// Shrink `image` so that neither side exceeds `max_size`, keeping aspect ratio.
///
/// Images already within bounds are returned untouched (same buffer, no
/// resampling). Otherwise the longer side becomes `max_size` and the shorter
/// side `max_size * shorter / longer`, truncated.
pub fn resize_down_to_max(image: PixelImage, max_size: u32) -> PixelImage {
    debug_assert!(max_size > 0, "max_size must be non-zero");

    let (width, height) = image.dimensions();
    let (new_width, new_height) = fit_within(width, height, max_size);
    if (new_width, new_height) == (width, height) {
        return image;
    }

    let _s = span!("resize_down_to_max");
    tracing::trace!(width, height, new_width, new_height, "Downscaling image");

    imageops::resize(&image, new_width, new_height, RESAMPLE_FILTER)
}

/// Target size for [`resize_down_to_max`].
pub fn fit_within(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    if width <= max_size && height <= max_size {
        return (width, height);
    }

    if width >= height {
        (max_size, scale_side(height, width, max_size))
    } else {
        (scale_side(width, height, max_size), max_size)
    }
}

// Never rounds down to an empty side.
fn scale_side(shorter: u32, longer: u32, max_size: u32) -> u32 {
    let scaled = u64::from(max_size) * u64::from(shorter) / u64::from(longer);
    scaled.max(1) as u32
}

/// Resize to `size` x `size`, ignoring aspect ratio.
pub fn resize_exact(image: &PixelImage, size: u32) -> Result<PixelImage, PreprocessError> {
    let _s = span!("resize_exact");

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PreprocessError::EmptyImage { width, height });
    }

    Ok(imageops::resize(image, size, size, RESAMPLE_FILTER))
}

/// Top-left corner of a `crop_width` x `crop_height` window centered in a
/// `width` x `height` image. Callers check that the window fits.
fn center_origin(width: u32, height: u32, crop_width: u32, crop_height: u32) -> (u32, u32) {
    debug_assert!(crop_width <= width && crop_height <= height);
    (width / 2 - crop_width / 2, height / 2 - crop_height / 2)
}

/// Extract the centered `crop_width` x `crop_height` window.
///
/// Fails with [`PreprocessError::OutOfBounds`] when the window is larger than
/// the image on either axis.
pub fn crop_center(
    image: &PixelImage,
    crop_width: u32,
    crop_height: u32,
) -> Result<PixelImage, PreprocessError> {
    let _s = span!("crop_center");

    let (width, height) = image.dimensions();
    if crop_width > width || crop_height > height {
        return Err(PreprocessError::OutOfBounds {
            crop_width,
            crop_height,
            width,
            height,
        });
    }

    let (x, y) = center_origin(width, height, crop_width, crop_height);
    tracing::trace!(width, height, crop_width, crop_height, x, y, "Center crop");

    Ok(imageops::crop_imm(image, x, y, crop_width, crop_height).to_image())
}

/// Centered square whose side is the shorter image dimension.
pub fn crop_center_square(image: &PixelImage) -> PixelImage {
    let (width, height) = image.dimensions();
    let side = width.min(height);
    let (x, y) = center_origin(width, height, side, side);

    imageops::crop_imm(image, x, y, side, side).to_image()
}
