use crate::{BGR_CHANNELS, PixelImage, PreprocessError};
use common::span;
use ndarray::Array4;

/// Network input, shape `[1, width, height, channels]`.
pub type Tensor = Array4<f32>;

/// Pack a `width` x `height` image into a `[1, width, height, 3]` tensor.
///
/// Element `[0, row, col, c]` holds pixel (row, col) with channels in B, G, R
/// order. Samples are the raw 0-255 values cast to `f32`, not normalized: the
/// network was trained on exactly this layout.
pub fn pack_bgr(
    image: &PixelImage,
    width: u32,
    height: u32,
    channels: usize,
) -> Result<Tensor, PreprocessError> {
    let _s = span!("pack_bgr");

    if channels != BGR_CHANNELS {
        return Err(PreprocessError::UnsupportedChannels(channels));
    }
    if width != height {
        return Err(PreprocessError::NonSquareInput { width, height });
    }
    if image.dimensions() != (width, height) {
        return Err(PreprocessError::ShapeMismatch {
            expected_width: width,
            expected_height: height,
            width: image.width(),
            height: image.height(),
        });
    }

    let mut tensor = Tensor::zeros((1, width as usize, height as usize, channels));

    for (col, row, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let (row, col) = (row as usize, col as usize);
        tensor[[0, row, col, 0]] = b as f32;
        tensor[[0, row, col, 1]] = g as f32;
        tensor[[0, row, col, 2]] = r as f32;
    }

    Ok(tensor)
}
