use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Image decode error: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Image encode error: {0}")]
    Encode(#[source] image::ImageError),

    #[error(
        "Crop of {crop_width}x{crop_height} is out of bounds for a {width}x{height} image"
    )]
    OutOfBounds {
        crop_width: u32,
        crop_height: u32,
        width: u32,
        height: u32,
    },

    #[error(
        "Tensor shape mismatch: expected a {expected_width}x{expected_height} image, got {width}x{height}"
    )]
    ShapeMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },

    #[error("Tensor input must be square, got {width}x{height}")]
    NonSquareInput { width: u32, height: u32 },

    #[error("Unsupported channel count {0}, only 3 (B,G,R) is packed")]
    UnsupportedChannels(usize),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}
