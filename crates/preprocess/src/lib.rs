pub mod codec;
pub mod config;
pub mod error;
pub mod geometry;
pub mod tensor;

pub use codec::{EncodeFormat, decode, encode, save_diagnostic};
pub use config::{BGR_CHANNELS, DEFAULT_INPUT_SIZE, INTERMEDIATE_SIZE, MAX_SOURCE_SIZE};
pub use error::PreprocessError;
pub use geometry::{crop_center, crop_center_square, resize_down_to_max, resize_exact};
pub use tensor::{Tensor, pack_bgr};

/// Row-major grid of 8-bit R,G,B samples.
pub type PixelImage = image::RgbImage;
