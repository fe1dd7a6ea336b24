/// Longest side allowed before the first downscale.
pub const MAX_SOURCE_SIZE: u32 = 1600;

/// Side of the square the center crop is resized to before the final crop.
pub const INTERMEDIATE_SIZE: u32 = 256;

/// Network input size (width, height) the default model was trained with.
pub const DEFAULT_INPUT_SIZE: (u32, u32) = (227, 227);

pub const BGR_CHANNELS: usize = 3;
