//! IV1 ("Ivy-One"): an experimental lossy still-image codec.
//!
//! An image is split into fixed-size spatial blocks. A vector quantizer is
//! trained on the per-block mean colors (the "palette" codebook), and a
//! second vector quantizer is trained on the mean-subtracted residual
//! blocks (the "detail" codebook). The compressed file stores both
//! codebooks plus the two per-block index streams.
//!
//! See [`pipeline`] for the encode/decode entry points and [`container`]
//! for the on-disk format.

pub mod block_image;
pub mod color;
pub mod container;
pub mod error;
pub mod matrix;
pub mod pipeline;
pub mod rgb8_image;
pub mod vq;

pub use error::{Error, Result};

/// Width (in pixels) of a palette/detail block.
pub const BLOCK_W: usize = 4;
/// Height (in pixels) of a palette/detail block.
pub const BLOCK_H: usize = 4;

/// Number of codewords in each dictionary. Fixed so every index fits a `u8`.
pub const DICT_SIZE: usize = 256;

/// Maximum number of Lloyd iterations the trainer will run per dictionary.
pub const MAX_TRAIN_ITERATIONS: usize = 1000;

/// Fixed seed used by the CLI drivers, for reproducible dictionaries.
pub const DEFAULT_SEED: u64 = 0xCAFE_F00D;

/// Default log level for the CLI drivers.
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

/// Row width of the palette codebook (one RGB triple per block).
pub const PALETTE_WIDTH: usize = 3;
/// Row width of the detail codebook (one full `BLOCK_W * BLOCK_H` RGB block).
pub const DETAIL_WIDTH: usize = BLOCK_W * BLOCK_H * 3;

/// Per-channel YUV-luma weights applied in feature space, so squared
/// Euclidean distance is proportional to luminance-weighted perceptual
/// error. Values are `sqrt(0.2125)`, `sqrt(0.7154)`, `sqrt(0.0721)`;
/// written as literals (see `tests::yuv_weights_match_sqrt` below) since
/// `f32::sqrt` isn't available in a `const` context on stable Rust.
pub const YUV_WEIGHT_R: f32 = 0.460_977_2;
pub const YUV_WEIGHT_G: f32 = 0.845_813_75;
pub const YUV_WEIGHT_B: f32 = 0.268_514_44;
