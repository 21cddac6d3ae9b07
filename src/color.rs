//! Per-block mean/residual operations shared by both codebook stages.
//!
//! Ported from `original_source/IV1BlockImage.h`'s `BlockRGBMean`,
//! `BlockRGBSubtractMean`, and `BlockRGBAddMean`, generalized from a
//! fixed `blockW x blockH` template parameter to any
//! [`FeatureMatrix`] whose row width is a multiple of 3.

use crate::matrix::FeatureMatrix;

/// Computes the per-channel mean over each block's pixels.
///
/// `blocks` has one row per block, `pixels_per_block * 3` wide. Returns
/// one row per block, 3 wide (the block's mean R, G, B).
pub fn block_rgb_mean(blocks: &FeatureMatrix) -> FeatureMatrix {
    let pixels_per_block = blocks.width() / 3;
    let mut means = FeatureMatrix::new(blocks.len(), 3);

    for (block, mean) in blocks.iter().zip(means.iter_mut()) {
        let mut sum = [0.0f32; 3];
        for pixel in block.chunks_exact(3) {
            sum[0] += pixel[0];
            sum[1] += pixel[1];
            sum[2] += pixel[2];
        }
        mean[0] = sum[0] / pixels_per_block as f32;
        mean[1] = sum[1] / pixels_per_block as f32;
        mean[2] = sum[2] / pixels_per_block as f32;
    }

    means
}

/// Subtracts each block's mean (broadcast over every pixel) from the
/// block's pixels, giving the mean-subtracted residual blocks.
pub fn block_rgb_sub_mean(blocks: &FeatureMatrix, means: &FeatureMatrix) -> FeatureMatrix {
    debug_assert_eq!(blocks.len(), means.len());
    debug_assert_eq!(means.width(), 3);

    let mut residuals = FeatureMatrix::new(blocks.len(), blocks.width());
    for ((block, mean), residual) in blocks.iter().zip(means.iter()).zip(residuals.iter_mut()) {
        for (pixel, out) in block.chunks_exact(3).zip(residual.chunks_exact_mut(3)) {
            out[0] = pixel[0] - mean[0];
            out[1] = pixel[1] - mean[1];
            out[2] = pixel[2] - mean[2];
        }
    }
    residuals
}

/// Inverse of [`block_rgb_sub_mean`]: adds each block's mean back onto
/// every pixel of its residual.
pub fn block_rgb_add_mean(residuals: &FeatureMatrix, means: &FeatureMatrix) -> FeatureMatrix {
    debug_assert_eq!(residuals.len(), means.len());
    debug_assert_eq!(means.width(), 3);

    let mut blocks = FeatureMatrix::new(residuals.len(), residuals.width());
    for ((residual, mean), block) in residuals.iter().zip(means.iter()).zip(blocks.iter_mut()) {
        for (pixel, out) in residual.chunks_exact(3).zip(block.chunks_exact_mut(3)) {
            out[0] = pixel[0] + mean[0];
            out[1] = pixel[1] + mean[1];
            out[2] = pixel[2] + mean[2];
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_uniform_block_is_its_pixel_value() {
        let blocks = FeatureMatrix::from_rows(6, vec![vec![2.0, 4.0, 6.0, 2.0, 4.0, 6.0]]);
        let means = block_rgb_mean(&blocks);
        assert_eq!(means.width(), 3);
        assert_eq!(&means[0], &[2.0, 4.0, 6.0]);
    }

    #[test]
    fn sub_then_add_mean_round_trips() {
        let blocks = FeatureMatrix::from_rows(6, vec![vec![1.0, 2.0, 3.0, 5.0, 6.0, 7.0]]);
        let means = block_rgb_mean(&blocks);
        let residuals = block_rgb_sub_mean(&blocks, &means);
        let reconstructed = block_rgb_add_mean(&residuals, &means);
        for (a, b) in blocks.iter().flatten().zip(reconstructed.iter().flatten()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn residual_mean_is_zero() {
        let blocks = FeatureMatrix::from_rows(6, vec![vec![1.0, 2.0, 3.0, 9.0, 4.0, 1.0]]);
        let means = block_rgb_mean(&blocks);
        let residuals = block_rgb_sub_mean(&blocks, &means);
        let residual_means = block_rgb_mean(&residuals);
        for v in residual_means.iter().flatten() {
            assert!(v.abs() < 1e-5);
        }
    }
}
