//! Encode and decode passes composing [`block_image`](crate::block_image),
//! [`color`](crate::color), [`vq`](crate::vq), and
//! [`container`](crate::container).

use crate::block_image::BlockImage;
use crate::color::{block_rgb_add_mean, block_rgb_mean, block_rgb_sub_mean};
use crate::container::Iv1File;
use crate::rgb8_image::Rgb8Image;
use crate::{vq, Result};

/// Partitions `image` into blocks, trains the palette dictionary on
/// per-block means, then trains the detail dictionary on the residual
/// against the *decoded* (quantized) palette — mirroring exactly what
/// [`decode`] reconstructs, so the detail codebook is trained against the
/// error the decoder will actually see.
///
/// Returns `Ok(None)` for a zero-size image (the `nBlocks = 0` guard):
/// there is nothing to encode, and the caller should skip writing a file.
pub fn encode(image: &Rgb8Image, seed: u64) -> Result<Option<Iv1File>> {
    let blocks = BlockImage::from_image(image, crate::BLOCK_W, crate::BLOCK_H);
    if blocks.n_blocks_x == 0 || blocks.n_blocks_y == 0 {
        return Ok(None);
    }

    log::info!(
        "encoding {}x{} image as {}x{} blocks",
        blocks.actual_w,
        blocks.actual_h,
        blocks.n_blocks_x,
        blocks.n_blocks_y
    );

    let means = block_rgb_mean(&blocks.data);
    let (dict0, indices0) = vq::train(&means, crate::DICT_SIZE, crate::MAX_TRAIN_ITERATIONS, seed)?;

    let palette = vq::decode(&dict0, &indices0)?;
    let residuals = block_rgb_sub_mean(&blocks.data, &palette);
    let (dict1, indices1) = vq::train(
        &residuals,
        crate::DICT_SIZE,
        crate::MAX_TRAIN_ITERATIONS,
        seed.wrapping_add(1),
    )?;

    Ok(Some(Iv1File {
        n_blocks_x: blocks.n_blocks_x as u16,
        n_blocks_y: blocks.n_blocks_y as u16,
        actual_w: blocks.actual_w as u32,
        actual_h: blocks.actual_h as u32,
        dict0,
        indices0,
        dict1,
        indices1,
    }))
}

/// Reconstructs the RGB8 image a `.iv1` file describes: decodes the
/// palette dictionary, gathers the detail dictionary into a block grid,
/// adds the palette back onto each block, and crops to the original
/// dimensions.
pub fn decode(file: &Iv1File) -> Result<Rgb8Image> {
    let mut detail = BlockImage::from_dict_and_indices(
        &file.dict1,
        &file.indices1,
        crate::BLOCK_W,
        crate::BLOCK_H,
        file.n_blocks_x as usize,
        file.n_blocks_y as usize,
        file.actual_w as usize,
        file.actual_h as usize,
    );
    let palette = vq::decode(&file.dict0, &file.indices0)?;
    detail.data = block_rgb_add_mean(&detail.data, &palette);
    Ok(detail.to_rgb8())
}

/// Renders both trained dictionaries as a single `1024x1024` image: a
/// `256x256` grid of `4x4` blocks, where the palette index sweeps along X
/// (`x & 255`) and the detail index sweeps along Y (`x >> 8`). Exists
/// purely to eyeball what a trained codebook learned — not part of the
/// compressed format.
pub fn dictview(file: &Iv1File) -> Result<Rgb8Image> {
    const GRID: usize = 256;
    let num_blocks = GRID * GRID;

    let idx0: Vec<u16> = (0..num_blocks).map(|x| (x & 255) as u16).collect();
    let idx1: Vec<u16> = (0..num_blocks).map(|x| (x >> 8) as u16).collect();

    let palette = vq::decode(&file.dict0, &idx0)?;
    let mut detail = BlockImage::from_dict_and_indices(
        &file.dict1,
        &idx1,
        crate::BLOCK_W,
        crate::BLOCK_H,
        GRID,
        GRID,
        GRID * crate::BLOCK_W,
        GRID * crate::BLOCK_H,
    );
    detail.data = block_rgb_add_mean(&detail.data, &palette);
    Ok(detail.to_rgb8())
}
