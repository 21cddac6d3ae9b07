//! The `.iv1` binary file format: a 16-byte header, two 8-bit-quantized
//! dictionaries, and their two index streams.
//!
//! The header is a `zerocopy` byte-layout struct in the style of the
//! teacher's `PacketHeader`/`YUYV422Sample`, using `zerocopy::byteorder`'s
//! little-endian integer wrappers so the on-disk layout doesn't depend on
//! the host's native endianness.

use std::io::{Read, Write};
use std::path::Path;

use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::matrix::FeatureMatrix;
use crate::{Error, Result};

const MAGIC: [u8; 4] = *b"IVY1";

/// Quantization half-step: floats live in approximately
/// `[-1/510, 1 + 1/510]`, mapped onto the full `u8` range so that
/// dequantizing lands back within `1/510` of the original.
const HALF_STEP: f32 = 1.0 / 510.0;

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct RawHeader {
    magic: [u8; 4],
    n_blocks_x: U16,
    n_blocks_y: U16,
    actual_w: U32,
    actual_h: U32,
}

/// An in-memory `.iv1` file: both trained codebooks, their index streams,
/// and the shape needed to reassemble the original raster.
#[derive(Debug, Clone)]
pub struct Iv1File {
    pub n_blocks_x: u16,
    pub n_blocks_y: u16,
    pub actual_w: u32,
    pub actual_h: u32,
    pub dict0: FeatureMatrix,
    pub indices0: Vec<u16>,
    pub dict1: FeatureMatrix,
    pub indices1: Vec<u16>,
}

impl Iv1File {
    /// Writes the header, then each payload region in order: `dict0`,
    /// `indices0`, `dict1`, `indices1`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let header = RawHeader {
            magic: MAGIC,
            n_blocks_x: U16::new(self.n_blocks_x),
            n_blocks_y: U16::new(self.n_blocks_y),
            actual_w: U32::new(self.actual_w),
            actual_h: U32::new(self.actual_h),
        };

        let mut out = std::fs::File::create(path)?;
        out.write_all(header.as_bytes())?;
        write_quantized_dict(&mut out, &self.dict0)?;
        write_indices(&mut out, &self.indices0)?;
        write_quantized_dict(&mut out, &self.dict1)?;
        write_indices(&mut out, &self.indices1)?;
        Ok(())
    }

    /// Reads and fully dequantizes a `.iv1` file.
    ///
    /// Only ever calls `Read` on `path`'s file handle, never `Write` — the
    /// original reader's dict1 read path reused the writer's code and
    /// reopened the input for writing, which this does not reproduce.
    pub fn load(path: &Path) -> Result<Self> {
        let mut input = std::fs::File::open(path)?;

        let mut header_bytes = [0u8; std::mem::size_of::<RawHeader>()];
        input
            .read_exact(&mut header_bytes)
            .map_err(|_| Error::ShortRead)?;
        let header = RawHeader::read_from_bytes(&header_bytes[..]).map_err(|_| Error::ShortRead)?;

        if header.magic != MAGIC {
            return Err(Error::BadMagic);
        }

        let n_blocks_x = header.n_blocks_x.get();
        let n_blocks_y = header.n_blocks_y.get();
        let n_blocks = n_blocks_x as usize * n_blocks_y as usize;

        let dict0 = read_quantized_dict(&mut input, crate::PALETTE_WIDTH)?;
        let indices0 = read_indices(&mut input, n_blocks)?;
        let dict1 = read_quantized_dict(&mut input, crate::DETAIL_WIDTH)?;
        let indices1 = read_indices(&mut input, n_blocks)?;

        Ok(Self {
            n_blocks_x,
            n_blocks_y,
            actual_w: header.actual_w.get(),
            actual_h: header.actual_h.get(),
            dict0,
            indices0,
            dict1,
            indices1,
        })
    }
}

fn quantize(f: f32) -> u8 {
    ((f + HALF_STEP) * 255.0).floor().clamp(0.0, 255.0) as u8
}

fn dequantize(b: u8) -> f32 {
    b as f32 / 255.0 - HALF_STEP
}

fn write_quantized_dict(out: &mut impl Write, dict: &FeatureMatrix) -> Result<()> {
    debug_assert_eq!(dict.len(), crate::DICT_SIZE);
    let mut buf = Vec::with_capacity(dict.len() * dict.width());
    for row in dict.iter() {
        buf.extend(row.iter().map(|&f| quantize(f)));
    }
    out.write_all(&buf)?;
    Ok(())
}

fn read_quantized_dict(input: &mut impl Read, width: usize) -> Result<FeatureMatrix> {
    let mut buf = vec![0u8; crate::DICT_SIZE * width];
    input.read_exact(&mut buf).map_err(|_| Error::ShortRead)?;

    let mut dict = FeatureMatrix::new(crate::DICT_SIZE, width);
    for (row, chunk) in dict.iter_mut().zip(buf.chunks_exact(width)) {
        for (f, &b) in row.iter_mut().zip(chunk) {
            *f = dequantize(b);
        }
    }
    Ok(dict)
}

fn write_indices(out: &mut impl Write, indices: &[u16]) -> Result<()> {
    // Lossless: the dictionary always has exactly `DICT_SIZE` (256) rows,
    // so every index fits in one byte.
    let bytes: Vec<u8> = indices.iter().map(|&i| i as u8).collect();
    out.write_all(&bytes)?;
    Ok(())
}

fn read_indices(input: &mut impl Read, n: usize) -> Result<Vec<u16>> {
    let mut buf = vec![0u8; n];
    input.read_exact(&mut buf).map_err(|_| Error::ShortRead)?;
    Ok(buf.into_iter().map(|b| b as u16).collect())
}
