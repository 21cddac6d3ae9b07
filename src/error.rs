//! Crate-wide error type.
//!
//! Covers the three categories from the codec's error taxonomy: malformed
//! input (`Io`, `Image`, `BadMagic`, `ShortRead`), invariant violations that
//! are precondition bugs (`ZeroK`, `IndexOutOfRange`), and out-of-memory,
//! which Rust doesn't model as a `Result` value and so isn't represented
//! here.
//!
//! The taxonomy's `EmptyInput` entry is deliberately not a variant here:
//! `N = 0` is a defined success path for the trainer (empty dictionary,
//! empty index stream), and a zero-block image is a defined success path
//! for the encode pipeline (`Ok(None)`) — neither is ever constructed, so
//! carrying a dead variant would be misleading.

use thiserror::Error as ThisError;

/// Errors produced by the IV1 codec.
#[derive(Debug, ThisError)]
pub enum Error {
    /// An I/O error occurred while reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The `image` crate failed to decode or encode a PNG.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The file does not start with the `IVY1` magic bytes.
    #[error("not an IV1 file")]
    BadMagic,

    /// The file ended before all expected data was read.
    #[error("truncated IV1 file")]
    ShortRead,

    /// The trainer was asked for a zero-size dictionary.
    #[error("dictionary size K must be nonzero")]
    ZeroK,

    /// A decoder index referenced a codeword outside the dictionary.
    #[error("index {index} out of range for dictionary of size {dict_len}")]
    IndexOutOfRange { index: u16, dict_len: usize },
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_magic_message() {
        let err = Error::BadMagic;
        assert_eq!(err.to_string(), "not an IV1 file");
    }

    #[test]
    fn short_read_message() {
        let err = Error::ShortRead;
        assert_eq!(err.to_string(), "truncated IV1 file");
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
