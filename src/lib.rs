//! Entropy-coding core for block compressors.
//!
//! Two independent stages:
//! - [`rangecoder`]: adaptive order-0 range coder over a 257-symbol
//!   alphabet, backed by the two-level [`frequency::FrequencyModel`].
//! - [`zlt`]: zero-length transform, which replaces runs of zero bytes
//!   with a bit-per-byte length code. Usually run after BWT + MTF and
//!   before the range coder.
//!
//! The coders talk to a [`bitstream`] rather than to a byte buffer, so they
//! can be embedded in a larger framed stream.

pub mod bitstream;
pub mod entropy;
pub mod frequency;
pub mod rangecoder;
pub mod transform;
pub mod zlt;

#[cfg(test)]
mod validation;

pub use bitstream::{BitReader, BitWriter, InputBitStream, OutputBitStream};
pub use entropy::{DecodeError, EntropyDecoder, EntropyEncoder};
pub use rangecoder::{RangeDecoder, RangeEncoder};
pub use transform::{ByteTransform, Progress, TransformError};
pub use zlt::Zlt;

use thiserror::Error;

/// Error types for pzrc operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PzError {
    /// Output buffer is too small to hold the result.
    #[error("output buffer too small")]
    BufferTooSmall,
    /// Input data is invalid or corrupt.
    #[error("invalid input")]
    InvalidInput,
    /// A call or construction argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The bit stream has no more data.
    #[error("end of bit stream")]
    EndOfStream,
    /// The decoder landed on a symbol outside the byte alphabet.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(usize),
    /// I/O error from the underlying reader or writer.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PzResult<T> = Result<T, PzError>;
