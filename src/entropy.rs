//! Byte-oriented entropy coder interfaces.
//!
//! An encoder consumes bytes one at a time and writes to an
//! [`OutputBitStream`](crate::bitstream::OutputBitStream); a decoder mirrors
//! it from an [`InputBitStream`](crate::bitstream::InputBitStream). The bulk
//! methods are provided in terms of the per-byte ones.

use thiserror::Error;

use crate::{PzError, PzResult};

/// A bulk decode that stopped early.
///
/// `decoded` bytes at the front of the caller's buffer are valid.
#[derive(Debug, Error)]
#[error("decoding stopped after {decoded} bytes: {error}")]
pub struct DecodeError {
    pub decoded: usize,
    #[source]
    pub error: PzError,
}

pub trait EntropyEncoder {
    /// Encode one byte.
    fn encode_byte(&mut self, byte: u8) -> PzResult<()>;

    /// Encode every byte of `block`. Returns the number of bytes encoded.
    fn encode(&mut self, block: &[u8]) -> PzResult<usize> {
        for &byte in block {
            self.encode_byte(byte)?;
        }
        Ok(block.len())
    }

    /// Write out any pending state and flush the bit stream.
    ///
    /// Calling it more than once is a no-op.
    fn dispose(&mut self) -> PzResult<()>;
}

pub trait EntropyDecoder {
    /// Decode one byte.
    fn decode_byte(&mut self) -> PzResult<u8>;

    /// Fill `block` with decoded bytes.
    ///
    /// On failure the error reports how many bytes were decoded first.
    fn decode(&mut self, block: &mut [u8]) -> Result<usize, DecodeError> {
        for (i, slot) in block.iter_mut().enumerate() {
            *slot = self
                .decode_byte()
                .map_err(|error| DecodeError { decoded: i, error })?;
        }
        Ok(block.len())
    }
}
