/// Zero-Length Transform (ZLT).
///
/// A Wheeler-style relative of run-length encoding that only looks at runs
/// of zero bytes, which dominate BWT + MTF output.
///
/// **Encoding format:**
/// - A run of `n` zero bytes is coded from `n + 1`: every bit of `n + 1`
///   below its leading one is emitted MSB first as a byte `0` or `1`.
/// - A literal `v < 0xFE` is emitted as `v + 1`.
/// - A literal `0xFE` or `0xFF` is emitted as the escape `0xFF` followed by
///   `v - 0xFE`.
///
/// Shifting literals up by one leaves `0` and `1` free to carry run bits, so
/// a run code ends at the first byte above 1. Runs are capped at
/// `MAX_RUN - 1` zeros; a capped run has a 30-bit code, and the decoder
/// never reads more than 30 bits into one code, so a following run starts
/// a new code.
///
/// Every run code, literal or escape pair is written whole or not at all.
/// When a buffer runs out, the error reports the progress made up to the
/// start of the unit that did not fit.
use log::trace;

use crate::transform::{ByteTransform, Progress, TransformError};
use crate::{PzError, PzResult};

/// Largest value of the run counter (`zeros + 1`).
pub const MAX_RUN: u32 = (1 << 31) - 1;

/// Bits in the code of a `MAX_RUN` run.
const MAX_CODE_BITS: u32 = 30;

/// Zero-length transform over an optionally fixed-size source block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zlt {
    size: usize,
}

impl Zlt {
    /// `size` bounds how many source bytes a call processes; 0 means the
    /// whole source slice.
    pub fn new(size: usize) -> Self {
        Zlt { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn source_end(&self, src_len: usize) -> Result<usize, TransformError> {
        match self.size {
            0 => Ok(src_len),
            size if size <= src_len => Ok(size),
            _ => Err(TransformError::new(
                Progress::default(),
                PzError::InvalidArgument("block size exceeds source length"),
            )),
        }
    }
}

/// Number of code bytes for a run counter of `run` (at least 2).
#[inline]
fn code_bits(run: u32) -> u32 {
    31 - run.leading_zeros()
}

/// Parse one run code from the front of `src`.
///
/// Returns the run counter and the number of code bytes consumed.
#[inline]
fn read_run(src: &[u8]) -> (u32, usize) {
    let mut run = 1u32;
    let mut used = 0;
    for &bit in src.iter().take(MAX_CODE_BITS as usize) {
        if bit > 1 {
            break;
        }
        run = (run << 1) | u32::from(bit);
        used += 1;
    }
    (run, used)
}

fn too_small(read: usize, written: usize) -> TransformError {
    trace!("zlt stopped at read={} written={}", read, written);
    TransformError::new(Progress { read, written }, PzError::BufferTooSmall)
}

impl ByteTransform for Zlt {
    fn forward(&self, src: &[u8], dst: &mut [u8]) -> Result<Progress, TransformError> {
        let src_end = self.source_end(src.len())?;
        let dst_end = dst.len();
        let mut src_idx = 0;
        let mut dst_idx = 0;

        while src_idx < src_end {
            let val = src[src_idx];

            if val == 0 {
                let start = src_idx;
                let mut run = 1u32;
                while src_idx < src_end && src[src_idx] == 0 && run < MAX_RUN {
                    run += 1;
                    src_idx += 1;
                }

                let bits = code_bits(run) as usize;
                if dst_end - dst_idx < bits {
                    return Err(too_small(start, dst_idx));
                }

                // Every bit except the most significant one.
                for (i, slot) in dst[dst_idx..dst_idx + bits].iter_mut().enumerate() {
                    *slot = ((run >> (bits - 1 - i)) & 1) as u8;
                }
                dst_idx += bits;
                continue;
            }

            if val >= 0xFE {
                if dst_end - dst_idx < 2 {
                    return Err(too_small(src_idx, dst_idx));
                }
                dst[dst_idx] = 0xFF;
                dst[dst_idx + 1] = val - 0xFE;
                dst_idx += 2;
            } else {
                if dst_idx == dst_end {
                    return Err(too_small(src_idx, dst_idx));
                }
                dst[dst_idx] = val + 1;
                dst_idx += 1;
            }
            src_idx += 1;
        }

        Ok(Progress {
            read: src_idx,
            written: dst_idx,
        })
    }

    fn inverse(&self, src: &[u8], dst: &mut [u8]) -> Result<Progress, TransformError> {
        let src_end = self.source_end(src.len())?;
        let dst_end = dst.len();
        let mut src_idx = 0;
        let mut dst_idx = 0;

        while src_idx < src_end {
            let val = src[src_idx];

            if val <= 1 {
                let (run, used) = read_run(&src[src_idx..src_end]);
                let zeros = (run - 1) as usize;
                if dst_end - dst_idx < zeros {
                    return Err(too_small(src_idx, dst_idx));
                }
                dst[dst_idx..dst_idx + zeros].fill(0);
                dst_idx += zeros;
                src_idx += used;
                continue;
            }

            if dst_idx == dst_end {
                return Err(too_small(src_idx, dst_idx));
            }

            if val == 0xFF {
                if src_idx + 1 >= src_end {
                    return Err(too_small(src_idx, dst_idx));
                }
                let offset = src[src_idx + 1];
                if offset > 1 {
                    return Err(TransformError::new(
                        Progress {
                            read: src_idx,
                            written: dst_idx,
                        },
                        PzError::InvalidInput,
                    ));
                }
                dst[dst_idx] = 0xFE + offset;
                src_idx += 2;
            } else {
                dst[dst_idx] = val - 1;
                src_idx += 1;
            }
            dst_idx += 1;
        }

        Ok(Progress {
            read: src_idx,
            written: dst_idx,
        })
    }

    fn max_encoded_len(&self, len: usize) -> usize {
        max_encoded_len(len)
    }
}

/// Worst-case forward output size: every byte an escaped literal.
pub fn max_encoded_len(len: usize) -> usize {
    len.saturating_mul(2)
}

/// Apply the forward transform to a whole buffer.
pub fn encode(input: &[u8]) -> PzResult<Vec<u8>> {
    let mut output = vec![0u8; max_encoded_len(input.len())];
    let progress = Zlt::default()
        .forward(input, &mut output)
        .map_err(|e| e.error)?;
    output.truncate(progress.written);
    Ok(output)
}

/// Invert [`encode`], growing the output as needed.
pub fn decode(input: &[u8]) -> PzResult<Vec<u8>> {
    let zlt = Zlt::default();
    let mut output = vec![0u8; input.len().max(64)];
    let mut read = 0;
    let mut written = 0;

    loop {
        match zlt.inverse(&input[read..], &mut output[written..]) {
            Ok(progress) => {
                output.truncate(written + progress.written);
                return Ok(output);
            }
            Err(e) => {
                if !matches!(e.error, PzError::BufferTooSmall) {
                    return Err(e.error);
                }
                read += e.read;
                written += e.written;
                // A dangling escape is not fixed by more room.
                if read + 1 == input.len() && input[read] == 0xFF {
                    return Err(PzError::InvalidInput);
                }
                let grown = output.len().saturating_mul(2);
                output.resize(grown, 0);
            }
        }
    }
}
