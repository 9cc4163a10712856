/// Arithmetic (Range) Coder.
///
/// Implements a byte-level order-0 range coder with an adaptive frequency
/// model. The alphabet has 257 symbols: the 256 byte values plus a terminal
/// symbol that is never encoded, so a decoder that lands on it knows the
/// stream is exhausted or damaged.
///
/// Uses the Subbotin carryless range coder technique with 56-bit registers:
/// - `low`/`range` live in the low 56 bits of a `u64`
/// - When the top byte (bits 48-55) of `low` and `low + range` agree, it is
///   settled and shifted out
/// - When they disagree but `range` has dropped below `MAX_RANGE` (2^40),
///   `range` is clamped so the top byte settles, avoiding carry propagation
///
/// **Adaptive model:**
/// - Start with uniform frequencies (count 1 for each symbol).
/// - After coding each byte, increment its count.
/// - Frequencies are never rescaled; `range` renormalization alone keeps
///   `range / total` non-zero for the first 2^40 symbols of a stream.
///
/// **Stream layout:** the decoder starts by reading 56 bits, then one byte
/// per renormalization shift. The encoder writes one byte per shift and
/// seven bytes on flush, so both sides move exactly the same bytes.
use log::{debug, trace};

use crate::bitstream::{BitReader, BitWriter, InputBitStream, OutputBitStream};
use crate::entropy::{EntropyDecoder, EntropyEncoder};
use crate::frequency::{FrequencyModel, LAST, NUM_SYMBOLS};
use crate::{PzError, PzResult};

/// A byte is settled once `low` and `low + range` agree above this bit.
const TOP: u64 = 1 << 48;
/// Mask applied to `range` when it has to be clamped.
const BOTTOM: u64 = (1 << 40) - 1;
/// Below this width an unsettled interval is clamped instead of kept.
const MAX_RANGE: u64 = BOTTOM + 1;
/// 56-bit working width of the registers.
const MASK: u64 = 0x00FF_FFFF_FFFF_FFFF;
/// Bytes left in `low` once the coder is flushed.
const FLUSH_BYTES: usize = 7;
/// Bits read to prime the decoder.
const CODE_BITS: u32 = 56;

/// Interval state shared by the encoder and decoder.
#[derive(Debug, Clone)]
struct Interval {
    low: u64,
    range: u64,
}

impl Interval {
    fn new() -> Self {
        Interval {
            low: 0,
            range: (TOP << 8) - 1,
        }
    }

    /// Width of one frequency unit.
    ///
    /// Only zero when an earlier stream error cut a renormalization short.
    #[inline]
    fn unit(&self, total: u64) -> u64 {
        self.range / total
    }

    /// Narrow to `[sym_low, sym_high)` in steps of `unit`, then renormalize.
    /// `shift` sees every settled top byte before it is shifted out; the
    /// encoder writes it, the decoder pulls in the next code byte.
    #[inline]
    fn narrow<F>(&mut self, unit: u64, sym_low: u64, sym_high: u64, mut shift: F) -> PzResult<()>
    where
        F: FnMut(u8) -> PzResult<()>,
    {
        self.low = (self.low + sym_low * unit) & MASK;
        self.range = unit * (sym_high - sym_low);

        loop {
            if (self.low ^ (self.low + self.range)) & MASK >= TOP {
                if self.range >= MAX_RANGE {
                    break;
                }
                self.range = self.low.wrapping_neg() & BOTTOM;
            }

            shift((self.low >> 48) as u8)?;
            self.low = (self.low << 8) & MASK;
            self.range = (self.range << 8) & MASK;
        }

        Ok(())
    }
}

/// Subbotin-style carryless range encoder.
#[derive(Debug)]
pub struct RangeEncoder<S: OutputBitStream> {
    interval: Interval,
    model: FrequencyModel,
    stream: S,
    written: bool,
    flushed: bool,
}

impl<S: OutputBitStream> RangeEncoder<S> {
    pub fn new(stream: S) -> Self {
        RangeEncoder {
            interval: Interval::new(),
            model: FrequencyModel::new(),
            stream,
            written: false,
            flushed: false,
        }
    }

    pub fn bit_stream(&self) -> &S {
        &self.stream
    }

    /// Flush the coder and return the bit stream.
    pub fn finish(mut self) -> PzResult<S> {
        self.dispose()?;
        Ok(self.stream)
    }
}

impl<S: OutputBitStream> EntropyEncoder for RangeEncoder<S> {
    #[inline]
    fn encode_byte(&mut self, byte: u8) -> PzResult<()> {
        let symbol = byte as usize;
        let (sym_low, sym_high) = self.model.cumulative_range(symbol);
        let total = self.model.total();
        debug_assert!(total <= MAX_RANGE);

        let unit = self.interval.unit(total);
        if unit == 0 {
            return Err(PzError::InvalidArgument(
                "encoder state lost to an earlier stream error",
            ));
        }

        let stream = &mut self.stream;
        self.interval.narrow(unit, sym_low, sym_high, |top| {
            stream.write_bits(u64::from(top), 8)
        })?;

        self.model.update(symbol + 1);
        self.written = true;
        self.flushed = false;
        Ok(())
    }

    fn dispose(&mut self) -> PzResult<()> {
        if !self.written || self.flushed {
            return Ok(());
        }

        // The model is not touched; only `low` is drained.
        self.flushed = true;
        for _ in 0..FLUSH_BYTES {
            self.stream
                .write_bits((self.interval.low >> 48) & 0xFF, 8)?;
            self.interval.low = (self.interval.low << 8) & MASK;
        }
        self.stream.flush()?;

        debug!(
            "range encoder flushed: {} symbols, {} bits",
            self.model.total() - NUM_SYMBOLS as u64,
            self.stream.written()
        );
        Ok(())
    }
}

/// Subbotin-style carryless range decoder.
#[derive(Debug)]
pub struct RangeDecoder<S: InputBitStream> {
    interval: Interval,
    code: u64,
    model: FrequencyModel,
    stream: S,
    initialized: bool,
}

impl<S: InputBitStream> RangeDecoder<S> {
    /// Create a decoder. Nothing is read until the first decode or an
    /// explicit [`initialize`](Self::initialize).
    pub fn new(stream: S) -> Self {
        RangeDecoder {
            interval: Interval::new(),
            code: 0,
            model: FrequencyModel::new(),
            stream,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Prime the code register from the stream. Only the first call reads.
    pub fn initialize(&mut self) -> PzResult<()> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;
        self.code = self.stream.read_bits(CODE_BITS)?;
        trace!("range decoder primed with {:#016x}", self.code);
        Ok(())
    }

    pub fn bit_stream(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    #[inline]
    fn decode_symbol(&mut self) -> PzResult<u8> {
        let total = self.model.total();
        let unit = self.interval.unit(total);
        let count = match unit {
            0 => total,
            _ => (self.code.wrapping_sub(self.interval.low) & MASK) / unit,
        };
        let symbol = self.model.locate(count);

        if symbol >= LAST {
            if !self.stream.has_more_to_read()? {
                debug!("range decoder hit end of stream");
                return Err(PzError::EndOfStream);
            }
            debug!("range decoder found unknown symbol at count {}", count);
            return Err(PzError::UnknownSymbol(symbol));
        }

        let (sym_low, sym_high) = self.model.cumulative_range(symbol);
        let Self {
            interval,
            code,
            stream,
            ..
        } = self;
        interval.narrow(unit, sym_low, sym_high, |_| {
            let byte = stream.read_bits(8)?;
            *code = ((*code << 8) | byte) & MASK;
            Ok(())
        })?;

        self.model.update(symbol + 1);
        Ok(symbol as u8)
    }
}

impl<S: InputBitStream> EntropyDecoder for RangeDecoder<S> {
    #[inline]
    fn decode_byte(&mut self) -> PzResult<u8> {
        if !self.initialized {
            self.initialize()?;
        }
        self.decode_symbol()
    }
}

/// Encode data using an adaptive range coder.
///
/// Returns the compressed data. The original length must be known
/// by the decoder (stored externally).
pub fn encode(input: &[u8]) -> PzResult<Vec<u8>> {
    let mut enc = RangeEncoder::new(BitWriter::new(Vec::with_capacity(input.len() / 2 + 8)));
    enc.encode(input)?;
    enc.finish()?.into_inner()
}

/// Decode range-coded data.
///
/// `original_len` is the number of bytes in the original uncompressed data.
pub fn decode(input: &[u8], original_len: usize) -> PzResult<Vec<u8>> {
    let mut output = vec![0u8; original_len];
    decode_to_buf(input, original_len, &mut output)?;
    Ok(output)
}

/// Decode range-coded data into a pre-allocated buffer.
///
/// Returns the number of bytes written.
pub fn decode_to_buf(input: &[u8], original_len: usize, output: &mut [u8]) -> PzResult<usize> {
    if original_len == 0 {
        return Ok(0);
    }
    if output.len() < original_len {
        return Err(PzError::BufferTooSmall);
    }

    let mut dec = RangeDecoder::new(BitReader::new(input));
    dec.decode(&mut output[..original_len])
        .map_err(|e| e.error)
}
