//! Bit-granularity stream reader and writer.
//!
//! Bits are packed MSB first: the first bit written becomes the top bit of
//! the first output byte. A multi-bit value is written most significant bit
//! first, so `write_bits(v, 8)` on a byte-aligned stream emits `v` verbatim.
//!
//! The entropy coders only need the two traits; [`BitWriter`] and
//! [`BitReader`] are the default implementations over `std::io`.

use std::io::{self, Read, Write};

use crate::{PzError, PzResult};

/// Default size of the internal byte buffer.
const DEFAULT_BUFFER_SIZE: usize = 1 << 14;

/// Sink for a sequence of bits.
pub trait OutputBitStream {
    /// Write the low `count` bits of `value`, most significant first.
    ///
    /// `count` must be in `1..=64`.
    fn write_bits(&mut self, value: u64, count: u32) -> PzResult<()>;

    /// Push everything written so far to the underlying sink, padding a
    /// partial byte with zero bits.
    fn flush(&mut self) -> PzResult<()>;

    /// Number of bits written so far.
    fn written(&self) -> u64;
}

/// Source of a sequence of bits.
pub trait InputBitStream {
    /// Read `count` bits and return them right-aligned.
    ///
    /// `count` must be in `1..=64`. Fails with [`PzError::EndOfStream`] when
    /// fewer than `count` bits remain.
    fn read_bits(&mut self, count: u32) -> PzResult<u64>;

    /// Whether at least one more bit can be read.
    fn has_more_to_read(&mut self) -> PzResult<bool>;

    /// Number of bits read so far.
    fn read(&self) -> u64;
}

impl<S: OutputBitStream + ?Sized> OutputBitStream for &mut S {
    fn write_bits(&mut self, value: u64, count: u32) -> PzResult<()> {
        (**self).write_bits(value, count)
    }

    fn flush(&mut self) -> PzResult<()> {
        (**self).flush()
    }

    fn written(&self) -> u64 {
        (**self).written()
    }
}

impl<S: InputBitStream + ?Sized> InputBitStream for &mut S {
    fn read_bits(&mut self, count: u32) -> PzResult<u64> {
        (**self).read_bits(count)
    }

    fn has_more_to_read(&mut self) -> PzResult<bool> {
        (**self).has_more_to_read()
    }

    fn read(&self) -> u64 {
        (**self).read()
    }
}

fn check_count(count: u32) -> PzResult<()> {
    if count == 0 || count > 64 {
        return Err(PzError::InvalidArgument("bit count must be in 1..=64"));
    }
    Ok(())
}

/// MSB-first bit writer over any `io::Write`.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    inner: W,
    buffer: Vec<u8>,
    capacity: usize,
    /// Partially filled byte, bits packed from the top.
    current: u8,
    /// Number of valid bits in `current` (0..8).
    pending: u32,
    written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    /// Create a writer that drains to `inner` every `capacity` bytes.
    pub fn with_capacity(inner: W, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        BitWriter {
            inner,
            buffer: Vec::with_capacity(capacity),
            capacity,
            current: 0,
            pending: 0,
            written: 0,
        }
    }

    #[inline]
    fn push_byte(&mut self, byte: u8) -> PzResult<()> {
        self.buffer.push(byte);
        if self.buffer.len() >= self.capacity {
            self.drain()?;
        }
        Ok(())
    }

    fn drain(&mut self) -> PzResult<()> {
        if !self.buffer.is_empty() {
            self.inner.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(mut self) -> PzResult<W> {
        OutputBitStream::flush(&mut self)?;
        Ok(self.inner)
    }
}

impl<W: Write> OutputBitStream for BitWriter<W> {
    fn write_bits(&mut self, value: u64, count: u32) -> PzResult<()> {
        check_count(count)?;

        let mut remaining = count;

        // Byte-aligned fast path: the range coder only ever writes whole bytes.
        if self.pending == 0 {
            while remaining >= 8 {
                remaining -= 8;
                self.push_byte((value >> remaining) as u8)?;
            }
        }

        while remaining > 0 {
            remaining -= 1;
            let bit = ((value >> remaining) & 1) as u8;
            self.current |= bit << (7 - self.pending);
            self.pending += 1;
            if self.pending == 8 {
                let byte = self.current;
                self.current = 0;
                self.pending = 0;
                self.push_byte(byte)?;
            }
        }

        self.written += u64::from(count);
        Ok(())
    }

    fn flush(&mut self) -> PzResult<()> {
        if self.pending > 0 {
            let byte = self.current;
            self.current = 0;
            self.pending = 0;
            self.buffer.push(byte);
        }
        self.drain()?;
        self.inner.flush()?;
        Ok(())
    }

    fn written(&self) -> u64 {
        self.written
    }
}

/// MSB-first bit reader over any `io::Read`.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    inner: R,
    buffer: Box<[u8]>,
    pos: usize,
    len: usize,
    current: u8,
    /// Number of unread bits left in `current` (0..=8).
    available: u32,
    read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    /// Create a reader that pulls up to `capacity` bytes per `read` call.
    pub fn with_capacity(inner: R, capacity: usize) -> Self {
        BitReader {
            inner,
            buffer: vec![0u8; capacity.max(1)].into_boxed_slice(),
            pos: 0,
            len: 0,
            current: 0,
            available: 0,
            read: 0,
        }
    }

    /// Refill the byte buffer. Returns false once the source is exhausted.
    fn refill(&mut self) -> PzResult<bool> {
        loop {
            match self.inner.read(&mut self.buffer) {
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                    return Ok(n > 0);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    #[inline]
    fn next_byte(&mut self) -> PzResult<u8> {
        if self.pos == self.len && !self.refill()? {
            return Err(PzError::EndOfStream);
        }
        let byte = self.buffer[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Hand back the underlying reader. Buffered but unread bytes are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> InputBitStream for BitReader<R> {
    fn read_bits(&mut self, count: u32) -> PzResult<u64> {
        check_count(count)?;

        let mut value = 0u64;
        let mut remaining = count;

        while remaining > 0 {
            if self.available == 0 {
                if remaining >= 8 {
                    value = (value << 8) | u64::from(self.next_byte()?);
                    remaining -= 8;
                    continue;
                }
                self.current = self.next_byte()?;
                self.available = 8;
            }

            let take = remaining.min(self.available);
            let shift = self.available - take;
            let bits = (u32::from(self.current) >> shift) & ((1u32 << take) - 1);
            value = (value << take) | u64::from(bits);
            self.available -= take;
            remaining -= take;
        }

        self.read += u64::from(count);
        Ok(value)
    }

    fn has_more_to_read(&mut self) -> PzResult<bool> {
        if self.available > 0 || self.pos < self.len {
            return Ok(true);
        }
        self.refill()
    }

    fn read(&self) -> u64 {
        self.read
    }
}
