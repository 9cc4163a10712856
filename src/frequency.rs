//! Adaptive order-0 frequency model for the range coder.
//!
//! Cumulative frequencies over a 257-symbol alphabet (256 byte values plus
//! one terminal symbol) are kept in two tables:
//! - `base[b]` holds the absolute cumulative frequency at symbol `16 * b`.
//! - `delta[s]` holds the cumulative frequency of `s` relative to the start
//!   of its 16-symbol block.
//!
//! so that `F(s) = base[s >> 4] + delta[s]`. Bumping one symbol touches at
//! most 16 base entries and 15 delta entries instead of the whole table,
//! which matters because the update runs once per coded byte.
//!
//! Every symbol starts with a count of one, so initially `F(s) = s`.

/// Number of symbols in the alphabet (bytes 0-255 plus the terminal symbol).
pub const NUM_SYMBOLS: usize = 257;

/// The terminal symbol. Never encoded; decoding it means the stream is over
/// or damaged.
pub const LAST: usize = NUM_SYMBOLS - 1;

const DELTA_LEN: usize = NUM_SYMBOLS + 1;
const BASE_LEN: usize = (NUM_SYMBOLS >> 4) + 1;

/// Two-level cumulative frequency table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyModel {
    base: [u64; BASE_LEN],
    delta: [u64; DELTA_LEN],
}

impl FrequencyModel {
    /// Create a model with a uniform prior.
    pub fn new() -> Self {
        FrequencyModel {
            base: std::array::from_fn(|i| (i << 4) as u64),
            delta: std::array::from_fn(|i| (i & 15) as u64),
        }
    }

    /// Cumulative frequency of all symbols below `symbol`.
    ///
    /// `symbol` may be anything in `0..=NUM_SYMBOLS`; `cumulative(NUM_SYMBOLS)`
    /// is the total.
    #[inline]
    pub fn cumulative(&self, symbol: usize) -> u64 {
        self.base[symbol >> 4] + self.delta[symbol]
    }

    /// Total frequency mass.
    #[inline]
    pub fn total(&self) -> u64 {
        self.cumulative(NUM_SYMBOLS)
    }

    /// `(F(symbol), F(symbol + 1))`: the sub-interval owned by `symbol`.
    #[inline]
    pub fn cumulative_range(&self, symbol: usize) -> (u64, u64) {
        (self.cumulative(symbol), self.cumulative(symbol + 1))
    }

    /// Find the symbol `s` with `F(s) <= target < F(s + 1)`.
    ///
    /// Any target at or past `F(LAST)` resolves to [`LAST`].
    #[inline]
    pub fn locate(&self, target: u64) -> usize {
        let base = &self.base;
        let delta = &self.delta;

        // Owning block: the last one whose base does not exceed the target.
        let mut block = if target < base[BASE_LEN / 2] {
            BASE_LEN / 2 - 1
        } else {
            BASE_LEN - 1
        };
        while block > 0 && target < base[block] {
            block -= 1;
        }

        if block == BASE_LEN - 1 {
            return LAST;
        }

        let offset = target - base[block];
        let start = block << 4;

        // Narrow to a 4-entry window, then walk down to the boundary.
        let mut symbol = if offset < delta[start + 8] {
            if offset < delta[start + 4] {
                start + 3
            } else {
                start + 7
            }
        } else if offset < delta[start + 12] {
            start + 11
        } else {
            start + 15
        };

        while symbol > start && offset < delta[symbol] {
            symbol -= 1;
        }

        symbol
    }

    /// Shift all frequency mass at and above `bound` up by one.
    ///
    /// Called with `symbol + 1` after coding `symbol`, which raises that
    /// symbol's own count by one and the total by one.
    #[inline]
    pub fn update(&mut self, bound: usize) {
        debug_assert!(bound > 0 && bound <= NUM_SYMBOLS);
        let start = (bound + 15) >> 4;

        for b in &mut self.base[start..] {
            *b += 1;
        }

        // Only the tail of the block containing `bound` is relative to a
        // base that did not move.
        for d in &mut self.delta[bound..start << 4] {
            *d += 1;
        }
    }
}

impl Default for FrequencyModel {
    fn default() -> Self {
        Self::new()
    }
}
