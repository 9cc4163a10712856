/// Validation tests across stages.
///
/// These tests verify:
/// 1. **Round-trip correctness** for each stage and for the ZLT → range coder chain
/// 2. **Framing** - the range coder embedded between other bit-stream fields
/// 3. **Algorithmic properties** - ZLT shrinks zero-heavy data, random data barely expands
/// 4. **Edge cases** - escape-heavy and boundary-length inputs
#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::bitstream::{BitReader, BitWriter, InputBitStream, OutputBitStream};
    use crate::entropy::{EntropyDecoder, EntropyEncoder};
    use crate::rangecoder::{self, RangeDecoder, RangeEncoder};
    use crate::zlt;

    // ---------------------------------------------------------------
    // Helper: generate diverse test vectors
    // ---------------------------------------------------------------

    fn data_empty() -> Vec<u8> {
        Vec::new()
    }

    fn data_single() -> Vec<u8> {
        vec![0x80]
    }

    /// Highly compressible: single byte repeated.
    fn data_all_zeros(n: usize) -> Vec<u8> {
        vec![0u8; n]
    }

    /// Every literal needs an escape.
    fn data_all_ff(n: usize) -> Vec<u8> {
        vec![0xFFu8; n]
    }

    /// Incompressible: every byte value once.
    fn data_uniform() -> Vec<u8> {
        (0..=255u8).collect()
    }

    /// Seeded random bytes.
    fn data_random(n: usize, seed: u64) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen()).collect()
    }

    /// Post-MTF shaped data: mostly zeros, small values, runs of every length.
    fn data_mtf_like(n: usize, seed: u64) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut v = Vec::with_capacity(n);
        while v.len() < n {
            if rng.gen_bool(0.6) {
                let run = rng.gen_range(1..64);
                v.extend(std::iter::repeat(0).take(run));
            } else {
                let value = if rng.gen_bool(0.9) {
                    rng.gen_range(1..8)
                } else {
                    rng.gen_range(0xF0..=0xFF)
                };
                v.push(value);
            }
        }
        v.truncate(n);
        v
    }

    /// Repetitive text with structure.
    fn data_repeating_text() -> Vec<u8> {
        let pattern = b"the quick brown fox jumps over the lazy dog. ";
        let mut v = Vec::new();
        for _ in 0..100 {
            v.extend_from_slice(pattern);
        }
        v
    }

    fn chain_encode(input: &[u8]) -> (Vec<u8>, usize) {
        let transformed = zlt::encode(input).unwrap();
        let coded = rangecoder::encode(&transformed).unwrap();
        (coded, transformed.len())
    }

    fn chain_decode(coded: &[u8], transformed_len: usize) -> Vec<u8> {
        let transformed = rangecoder::decode(coded, transformed_len).unwrap();
        zlt::decode(&transformed).unwrap()
    }

    // ---------------------------------------------------------------
    // 1. Round-trip validation
    // ---------------------------------------------------------------

    macro_rules! round_trip_test {
        ($name:ident, $data:expr) => {
            mod $name {
                use super::*;

                #[test]
                fn zlt() {
                    let input = $data;
                    let encoded = zlt::encode(&input).unwrap();
                    let decoded = zlt::decode(&encoded).unwrap();
                    assert_eq!(decoded, input, "zlt round-trip failed");
                }

                #[test]
                fn rangecoder() {
                    let input = $data;
                    let encoded = rangecoder::encode(&input).unwrap();
                    let decoded = rangecoder::decode(&encoded, input.len()).unwrap();
                    assert_eq!(decoded, input, "range coder round-trip failed");
                }

                #[test]
                fn zlt_then_rangecoder() {
                    let input = $data;
                    let (coded, transformed_len) = chain_encode(&input);
                    let decoded = chain_decode(&coded, transformed_len);
                    assert_eq!(decoded, input, "zlt + range coder round-trip failed");
                }
            }
        };
    }

    round_trip_test!(empty, data_empty());
    round_trip_test!(single, data_single());
    round_trip_test!(all_zeros, data_all_zeros(10_000));
    round_trip_test!(all_ff, data_all_ff(10_000));
    round_trip_test!(uniform, data_uniform());
    round_trip_test!(random_small, data_random(17, 1));
    round_trip_test!(random_large, data_random(65_536, 2));
    round_trip_test!(mtf_like, data_mtf_like(50_000, 3));
    round_trip_test!(repeating_text, data_repeating_text());

    // ---------------------------------------------------------------
    // 2. Framing
    // ---------------------------------------------------------------

    #[test]
    fn test_coder_between_header_and_trailer() {
        let payload = data_mtf_like(4096, 7);
        let transformed = zlt::encode(&payload).unwrap();

        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(transformed.len() as u64, 32).unwrap();
        {
            let mut enc = RangeEncoder::new(&mut writer);
            enc.encode(&transformed).unwrap();
            enc.dispose().unwrap();
        }
        writer.write_bits(0xC0FFEE, 24).unwrap();
        let bytes = writer.into_inner().unwrap();

        let mut reader = BitReader::new(&bytes[..]);
        let len = reader.read_bits(32).unwrap() as usize;
        let mut buf = vec![0u8; len];
        {
            let mut dec = RangeDecoder::new(&mut reader);
            assert_eq!(dec.decode(&mut buf).unwrap(), len);
        }
        assert_eq!(reader.read_bits(24).unwrap(), 0xC0FFEE);
        assert!(!reader.has_more_to_read().unwrap());
        assert_eq!(zlt::decode(&buf).unwrap(), payload);
    }

    #[test]
    fn test_independent_streams_in_sequence() {
        let a = data_random(1000, 11);
        let b = data_repeating_text();

        let mut writer = BitWriter::new(Vec::new());
        for block in [&a, &b] {
            let mut enc = RangeEncoder::new(&mut writer);
            enc.encode(block).unwrap();
            enc.dispose().unwrap();
        }
        let bytes = writer.into_inner().unwrap();

        let mut reader = BitReader::new(&bytes[..]);
        for block in [&a, &b] {
            let mut dec = RangeDecoder::new(&mut reader);
            let mut buf = vec![0u8; block.len()];
            dec.decode(&mut buf).unwrap();
            assert_eq!(&buf, block);
        }
    }

    // ---------------------------------------------------------------
    // 3. Algorithmic properties
    // ---------------------------------------------------------------

    #[test]
    fn test_zlt_shrinks_zero_heavy_data() {
        let input = data_mtf_like(50_000, 5);
        let transformed = zlt::encode(&input).unwrap();
        assert!(
            transformed.len() < input.len() / 2,
            "zlt produced {} bytes from {}",
            transformed.len(),
            input.len()
        );
    }

    #[test]
    fn test_random_data_barely_expands() {
        let input = data_random(65_536, 9);
        let encoded = rangecoder::encode(&input).unwrap();
        assert!(
            encoded.len() < input.len() + input.len() / 50,
            "encoded {} bytes from {}",
            encoded.len(),
            input.len()
        );
    }

    #[test]
    fn test_encoders_are_deterministic() {
        let input = data_mtf_like(20_000, 8);
        assert_eq!(chain_encode(&input), chain_encode(&input));
    }

    // ---------------------------------------------------------------
    // 4. Edge cases
    // ---------------------------------------------------------------

    #[test]
    fn test_lengths_around_block_sizes() {
        for len in [1usize, 2, 15, 16, 17, 255, 256, 257, 4095, 4096, 4097] {
            let input = data_mtf_like(len, len as u64);
            let (coded, transformed_len) = chain_encode(&input);
            assert_eq!(chain_decode(&coded, transformed_len), input, "len {}", len);
        }
    }

    #[test]
    fn test_escape_heavy_mix() {
        let input: Vec<u8> = (0..5000)
            .map(|i| match i % 4 {
                0 => 0xFE,
                1 => 0xFF,
                2 => 0,
                _ => 1,
            })
            .collect();
        let (coded, transformed_len) = chain_encode(&input);
        assert_eq!(chain_decode(&coded, transformed_len), input);
    }
}
