//! Reflected Binary Gray Code
//!
//! Gray code has the property that adjacent values differ by only one bit,
//! so a decision error between neighbouring amplitude levels costs a single
//! bit. PAM symbol indices are Gray-coded on the wire; the modulator decodes
//! them to natural binary before the level lookup and the demodulator
//! re-encodes the recovered binary index.
//!
//! ## Example
//!
//! ```rust
//! use pam_core::gray_code::{binary_to_gray, gray_to_binary, GrayCode};
//!
//! assert_eq!(binary_to_gray(2), 3);
//! assert_eq!(gray_to_binary(3), 2);
//!
//! let gray = GrayCode::new(2); // 4-PAM
//! let symbols = vec![0, 1, 2, 3];
//! let encoded = gray.encode_all(&symbols);
//! assert_eq!(gray.decode_all(&encoded), symbols);
//! ```

/// Convert a natural binary value to its Gray code: `g = n ^ (n >> 1)`.
#[inline]
pub fn binary_to_gray(n: usize) -> usize {
    n ^ (n >> 1)
}

/// Convert a Gray code value back to natural binary.
///
/// Inverse of [`binary_to_gray`]: each binary bit is the XOR prefix of the
/// Gray bits above it.
#[inline]
pub fn gray_to_binary(gray: usize) -> usize {
    let mut n = 0;
    let mut g = gray;
    while g != 0 {
        n ^= g;
        g >>= 1;
    }
    n
}

/// Gray code converter bound to a fixed bit width.
///
/// Precomputes encode/decode lookup tables for bulk symbol conversion.
#[derive(Debug, Clone)]
pub struct GrayCode {
    /// Symbol width in bits (log2 of the constellation size).
    bits: u8,
    /// Lookup table: binary → gray
    encode_lut: Vec<usize>,
    /// Lookup table: gray → binary
    decode_lut: Vec<usize>,
}

impl GrayCode {
    /// Create a Gray code converter for the given number of bits.
    pub fn new(bits: u8) -> Self {
        let size = 1usize << bits;
        let mut encode_lut = vec![0usize; size];
        let mut decode_lut = vec![0usize; size];

        for n in 0..size {
            let gray = binary_to_gray(n);
            encode_lut[n] = gray;
            decode_lut[gray] = n;
        }

        Self {
            bits,
            encode_lut,
            decode_lut,
        }
    }

    /// Symbol width in bits.
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Number of distinct symbols (`2^bits`).
    pub fn size(&self) -> usize {
        1usize << self.bits
    }

    /// Encode a binary value to Gray code.
    #[inline]
    pub fn encode(&self, value: usize) -> usize {
        self.encode_lut[value]
    }

    /// Decode a Gray code value to binary.
    #[inline]
    pub fn decode(&self, gray: usize) -> usize {
        self.decode_lut[gray]
    }

    /// Encode multiple symbols.
    pub fn encode_all(&self, symbols: &[usize]) -> Vec<usize> {
        symbols.iter().map(|&s| self.encode(s)).collect()
    }

    /// Decode multiple symbols.
    pub fn decode_all(&self, symbols: &[usize]) -> Vec<usize> {
        symbols.iter().map(|&s| self.decode(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_code_adjacent() {
        let gray = GrayCode::new(4);

        // Adjacent codes differ by exactly 1 bit
        for i in 0..15usize {
            let g1 = gray.encode(i);
            let g2 = gray.encode(i + 1);
            let diff = g1 ^ g2;
            assert_eq!(
                diff.count_ones(),
                1,
                "Gray codes for {} and {} differ by {} bits",
                i,
                i + 1,
                diff.count_ones()
            );
        }
    }

    #[test]
    fn test_gray_code_roundtrip() {
        for bits in 1..=8u8 {
            let gray = GrayCode::new(bits);
            for i in 0..(1usize << bits) {
                assert_eq!(gray.decode(gray.encode(i)), i);
            }
        }
    }

    #[test]
    fn test_free_function_roundtrip() {
        for n in 0..256usize {
            assert_eq!(gray_to_binary(binary_to_gray(n)), n);
        }
    }

    #[test]
    fn test_known_4pam_mapping() {
        // 2-bit Gray sequence: 00 01 11 10
        assert_eq!(binary_to_gray(0), 0b00);
        assert_eq!(binary_to_gray(1), 0b01);
        assert_eq!(binary_to_gray(2), 0b11);
        assert_eq!(binary_to_gray(3), 0b10);
    }

    #[test]
    fn test_encode_all_matches_scalar() {
        let gray = GrayCode::new(3);
        let symbols: Vec<usize> = (0..8).collect();
        let bulk = gray.encode_all(&symbols);
        for (i, &g) in bulk.iter().enumerate() {
            assert_eq!(g, gray.encode(i));
        }
    }
}
