//! DNA base encoding.
//!
//! Converts nucleotide characters to the small integer codes used by the
//! alignment kernel:
//!
//! | base      | code |
//! |-----------|------|
//! | `A`, `a`  | 0    |
//! | `C`, `c`  | 1    |
//! | `G`, `g`  | 2    |
//! | `T`, `t`  | 3    |
//! | any other | 4    |
//!
//! Only 7-bit ASCII input is accepted; bytes >= 128 are rejected with
//! [`EncodingError::NonAscii`].

use thiserror::Error;

/// Code assigned to every byte that is not one of `ACGTacgt`.
pub const UNKNOWN_BASE: u8 = 4;

/// Lookup table indexed by ASCII byte value.
#[rustfmt::skip]
pub const DNA_BASE_LUT: [u8; 128] = [
    4, 4, 4, 4,  4, 4, 4, 4,  4, 4, 4, 4,  4, 4, 4, 4,
    4, 4, 4, 4,  4, 4, 4, 4,  4, 4, 4, 4,  4, 4, 4, 4,
    4, 4, 4, 4,  4, 4, 4, 4,  4, 4, 4, 4,  4, 4, 4, 4,
    4, 4, 4, 4,  4, 4, 4, 4,  4, 4, 4, 4,  4, 4, 4, 4,
 //    A     C            G
    4, 0, 4, 1,  4, 4, 4, 2,  4, 4, 4, 4,  4, 4, 4, 4,
 //              T
    4, 4, 4, 4,  3, 4, 4, 4,  4, 4, 4, 4,  4, 4, 4, 4,
 //    a     c            g
    4, 0, 4, 1,  4, 4, 4, 2,  4, 4, 4, 4,  4, 4, 4, 4,
 //              t
    4, 4, 4, 4,  3, 4, 4, 4,  4, 4, 4, 4,  4, 4, 4, 4,
];

/// Errors that can occur while encoding a sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Non-ASCII byte 0x{byte:02x} at position {position}")]
    NonAscii { byte: u8, position: usize },

    #[error("Output buffer has length {output}, expected {input}")]
    LengthMismatch { input: usize, output: usize },
}

/// Result type for encoding operations.
pub type EncodingResult<T> = Result<T, EncodingError>;

/// Returns the base code of a single byte.
///
/// The position reported on error is 0; use [`encode`] to get the offset
/// within a buffer.
#[inline]
pub fn base_code(byte: u8) -> EncodingResult<u8> {
    DNA_BASE_LUT
        .get(byte as usize)
        .copied()
        .ok_or(EncodingError::NonAscii { byte, position: 0 })
}

/// Encodes a sequence into a newly allocated vector of base codes.
///
/// # Examples
///
/// ```
/// use sswtext::encode::encode;
///
/// assert_eq!(encode(b"ACGTN").unwrap(), vec![0, 1, 2, 3, 4]);
/// ```
pub fn encode(sequence: &[u8]) -> EncodingResult<Vec<u8>> {
    let mut codes = vec![UNKNOWN_BASE; sequence.len()];
    encode_into(sequence, &mut codes)?;
    Ok(codes)
}

/// Encodes a sequence into a caller-supplied buffer of the same length.
pub fn encode_into(sequence: &[u8], out: &mut [u8]) -> EncodingResult<()> {
    if sequence.len() != out.len() {
        return Err(EncodingError::LengthMismatch {
            input: sequence.len(),
            output: out.len(),
        });
    }

    for (position, (&byte, slot)) in sequence.iter().zip(out.iter_mut()).enumerate() {
        *slot = base_code(byte).map_err(|_| EncodingError::NonAscii { byte, position })?;
    }

    Ok(())
}
