//! CIGAR operations and sequences.
//!
//! Operations are stored packed in a `u32`, the same layout BAM and the SSW
//! library use: the length occupies the upper 28 bits and the operator code
//! the lower 4 bits.
//!
//! ```text
//! 4M2I3M  ->  [4 << 4 | 0, 2 << 4 | 1, 3 << 4 | 0]
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of bits reserved for the operator code.
pub const CIGAR_SHIFT: u32 = 4;

/// Mask selecting the operator code of a packed operation.
pub const CIGAR_MASK: u32 = 0xf;

/// Largest length that fits in a packed operation.
pub const MAX_OP_LEN: u32 = u32::MAX >> CIGAR_SHIFT;

/// Operator characters indexed by operator code.
const OP_CHARS: &[u8; 9] = b"MIDNSHP=X";

/// Errors that can occur while building or parsing a CIGAR.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CigarError {
    #[error("Operation length {0} does not fit in 28 bits")]
    LengthOverflow(u64),

    #[error("Invalid CIGAR operator '{0}'")]
    InvalidOperator(char),

    #[error("CIGAR operator '{op}' at offset {offset} has no length")]
    MissingLength { op: char, offset: usize },

    #[error("CIGAR ends with a length and no operator")]
    TrailingLength,
}

/// Result type for CIGAR operations.
pub type CigarResult<T> = Result<T, CigarError>;

/// A single CIGAR operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CigarOp {
    /// `M`: alignment match (match or mismatch)
    Match,
    /// `I`: insertion to the reference, consumes query only
    Insertion,
    /// `D`: deletion from the reference, consumes reference only
    Deletion,
    /// `N`: skipped region of the reference
    Skip,
    /// `S`: soft clip
    SoftClip,
    /// `H`: hard clip
    HardClip,
    /// `P`: padding
    Padding,
    /// `=`: sequence match
    Equal,
    /// `X`: sequence mismatch
    Diff,
}

impl CigarOp {
    /// Decodes an operator code.
    ///
    /// Codes above 8 have no standard meaning and decode to `M`, as the SSW
    /// library does.
    pub fn from_code(code: u32) -> Self {
        match code & CIGAR_MASK {
            1 => CigarOp::Insertion,
            2 => CigarOp::Deletion,
            3 => CigarOp::Skip,
            4 => CigarOp::SoftClip,
            5 => CigarOp::HardClip,
            6 => CigarOp::Padding,
            7 => CigarOp::Equal,
            8 => CigarOp::Diff,
            _ => CigarOp::Match,
        }
    }

    /// Returns the operator code.
    pub fn code(self) -> u32 {
        match self {
            CigarOp::Match => 0,
            CigarOp::Insertion => 1,
            CigarOp::Deletion => 2,
            CigarOp::Skip => 3,
            CigarOp::SoftClip => 4,
            CigarOp::HardClip => 5,
            CigarOp::Padding => 6,
            CigarOp::Equal => 7,
            CigarOp::Diff => 8,
        }
    }

    /// Returns the operator character.
    pub fn as_char(self) -> char {
        OP_CHARS[self.code() as usize] as char
    }

    /// Parses an operator character.
    pub fn from_char(c: char) -> CigarResult<Self> {
        OP_CHARS
            .iter()
            .position(|&b| b as char == c)
            .map(|code| CigarOp::from_code(code as u32))
            .ok_or(CigarError::InvalidOperator(c))
    }

    /// Whether the operator consumes reference bases (for span checks).
    pub fn consumes_reference(self) -> bool {
        matches!(
            self,
            CigarOp::Match | CigarOp::Deletion | CigarOp::Skip | CigarOp::Equal | CigarOp::Diff
        )
    }

    /// Whether the operator consumes query bases (for span checks).
    pub fn consumes_query(self) -> bool {
        matches!(
            self,
            CigarOp::Match | CigarOp::Insertion | CigarOp::SoftClip | CigarOp::Equal | CigarOp::Diff
        )
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Packs a length and operator into a single integer.
pub fn pack(len: u32, op: CigarOp) -> CigarResult<u32> {
    if len > MAX_OP_LEN {
        return Err(CigarError::LengthOverflow(len as u64));
    }
    Ok(len << CIGAR_SHIFT | op.code())
}

/// Extracts the length of a packed operation.
#[inline]
pub fn op_len(packed: u32) -> u32 {
    packed >> CIGAR_SHIFT
}

/// Extracts the operator of a packed operation.
#[inline]
pub fn op_kind(packed: u32) -> CigarOp {
    CigarOp::from_code(packed & CIGAR_MASK)
}

/// An ordered sequence of packed CIGAR operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cigar {
    ops: Vec<u32>,
}

impl Cigar {
    /// Wraps already packed operations.
    pub fn from_packed(ops: Vec<u32>) -> Self {
        Self { ops }
    }

    /// Builds a CIGAR from `(length, operator)` pairs.
    pub fn from_pairs<I>(pairs: I) -> CigarResult<Self>
    where
        I: IntoIterator<Item = (u32, CigarOp)>,
    {
        let ops = pairs
            .into_iter()
            .map(|(len, op)| pack(len, op))
            .collect::<CigarResult<Vec<_>>>()?;
        Ok(Self { ops })
    }

    /// Returns the packed operations.
    pub fn as_packed(&self) -> &[u32] {
        &self.ops
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if there are no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Gets the operation at `idx` as a `(length, operator)` pair.
    pub fn get(&self, idx: usize) -> Option<(u32, CigarOp)> {
        self.ops.get(idx).map(|&packed| (op_len(packed), op_kind(packed)))
    }

    /// Iterates over `(length, operator)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, CigarOp)> + '_ {
        self.ops.iter().map(|&packed| (op_len(packed), op_kind(packed)))
    }

    /// Number of reference bases covered.
    pub fn reference_len(&self) -> u64 {
        self.iter()
            .filter(|(_, op)| op.consumes_reference())
            .map(|(len, _)| len as u64)
            .sum()
    }

    /// Number of query bases covered.
    pub fn query_len(&self) -> u64 {
        self.iter()
            .filter(|(_, op)| op.consumes_query())
            .map(|(len, _)| len as u64)
            .sum()
    }

    /// Total number of alignment columns (sum of all lengths).
    pub fn aligned_len(&self) -> u64 {
        self.iter().map(|(len, _)| len as u64).sum()
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (len, op) in self.iter() {
            write!(f, "{}{}", len, op)?;
        }
        Ok(())
    }
}

impl FromStr for Cigar {
    type Err = CigarError;

    /// Parses text such as `4M2I3M`. The empty string is an empty CIGAR.
    fn from_str(s: &str) -> CigarResult<Self> {
        let mut ops = Vec::new();
        let mut len: Option<u64> = None;

        for (offset, c) in s.char_indices() {
            if let Some(digit) = c.to_digit(10) {
                let value = len.unwrap_or(0) * 10 + digit as u64;
                if value > MAX_OP_LEN as u64 {
                    return Err(CigarError::LengthOverflow(value));
                }
                len = Some(value);
            } else {
                let op = CigarOp::from_char(c)?;
                let value = len.take().ok_or(CigarError::MissingLength { op: c, offset })?;
                ops.push(pack(value as u32, op)?);
            }
        }

        if len.is_some() {
            return Err(CigarError::TrailingLength);
        }

        Ok(Self { ops })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_layout() {
        assert_eq!(pack(8, CigarOp::Match).unwrap(), 0x80);
        assert_eq!(pack(2, CigarOp::Insertion).unwrap(), 0x21);
        assert_eq!(pack(3, CigarOp::Deletion).unwrap(), 0x32);
        assert_eq!(op_len(0x32), 3);
        assert_eq!(op_kind(0x32), CigarOp::Deletion);
    }

    #[test]
    fn test_pack_overflow() {
        assert!(pack(MAX_OP_LEN, CigarOp::Match).is_ok());
        assert_eq!(
            pack(MAX_OP_LEN + 1, CigarOp::Match),
            Err(CigarError::LengthOverflow(MAX_OP_LEN as u64 + 1))
        );
    }

    #[test]
    fn test_unknown_codes_decode_as_match() {
        for code in 9..16 {
            assert_eq!(CigarOp::from_code(code), CigarOp::Match);
        }
    }

    #[test]
    fn test_operator_chars() {
        let all: String = (0..9).map(|c| CigarOp::from_code(c).as_char()).collect();
        assert_eq!(all, "MIDNSHP=X");
        assert_eq!(CigarOp::from_char('='), Ok(CigarOp::Equal));
        assert_eq!(CigarOp::from_char('Q'), Err(CigarError::InvalidOperator('Q')));
    }

    #[test]
    fn test_display_and_parse() {
        let cigar = Cigar::from_pairs([
            (4, CigarOp::Match),
            (2, CigarOp::Insertion),
            (3, CigarOp::Match),
            (1, CigarOp::Deletion),
            (12, CigarOp::SoftClip),
        ])
        .unwrap();
        let text = cigar.to_string();
        assert_eq!(text, "4M2I3M1D12S");
        assert_eq!(text.parse::<Cigar>().unwrap(), cigar);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Cigar>().unwrap(), Cigar::default());
        assert_eq!(
            "M".parse::<Cigar>(),
            Err(CigarError::MissingLength { op: 'M', offset: 0 })
        );
        assert_eq!("3M4".parse::<Cigar>(), Err(CigarError::TrailingLength));
        assert_eq!("3Z".parse::<Cigar>(), Err(CigarError::InvalidOperator('Z')));
        assert!(matches!(
            "999999999M".parse::<Cigar>(),
            Err(CigarError::LengthOverflow(_))
        ));
    }

    #[test]
    fn test_spans() {
        let cigar: Cigar = "3M2I4M1D2M".parse().unwrap();
        assert_eq!(cigar.reference_len(), 10);
        assert_eq!(cigar.query_len(), 11);
        assert_eq!(cigar.aligned_len(), 12);
        assert_eq!(cigar.len(), 5);
        assert_eq!(cigar.get(1), Some((2, CigarOp::Insertion)));
        assert_eq!(cigar.get(5), None);
    }
}
