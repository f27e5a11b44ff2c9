//! Gapless layout of a read over its reference.
//!
//! Shifts whichever sequence starts later in its own coordinates so that the
//! two begin offsets of the alignment fall in the same column:
//!
//! ```text
//! TTTTCTGCCCCCACG      reference, begin 4
//!    ACTG              read, begin 1
//! ```

use crate::model::AlignmentResult;

/// Returns the reference and read as two strings padded with leading spaces.
///
/// Negative begin offsets are treated as 0.
///
/// # Examples
///
/// ```
/// use sswtext::model::AlignmentResult;
/// use sswtext::render::format_offset_pair;
///
/// let result = AlignmentResult::new(6, 0, 4, 6, 1, 3);
/// let (reference, read) = format_offset_pair(b"TTTTCTGCCCCCACG", b"ACTG", &result);
/// assert_eq!(reference, "TTTTCTGCCCCCACG");
/// assert_eq!(read, "   ACTG");
/// ```
pub fn format_offset_pair(
    reference: &[u8],
    read: &[u8],
    result: &AlignmentResult,
) -> (String, String) {
    let ref_begin = result.ref_begin1.max(0) as usize;
    let read_begin = result.read_begin1.max(0) as usize;

    let (ref_pad, read_pad) = if ref_begin >= read_begin {
        (0, ref_begin - read_begin)
    } else {
        (read_begin - ref_begin, 0)
    };

    (pad(reference, ref_pad), pad(read, read_pad))
}

fn pad(sequence: &[u8], width: usize) -> String {
    let mut out = " ".repeat(width);
    out.push_str(&String::from_utf8_lossy(sequence));
    out
}
