//! Alignment result record.
//!
//! An [`AlignmentResult`] is produced by the Smith-Waterman engine; this crate
//! only reads it. Offsets are 0-based and inclusive, and a negative begin
//! offset means the engine did not compute a begin position.

use std::fmt;

use thiserror::Error;

use crate::cigar::{Cigar, CigarOp};

/// Span mismatch between a CIGAR and the offsets of its result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpanError {
    #[error("CIGAR covers {cigar} reference bases but offsets span {offsets}")]
    Reference { cigar: u64, offsets: i64 },

    #[error("CIGAR covers {cigar} query bases but offsets span {offsets}")]
    Query { cigar: u64, offsets: i64 },
}

/// Result of a pairwise alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentResult {
    /// Best alignment score
    pub score1: u16,
    /// Second best (sub-optimal) score
    pub score2: u16,
    /// Reference begin offset, negative when unknown
    pub ref_begin1: i32,
    /// Reference end offset
    pub ref_end1: i32,
    /// Query begin offset, negative when unknown
    pub read_begin1: i32,
    /// Query end offset
    pub read_end1: i32,
    /// Packed CIGAR, absent when no traceback was requested
    pub cigar: Option<Cigar>,
}

impl AlignmentResult {
    /// Creates a result without a CIGAR.
    pub fn new(
        score1: u16,
        score2: u16,
        ref_begin1: i32,
        ref_end1: i32,
        read_begin1: i32,
        read_end1: i32,
    ) -> Self {
        Self {
            score1,
            score2,
            ref_begin1,
            ref_end1,
            read_begin1,
            read_end1,
            cigar: None,
        }
    }

    /// Attaches a CIGAR.
    pub fn with_cigar(mut self, cigar: Cigar) -> Self {
        self.cigar = Some(cigar);
        self
    }

    /// Number of CIGAR operations, 0 when there is no CIGAR.
    pub fn cigar_len(&self) -> usize {
        self.cigar.as_ref().map_or(0, Cigar::len)
    }

    /// Gets the `(length, operator)` pair at `idx`.
    pub fn cigar_values(&self, idx: usize) -> Option<(u32, CigarOp)> {
        self.cigar.as_ref()?.get(idx)
    }

    /// All CIGAR operations as `(length, character)` pairs.
    pub fn cigar_pairs(&self) -> Vec<(u32, char)> {
        self.cigar
            .iter()
            .flat_map(|cigar| cigar.iter())
            .map(|(len, op)| (len, op.as_char()))
            .collect()
    }

    /// The CIGAR as text, e.g. `8M2I4M`.
    pub fn cigar_string(&self) -> Option<String> {
        self.cigar.as_ref().map(Cigar::to_string)
    }

    /// Checks that the CIGAR covers exactly the reference and query spans.
    ///
    /// Only `M` and `D` count toward the reference span and only `M` and `I`
    /// toward the query span; clips and the other operators lie outside the
    /// aligned region. Results without a CIGAR, or with a negative begin
    /// offset, have nothing to check and always pass.
    pub fn check_spans(&self) -> Result<(), SpanError> {
        let Some(cigar) = &self.cigar else {
            return Ok(());
        };
        if self.ref_begin1 < 0 || self.read_begin1 < 0 {
            return Ok(());
        }

        let ref_len = span_sum(cigar, CigarOp::Deletion);
        let ref_span = self.ref_end1 as i64 - self.ref_begin1 as i64 + 1;
        if ref_len as i64 != ref_span {
            return Err(SpanError::Reference {
                cigar: ref_len,
                offsets: ref_span,
            });
        }

        let query_len = span_sum(cigar, CigarOp::Insertion);
        let query_span = self.read_end1 as i64 - self.read_begin1 as i64 + 1;
        if query_len as i64 != query_span {
            return Err(SpanError::Query {
                cigar: query_len,
                offsets: query_span,
            });
        }

        Ok(())
    }
}

/// Sum of the `M` lengths and the `gap` lengths.
fn span_sum(cigar: &Cigar, gap: CigarOp) -> u64 {
    cigar
        .iter()
        .filter(|&(_, op)| op == CigarOp::Match || op == gap)
        .map(|(len, _)| len as u64)
        .sum()
}

impl fmt::Display for AlignmentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Alignment(")?;
        match &self.cigar {
            Some(cigar) => writeln!(f, "  CIGAR={}", cigar)?,
            None => writeln!(f, "  CIGAR=None")?,
        }
        writeln!(f, "  optimal_score={}", self.score1)?;
        writeln!(f, "  sub_optimal_score={}", self.score2)?;
        writeln!(f, "  reference_start={}", self.ref_begin1)?;
        writeln!(f, "  reference_end={}", self.ref_end1)?;
        writeln!(f, "  read_start={}", self.read_begin1)?;
        writeln!(f, "  read_end={}", self.read_end1)?;
        writeln!(f, "  cigar_pair_list={:?}", self.cigar_pairs())?;
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AlignmentResult {
        AlignmentResult::new(21, 8, 8, 21, 0, 14).with_cigar("8M1I6M".parse().unwrap())
    }

    #[test]
    fn test_cigar_accessors() {
        let result = sample();
        assert_eq!(result.cigar_len(), 3);
        assert_eq!(result.cigar_values(1), Some((1, CigarOp::Insertion)));
        assert_eq!(result.cigar_values(3), None);
        assert_eq!(result.cigar_pairs(), vec![(8, 'M'), (1, 'I'), (6, 'M')]);
        assert_eq!(result.cigar_string().as_deref(), Some("8M1I6M"));
    }

    #[test]
    fn test_without_cigar() {
        let result = AlignmentResult::new(8, 0, 4, 7, 0, 3);
        assert_eq!(result.cigar_len(), 0);
        assert_eq!(result.cigar_values(0), None);
        assert!(result.cigar_pairs().is_empty());
        assert_eq!(result.cigar_string(), None);
        assert!(result.check_spans().is_ok());
    }

    #[test]
    fn test_check_spans() {
        assert!(sample().check_spans().is_ok());

        let bad_ref = AlignmentResult::new(0, 0, 8, 22, 0, 14).with_cigar("8M1I6M".parse().unwrap());
        assert_eq!(
            bad_ref.check_spans(),
            Err(SpanError::Reference { cigar: 14, offsets: 15 })
        );

        let bad_query = AlignmentResult::new(0, 0, 8, 21, 0, 13).with_cigar("8M1I6M".parse().unwrap());
        assert_eq!(
            bad_query.check_spans(),
            Err(SpanError::Query { cigar: 15, offsets: 14 })
        );
    }

    #[test]
    fn test_check_spans_counts_only_match_and_gaps() {
        // Soft clip lies before read_begin1
        let clipped = AlignmentResult::new(8, 0, 0, 3, 2, 5).with_cigar("2S4M".parse().unwrap());
        assert!(clipped.check_spans().is_ok());

        // N and X are not part of either span
        let skipped = AlignmentResult::new(8, 0, 0, 4, 0, 3).with_cigar("2M3N2X2D2I".parse().unwrap());
        assert_eq!(
            skipped.check_spans(),
            Err(SpanError::Reference { cigar: 4, offsets: 5 })
        );
        let fixed = AlignmentResult::new(8, 0, 0, 3, 0, 3).with_cigar("2M3N2X2D2I".parse().unwrap());
        assert!(fixed.check_spans().is_ok());
    }

    #[test]
    fn test_check_spans_skips_unknown_begin() {
        let result = AlignmentResult::new(5, 0, -1, 10, -1, 3).with_cigar("2M".parse().unwrap());
        assert!(result.check_spans().is_ok());
    }

    #[test]
    fn test_display_dump() {
        let text = sample().to_string();
        assert!(text.starts_with("Alignment(\n  CIGAR=8M1I6M\n"));
        assert!(text.contains("  optimal_score=21\n"));
        assert!(text.contains("  cigar_pair_list=[(8, 'M'), (1, 'I'), (6, 'M')]\n"));
        assert!(text.ends_with(')'));
    }
}
