//! Text rendering of alignment results.
//!
//! Two forms are produced:
//! - a compact CIGAR line (`CIGAR start index 8: 8M1I6M`)
//! - a BLAST-like view: a score/offset header followed by blocks of
//!   reference, marker and query rows (see [`blocks`])
//!
//! Rendering never modifies the result or the sequences. A missing CIGAR is
//! not an error: the CIGAR line reads `no CIGAR` and the block view is empty.

pub mod blocks;
pub mod offset;

use std::fmt;
use std::io::{self, Write};

use log::debug;
use thiserror::Error;

use crate::encode::{base_code, EncodingError};
use crate::model::AlignmentResult;

pub use blocks::{Block, Blocks};
pub use offset::format_offset_pair;

/// Number of alignment columns per block.
pub const DEFAULT_WIDTH: usize = 60;

/// Minimum width of the row label field.
const LABEL_FIELD: usize = 8;

/// Which sequence a position refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceRole {
    Reference,
    Query,
}

impl fmt::Display for SequenceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceRole::Reference => write!(f, "reference"),
            SequenceRole::Query => write!(f, "query"),
        }
    }
}

/// Errors that can occur while rendering an alignment.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("Cannot compare bases: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Alignment reaches {sequence} position {position}, sequence length is {length}")]
    PositionOutOfRange {
        sequence: SequenceRole,
        position: i64,
        length: usize,
    },

    #[error("Block width must be at least 1")]
    InvalidWidth,
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// How the marker row decides between `|` and `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerComparison {
    /// Compare base codes: case-insensitive, all ambiguity codes are equal
    #[default]
    BaseCode,
    /// Compare raw bytes
    Exact,
}

impl MarkerComparison {
    /// Compares a reference byte at `q` with a query byte at `p`.
    pub(crate) fn same(self, r: u8, q: i64, s: u8, p: i64) -> RenderResult<bool> {
        match self {
            MarkerComparison::Exact => Ok(r == s),
            MarkerComparison::BaseCode => {
                let r = base_code(r).map_err(|_| EncodingError::NonAscii {
                    byte: r,
                    position: q as usize,
                })?;
                let s = base_code(s).map_err(|_| EncodingError::NonAscii {
                    byte: s,
                    position: p as usize,
                })?;
                Ok(r == s)
            }
        }
    }
}

/// Field names of the begin/end offsets in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderKeys {
    pub ref_begin: String,
    pub ref_end: String,
    pub query_begin: String,
    pub query_end: String,
}

impl Default for HeaderKeys {
    fn default() -> Self {
        Self {
            ref_begin: "target_begin".to_string(),
            ref_end: "target_end".to_string(),
            query_begin: "query_begin".to_string(),
            query_end: "query_end".to_string(),
        }
    }
}

impl HeaderKeys {
    /// Keys used by the read printer.
    pub fn read_printer() -> Self {
        Self {
            ref_begin: "reference_start".to_string(),
            ref_end: "reference_end".to_string(),
            query_begin: "read_start".to_string(),
            query_end: "read_end".to_string(),
        }
    }
}

/// Options for the block view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Alignment columns per block
    pub width: usize,
    /// Label of the reference row
    pub reference_label: String,
    /// Label of the query row
    pub query_label: String,
    /// Marker row comparison
    pub comparison: MarkerComparison,
    /// Offset field names of the header
    pub header_keys: HeaderKeys,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            reference_label: "Target:".to_string(),
            query_label: "Query:".to_string(),
            comparison: MarkerComparison::BaseCode,
            header_keys: HeaderKeys::default(),
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout of the read printer: `reference_start`/`read_start` header
    /// keys, `Refer:`/`Read:` rows, exact comparison.
    pub fn read_labels() -> Self {
        Self::default()
            .with_labels("Refer:", "Read:")
            .with_comparison(MarkerComparison::Exact)
            .with_header_keys(HeaderKeys::read_printer())
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_labels(mut self, reference: impl Into<String>, query: impl Into<String>) -> Self {
        self.reference_label = reference.into();
        self.query_label = query.into();
        self
    }

    pub fn with_comparison(mut self, comparison: MarkerComparison) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn with_header_keys(mut self, keys: HeaderKeys) -> Self {
        self.header_keys = keys;
        self
    }

    /// Checks the options before rendering.
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 {
            return Err(RenderError::InvalidWidth);
        }
        Ok(())
    }

    fn label_field(&self) -> usize {
        LABEL_FIELD
            .max(self.reference_label.len())
            .max(self.query_label.len())
    }
}

/// Renders the compact CIGAR line.
///
/// # Examples
///
/// ```
/// use sswtext::model::AlignmentResult;
/// use sswtext::render::render_cigar;
///
/// let result = AlignmentResult::new(21, 8, 8, 21, 0, 14)
///     .with_cigar("8M1I6M".parse().unwrap());
/// assert_eq!(render_cigar(&result), "CIGAR start index 8: 8M1I6M");
///
/// let bare = AlignmentResult::new(21, 8, 8, 21, 0, 14);
/// assert_eq!(render_cigar(&bare), "no CIGAR");
/// ```
pub fn render_cigar(result: &AlignmentResult) -> String {
    match &result.cigar {
        Some(cigar) => format!("CIGAR start index {}: {}", result.ref_begin1, cigar),
        None => "no CIGAR".to_string(),
    }
}

/// Writes the compact CIGAR line followed by a newline.
pub fn write_cigar<W: Write>(writer: &mut W, result: &AlignmentResult) -> io::Result<()> {
    writeln!(writer, "{}", render_cigar(result))
}

/// Renders the BLAST-like view with the default options.
pub fn render_alignment(
    result: &AlignmentResult,
    reference: &[u8],
    query: &[u8],
) -> RenderResult<String> {
    render_alignment_with(result, reference, query, &RenderConfig::default())
}

/// Renders the BLAST-like view into a string.
///
/// Non-UTF-8 sequence bytes are replaced; use [`write_alignment_with`] to get
/// the raw bytes.
pub fn render_alignment_with(
    result: &AlignmentResult,
    reference: &[u8],
    query: &[u8],
    config: &RenderConfig,
) -> RenderResult<String> {
    let mut out = Vec::new();
    write_alignment_with(&mut out, result, reference, query, config)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Writes the BLAST-like view with the default options.
pub fn write_alignment<W: Write>(
    writer: &mut W,
    result: &AlignmentResult,
    reference: &[u8],
    query: &[u8],
) -> RenderResult<()> {
    write_alignment_with(writer, result, reference, query, &RenderConfig::default())
}

/// Writes the BLAST-like view.
///
/// The header is always written. Blocks are written one at a time, so on a
/// [`RenderError::PositionOutOfRange`] the blocks before the faulty one are
/// already in `writer`.
pub fn write_alignment_with<W: Write>(
    writer: &mut W,
    result: &AlignmentResult,
    reference: &[u8],
    query: &[u8],
    config: &RenderConfig,
) -> RenderResult<()> {
    config.validate()?;
    write_header(writer, result, &config.header_keys)?;

    let Some(cigar) = &result.cigar else {
        debug!("no CIGAR, header only");
        return Ok(());
    };

    let blocks = Blocks::new(
        cigar.as_packed(),
        result.ref_begin1,
        result.read_begin1,
        reference,
        query,
        config,
    );

    let mut count = 0;
    for block in blocks {
        write_block(writer, &block?, config)?;
        count += 1;
    }

    debug!(
        "rendered {} blocks of width {} for {} CIGAR operations",
        count,
        config.width,
        cigar.len()
    );
    Ok(())
}

fn write_header<W: Write>(
    writer: &mut W,
    result: &AlignmentResult,
    keys: &HeaderKeys,
) -> io::Result<()> {
    writeln!(
        writer,
        "optimal_score: {}\tsub-optimal_score: {}\t",
        result.score1, result.score2
    )?;
    if result.ref_begin1 >= 0 {
        write!(writer, "{}: {}\t", keys.ref_begin, result.ref_begin1)?;
    }
    writeln!(writer, "{}: {}\t", keys.ref_end, result.ref_end1)?;
    if result.read_begin1 >= 0 {
        write!(writer, "{}: {}\t", keys.query_begin, result.read_begin1)?;
    }
    write!(writer, "{}: {}\n\n", keys.query_end, result.read_end1)
}

fn write_block<W: Write>(writer: &mut W, block: &Block, config: &RenderConfig) -> io::Result<()> {
    let field = config.label_field();

    write!(writer, "{:<field$}{:>8}    ", config.reference_label, block.ref_start)?;
    writer.write_all(&block.reference)?;
    writeln!(writer, "    {}", block.ref_last)?;

    write!(writer, "{:indent$}", "", indent = field + 12)?;
    writer.write_all(&block.markers)?;
    writeln!(writer)?;

    write!(writer, "{:<field$}{:>8}    ", config.query_label, block.query_start)?;
    writer.write_all(&block.query)?;
    write!(writer, "    {}\n\n", block.query_last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(cigar: &str) -> AlignmentResult {
        AlignmentResult::new(14, 0, 0, 7, 0, 7).with_cigar(cigar.parse().unwrap())
    }

    #[test]
    fn test_render_cigar_line() {
        let r = AlignmentResult::new(21, 8, 8, 21, 0, 14).with_cigar("8M1I6M".parse().unwrap());
        assert_eq!(render_cigar(&r), "CIGAR start index 8: 8M1I6M");

        let mut out = Vec::new();
        write_cigar(&mut out, &r).unwrap();
        assert_eq!(out, b"CIGAR start index 8: 8M1I6M\n");
    }

    #[test]
    fn test_render_no_cigar() {
        let r = AlignmentResult::new(21, 8, 8, 21, 0, 14);
        assert_eq!(render_cigar(&r), "no CIGAR");
    }

    #[test]
    fn test_header_only_without_cigar() {
        let r = AlignmentResult::new(8, 0, 4, 7, 0, 3);
        let text = render_alignment(&r, b"TTTTACGTCCCCC", b"ACGT").unwrap();
        assert_eq!(
            text,
            "optimal_score: 8\tsub-optimal_score: 0\t\n\
             target_begin: 4\ttarget_end: 7\t\n\
             query_begin: 0\tquery_end: 3\n\n"
        );
    }

    #[test]
    fn test_header_hides_negative_begin() {
        let r = AlignmentResult::new(8, 0, -1, 7, -1, 3);
        let text = render_alignment(&r, b"", b"").unwrap();
        assert_eq!(
            text,
            "optimal_score: 8\tsub-optimal_score: 0\t\n\
             target_end: 7\t\n\
             query_end: 3\n\n"
        );
    }

    #[test]
    fn test_single_block_layout() {
        let text = render_alignment(&result("8M"), b"ACGTACGT", b"ACGAACGT").unwrap();
        let body: Vec<&str> = text.lines().skip(4).take(3).collect();
        assert_eq!(
            body,
            vec![
                "Target:        0    ACGTACGT    7",
                "                    |||*||||",
                "Query:         0    ACGAACGT    7",
            ]
        );
        assert!(text.ends_with("    7\n\n"));
    }

    #[test]
    fn test_read_labels() {
        let config = RenderConfig::read_labels();
        let text = render_alignment_with(&result("8M"), b"ACGTACGT", b"ACGTACGt", &config).unwrap();
        assert!(text.contains("Refer:         0    ACGTACGT    7\n"));
        assert!(text.contains("                    |||||||*\n"));
        assert!(text.contains("Read:          0    ACGTACGt    7\n"));
    }

    #[test]
    fn test_read_labels_header_keys() {
        let config = RenderConfig::read_labels();
        let text = render_alignment_with(&result("8M"), b"ACGTACGT", b"ACGTACGT", &config).unwrap();
        assert!(text.starts_with(
            "optimal_score: 14\tsub-optimal_score: 0\t\n\
             reference_start: 0\treference_end: 7\t\n\
             read_start: 0\tread_end: 7\n\n"
        ));
        assert!(!text.contains("target_"));
        assert!(!text.contains("query_"));
    }

    #[test]
    fn test_marker_comparison() {
        assert!(MarkerComparison::BaseCode.same(b'a', 0, b'A', 0).unwrap());
        assert!(MarkerComparison::BaseCode.same(b'N', 0, b'R', 0).unwrap());
        assert!(!MarkerComparison::Exact.same(b'a', 0, b'A', 0).unwrap());
        assert!(MarkerComparison::Exact.same(b'\xff', 0, b'\xff', 0).unwrap());

        let err = MarkerComparison::BaseCode.same(b'A', 3, b'\xff', 5).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Encoding(EncodingError::NonAscii { byte: 0xff, position: 5 })
        ));
    }

    #[test]
    fn test_long_label_widens_indent() {
        let config = RenderConfig::default().with_labels("Reference:", "Q:");
        let text = render_alignment_with(&result("2M"), b"AC", b"AC", &config).unwrap();
        assert!(text.contains("Reference:       0    AC    1\n"));
        assert!(text.contains("\n                      ||\n"));
        assert!(text.contains("Q:               0    AC    1\n"));
    }

    #[test]
    fn test_zero_width_rejected() {
        let config = RenderConfig::default().with_width(0);
        assert!(matches!(
            render_alignment_with(&result("8M"), b"ACGTACGT", b"ACGTACGT", &config),
            Err(RenderError::InvalidWidth)
        ));
    }

    #[test]
    fn test_non_ascii_reported() {
        let err = render_alignment(&result("2M"), b"A\xffGT", b"ACGT").unwrap_err();
        assert!(matches!(
            err,
            RenderError::Encoding(EncodingError::NonAscii { byte: 0xff, position: 1 })
        ));
    }

    #[test]
    fn test_partial_output_on_error() {
        let config = RenderConfig::default().with_width(2);
        let mut out = Vec::new();
        let err = write_alignment_with(&mut out, &result("4M"), b"ACG", b"ACGT", &config);
        assert!(matches!(err, Err(RenderError::PositionOutOfRange { .. })));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Target:        0    AC    1\n"));
        assert!(!text.contains("Target:        2"));
    }
}
