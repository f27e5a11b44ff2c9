//! # sswtext - Smith-Waterman result printing
//!
//! Encoding and text output around a striped Smith-Waterman aligner. The
//! aligner itself lives elsewhere; this crate prepares its input and prints
//! its output.
//!
//! ## Architecture
//!
//! - `encode`: nucleotide bytes to base codes (0=A, 1=C, 2=G, 3=T, 4=other)
//! - `cigar`: packed CIGAR operations, parsing and formatting
//! - `model`: the alignment result record
//! - `render`: the CIGAR line and the BLAST-like block view
//!
//! ## Example
//!
//! ```
//! use sswtext::model::AlignmentResult;
//! use sswtext::render::{render_alignment, render_cigar};
//!
//! let result = AlignmentResult::new(12, 0, 0, 7, 0, 7)
//!     .with_cigar("8M".parse().unwrap());
//!
//! assert_eq!(render_cigar(&result), "CIGAR start index 0: 8M");
//! let text = render_alignment(&result, b"ACGTACGT", b"ACGAACGT").unwrap();
//! assert!(text.contains("|||*||||"));
//! ```

pub mod cigar;
pub mod encode;
pub mod model;
pub mod render;
