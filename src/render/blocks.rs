//! BLAST-like alignment blocks.
//!
//! An alignment is cut into blocks of at most `width` columns. Each block has
//! three rows:
//!
//! ```text
//! Target:        8    CTGACCCGG-AAATC    21
//!                     ||||*||||*|||||
//! Query:         0    CTGAGCCGGTAAATC    14
//! ```
//!
//! Every CIGAR-expanded unit yields one column in all three rows. Operators
//! advance the cursors as follows:
//!
//! - reference row: every operator except `I` consumes a reference base
//! - marker row: `M` compares and advances both sides, `I` advances the query
//!   side, every other operator advances the reference side
//! - query row: every operator except `D` consumes a query base
//!
//! The marker row keeps its own query cursor because `S`, `=`, `X` and the
//! other non M/I/D operators advance the query row but not the marker row.
//!
//! Between blocks the reference cursor is carried over from the marker row
//! and the query cursor from the query row. When the CIGAR runs out before a
//! block is full neither cursor is carried over; there is no next block.

use log::trace;

use crate::cigar::{op_kind, op_len, CigarOp};

use super::{MarkerComparison, RenderConfig, RenderError, RenderResult, SequenceRole};

/// One rendered block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Reference offset of the first column
    pub ref_start: i64,
    /// Last reference offset consumed (`ref_start - 1` when none)
    pub ref_last: i64,
    /// Query offset of the first column
    pub query_start: i64,
    /// Last query offset consumed (`query_start - 1` when none)
    pub query_last: i64,
    /// Reference row (`-` for insertions)
    pub reference: Vec<u8>,
    /// Marker row (`|` for identical bases, `*` otherwise)
    pub markers: Vec<u8>,
    /// Query row (`-` for deletions)
    pub query: Vec<u8>,
}

/// Position in the CIGAR and in both sequences at a block boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockCursor {
    /// Index of the next CIGAR operation
    op_index: usize,
    /// Units of `op_index` still to render, 0 to start it from scratch
    left: u32,
    ref_pos: i64,
    query_pos: i64,
}

/// Walks up to `budget` units starting at a block cursor.
struct Units<'a> {
    ops: &'a [u32],
    index: usize,
    op: CigarOp,
    remaining: u32,
    budget: usize,
}

impl<'a> Units<'a> {
    fn new(ops: &'a [u32], index: usize, left: u32, budget: usize) -> Self {
        let packed = ops.get(index).copied().unwrap_or(0);
        let remaining = if left > 0 { left } else { op_len(packed) };
        Self {
            ops,
            index,
            op: op_kind(packed),
            remaining,
            budget,
        }
    }

    /// Whether the walk stopped because the block is full.
    fn is_full(&self) -> bool {
        self.budget == 0
    }
}

impl Iterator for Units<'_> {
    type Item = CigarOp;

    fn next(&mut self) -> Option<CigarOp> {
        if self.budget == 0 {
            return None;
        }
        while self.remaining == 0 {
            self.index += 1;
            let packed = *self.ops.get(self.index)?;
            self.op = op_kind(packed);
            self.remaining = op_len(packed);
        }
        self.remaining -= 1;
        self.budget -= 1;
        Some(self.op)
    }
}

/// Iterator over the blocks of an alignment.
pub struct Blocks<'a> {
    ops: &'a [u32],
    reference: &'a [u8],
    query: &'a [u8],
    config: &'a RenderConfig,
    cursor: BlockCursor,
    failed: bool,
}

impl<'a> Blocks<'a> {
    /// Starts at the given begin offsets with the first CIGAR operation.
    pub fn new(
        ops: &'a [u32],
        ref_begin: i32,
        query_begin: i32,
        reference: &'a [u8],
        query: &'a [u8],
        config: &'a RenderConfig,
    ) -> Self {
        Self {
            ops,
            reference,
            query,
            config,
            cursor: BlockCursor {
                op_index: 0,
                left: 0,
                ref_pos: ref_begin as i64,
                query_pos: query_begin as i64,
            },
            failed: false,
        }
    }

    fn next_block(&mut self) -> RenderResult<Block> {
        let cursor = self.cursor;
        let mut block = Block {
            ref_start: cursor.ref_pos,
            ref_last: 0,
            query_start: cursor.query_pos,
            query_last: 0,
            reference: Vec::with_capacity(self.config.width),
            markers: Vec::with_capacity(self.config.width),
            query: Vec::with_capacity(self.config.width),
        };

        let mut q = cursor.ref_pos;
        let mut p = cursor.query_pos;
        let mut marker_p = cursor.query_pos;

        let mut units = Units::new(self.ops, cursor.op_index, cursor.left, self.config.width);
        for op in units.by_ref() {
            if op == CigarOp::Insertion {
                block.reference.push(b'-');
            } else {
                block.reference.push(byte_at(self.reference, q, SequenceRole::Reference)?);
            }

            match op {
                CigarOp::Match => {
                    let r = byte_at(self.reference, q, SequenceRole::Reference)?;
                    let s = byte_at(self.query, marker_p, SequenceRole::Query)?;
                    let same = self.config.comparison.same(r, q, s, marker_p)?;
                    block.markers.push(if same { b'|' } else { b'*' });
                    marker_p += 1;
                }
                CigarOp::Insertion => {
                    block.markers.push(b'*');
                    marker_p += 1;
                }
                _ => block.markers.push(b'*'),
            }

            if op != CigarOp::Insertion {
                q += 1;
            }

            if op == CigarOp::Deletion {
                block.query.push(b'-');
            } else {
                block.query.push(byte_at(self.query, p, SequenceRole::Query)?);
                p += 1;
            }
        }

        block.ref_last = q - 1;
        block.query_last = p - 1;

        self.cursor = if units.is_full() {
            BlockCursor {
                op_index: if units.remaining == 0 { units.index + 1 } else { units.index },
                left: units.remaining,
                ref_pos: q,
                query_pos: p,
            }
        } else {
            BlockCursor {
                op_index: self.ops.len(),
                left: 0,
                ..cursor
            }
        };

        trace!(
            "block ref {}..={} query {}..={} next op {} left {}",
            block.ref_start,
            block.ref_last,
            block.query_start,
            block.query_last,
            self.cursor.op_index,
            self.cursor.left
        );

        Ok(block)
    }
}

impl Iterator for Blocks<'_> {
    type Item = RenderResult<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || (self.cursor.op_index >= self.ops.len() && self.cursor.left == 0) {
            return None;
        }
        let block = self.next_block();
        self.failed = block.is_err();
        Some(block)
    }
}

fn byte_at(sequence: &[u8], position: i64, role: SequenceRole) -> RenderResult<u8> {
    usize::try_from(position)
        .ok()
        .and_then(|i| sequence.get(i))
        .copied()
        .ok_or(RenderError::PositionOutOfRange {
            sequence: role,
            position,
            length: sequence.len(),
        })
}
