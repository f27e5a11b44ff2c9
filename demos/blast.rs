//! Prints a BLAST-like view of a fixed genome alignment.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example blast
//! ```

use std::io::{self, Write};

use anyhow::Result;

use sswtext::cigar::{Cigar, CigarOp};
use sswtext::encode::encode;
use sswtext::model::AlignmentResult;
use sswtext::render::{format_offset_pair, write_alignment, write_alignment_with, write_cigar, RenderConfig};

fn main() -> Result<()> {
    env_logger::init();

    let reference = b"CAGCCTTTCTGACCCGGAAATCAAAATAGGCACAACAAA";
    let read = b"CTGAGCCGGTAAATC";

    // Aligns to reference 8..=21 with one mismatch and one inserted base
    let cigar = Cigar::from_pairs([(9, CigarOp::Match), (1, CigarOp::Insertion), (5, CigarOp::Match)])?;
    let result = AlignmentResult::new(21, 8, 8, 21, 0, 14).with_cigar(cigar);
    result.check_spans()?;

    println!("Reference codes: {:?}", encode(reference)?);
    println!("Read codes:      {:?}\n", encode(read)?);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "> 1. BLAST-like output\n")?;
    write_cigar(&mut handle, &result)?;
    write_alignment(&mut handle, &result, reference, read)?;

    writeln!(handle, "> 2. Read printer layout\n")?;
    write_alignment_with(&mut handle, &result, reference, read, &RenderConfig::read_labels())?;

    writeln!(handle, "> 3. Offset layout\n")?;
    let (ref_line, read_line) = format_offset_pair(reference, read, &result);
    writeln!(handle, "{}\n{}", ref_line, read_line)?;

    writeln!(handle, "\n{}", result)?;
    Ok(())
}
