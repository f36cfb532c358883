//! Parsers for variant files and the tabular inputs around them.
//!
//! This module provides parsers for:
//!
//! - **VCF files**: streaming header + record reader and writer (noodles), plain or BGZF
//! - **TSV files**: custom mismatch site catalogs and contig rename tables
//! - **FASTA files**: reference base lookup for verifying mismatch sites
//!
//! ## Example
//!
//! ```rust,no_run
//! use ref_reconcile::parsing::vcf::{open_vcf, VcfReader};
//! use std::path::Path;
//!
//! let mut reader = VcfReader::new(open_vcf(Path::new("calls.vcf.gz")).unwrap()).unwrap();
//! println!("{} samples", reader.header().sample_count());
//! for record in reader.records() {
//!     let record = record.unwrap();
//!     println!("{}:{}", record.chrom(), record.pos());
//! }
//! ```

use thiserror::Error;

pub mod fasta;
pub mod tsv;
pub mod vcf;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid VCF format: {0}")]
    InvalidFormat(String),

    #[error("Invalid VCF record on line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    #[error("Too many contigs: {0} exceeds maximum allowed (100000)")]
    TooManyContigs(usize),
}
