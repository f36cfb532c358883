//! Reference base lookup from FASTA files using noodles.
//!
//! Used to verify mismatch site bases against the assemblies they describe.
//! Supports both uncompressed and gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;

use crate::core::site::SiteKey;
use crate::parsing::ParseError;

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    // Check for gzipped FASTA
    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    // Check for uncompressed FASTA
    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Fetch the base at each 1-based `(chrom, pos)` from a FASTA file.
///
/// Bases are uppercased, so soft-masked sequence compares equal. Positions on
/// contigs the file lacks, or past a contig's end, are absent from the result.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or
/// `ParseError::InvalidFormat` if a record fails to parse.
pub fn fetch_bases(path: &Path, positions: &[SiteKey]) -> Result<HashMap<SiteKey, char>, ParseError> {
    let file = std::fs::File::open(path)?;
    if is_gzipped(path) {
        let reader = BufReader::new(MultiGzDecoder::new(file));
        fetch_from_reader(&mut fasta::io::Reader::new(reader), positions)
    } else {
        let reader = BufReader::new(file);
        fetch_from_reader(&mut fasta::io::Reader::new(reader), positions)
    }
}

fn fetch_from_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
    positions: &[SiteKey],
) -> Result<HashMap<SiteKey, char>, ParseError> {
    let mut wanted: HashMap<&str, Vec<u64>> = HashMap::new();
    for (chrom, pos) in positions {
        wanted.entry(chrom.as_str()).or_default().push(*pos);
    }

    let mut bases = HashMap::new();

    for result in reader.records() {
        let record = result.map_err(|e| {
            ParseError::InvalidFormat(format!("Failed to parse FASTA record: {e}"))
        })?;

        let name = String::from_utf8_lossy(record.name()).to_string();
        let Some(chrom_positions) = wanted.remove(name.as_str()) else {
            continue;
        };

        let sequence = record.sequence().as_ref();
        for pos in chrom_positions {
            let base = pos
                .checked_sub(1)
                .and_then(|offset| usize::try_from(offset).ok())
                .and_then(|offset| sequence.get(offset));
            if let Some(base) = base {
                bases.insert((name.clone(), pos), char::from(base.to_ascii_uppercase()));
            }
        }

        if wanted.is_empty() {
            break;
        }
    }

    Ok(bases)
}
