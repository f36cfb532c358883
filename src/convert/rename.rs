use std::collections::HashMap;
use std::io::{BufRead, Write};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::parsing::vcf::{VcfReader, VcfWriter};
use crate::translate::ContigTranslator;

use super::ConvertError;

/// Per-pass counts for a contig rename
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameStats {
    pub records: usize,
    /// Records whose contig name changed
    pub renamed: usize,
    /// Records kept under the same name
    pub unchanged: usize,
    /// Records on contigs with no counterpart, left out of the output
    pub removed: usize,
    /// Header contig declarations removed
    pub contigs_removed: Vec<String>,
}

impl RenameStats {
    /// Records written to output
    pub fn emitted(&self) -> usize {
        self.renamed + self.unchanged
    }
}

/// Translate the contig of every record of `reader` into `writer`.
///
/// The header's contig declarations are re-emitted in their original order
/// under translated names. Records on contigs with no counterpart are left
/// out and counted.
///
/// # Errors
///
/// Returns any read or write error.
pub fn rename_vcf<R: BufRead, W: Write>(
    reader: &mut VcfReader<R>,
    writer: &mut VcfWriter<W>,
    translator: &ContigTranslator,
) -> Result<RenameStats, ConvertError> {
    let (header, contigs_removed) = translator.translate_header(reader.header());
    for name in &contigs_removed {
        warn!("Contig {name} has no counterpart; removing it and its records");
    }
    writer.write_header(&header)?;

    let mut stats = RenameStats {
        contigs_removed,
        ..RenameStats::default()
    };
    // Translate each distinct contig name once
    let mut cache: HashMap<String, Option<String>> = HashMap::new();

    while let Some(record) = reader.read_record()? {
        stats.records += 1;

        let target = cache
            .entry(record.chrom().to_string())
            .or_insert_with(|| translator.translate(record.chrom()));

        match target.as_deref() {
            Some(name) if name == record.chrom() => {
                stats.unchanged += 1;
                writer.write_record(&record)?;
            }
            Some(name) => {
                stats.renamed += 1;
                writer.write_record(&record.with_chrom(name))?;
            }
            None => {
                debug!(
                    "Removing {}:{} (no counterpart contig)",
                    record.chrom(),
                    record.pos()
                );
                stats.removed += 1;
            }
        }
    }

    info!(
        "Renamed {} of {} records; removed {} records on {} contigs",
        stats.renamed,
        stats.records,
        stats.removed,
        stats.contigs_removed.len()
    );

    Ok(stats)
}
