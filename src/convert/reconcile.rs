use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use crate::parsing::vcf::{VcfReader, VcfRecord, VcfWriter};
use crate::reconcile::{
    Ambiguity, Outcome, ReconcileConfig, ReconcileError, ReconcileStats, ReconciliationEngine,
    RejectPolicy,
};

use super::ConvertError;

/// Reconcile every record of `reader` into `writer`, in input order.
///
/// Unchanged records are written exactly as read. Rejected records either
/// abort the pass or, under [`RejectPolicy::Skip`], are left out of the
/// output and copied verbatim to `rejected` when one is given. The input
/// header is written to both outputs.
///
/// # Errors
///
/// Returns `ConvertError::Rejected` for the first rejected record under
/// [`RejectPolicy::Abort`], or any read/write error.
pub fn reconcile_vcf<R: BufRead, W: Write>(
    reader: &mut VcfReader<R>,
    writer: &mut VcfWriter<W>,
    engine: &ReconciliationEngine<'_>,
    config: &ReconcileConfig,
    mut rejected: Option<&mut VcfWriter<W>>,
) -> Result<ReconcileStats, ConvertError> {
    let header = reader.header().clone();
    writer.write_header(&header)?;
    if let Some(rejected) = rejected.as_deref_mut() {
        rejected.write_header(&header)?;
    }

    let mut stats = ReconcileStats::default();

    while let Some(record) = reader.read_record()? {
        let result = reconcile_record(&record, engine);
        stats.record(&result);

        match result {
            Ok(Outcome::Unchanged) => writer.write_record(&record)?,
            Ok(Outcome::Rewritten(variant)) => {
                writer.write_record(&record.with_variant(
                    &variant,
                    &header,
                    config.clear_allele_fields,
                ))?;
            }
            Ok(Outcome::Dropped) => {}
            Err(e) => match config.reject_policy {
                RejectPolicy::Abort => {
                    return Err(ConvertError::Rejected {
                        line: reader.line_number(),
                        source: e,
                    });
                }
                RejectPolicy::Skip => {
                    warn!("Skipping line {}: {e}", reader.line_number());
                    if let Some(rejected) = rejected.as_deref_mut() {
                        rejected.write_record(&record)?;
                    }
                }
            },
        }
    }

    info!(
        "Reconciled {} records: {} unchanged, {} rewritten, {} dropped, {} rejected",
        stats.records, stats.unchanged, stats.rewritten, stats.dropped, stats.rejected
    );

    Ok(stats)
}

fn reconcile_record(
    record: &VcfRecord,
    engine: &ReconciliationEngine<'_>,
) -> Result<Outcome, ReconcileError> {
    // Genotypes are only parsed for records near a site
    if !engine.touches(record.chrom(), record.pos(), record.reference().len()) {
        return Ok(Outcome::Unchanged);
    }

    let variant = record
        .to_variant()
        .map_err(|e| ReconcileError::AmbiguousGenotype {
            chrom: record.chrom().to_string(),
            pos: record.pos(),
            reason: Ambiguity::Malformed {
                sample: e.sample,
                value: e.value,
            },
        })?;

    let outcome = engine.reconcile(&variant);
    if let Err(e) = &outcome {
        debug!("{e}");
    }
    outcome
}
