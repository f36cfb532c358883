use serde::Serialize;
use tracing::debug;

use crate::catalog::index::OverlapLocator;
use crate::catalog::store::MismatchRegistry;
use crate::core::variant::VariantRecord;

use super::genotype::reindex;
use super::rewrite::rewrite_alleles;
use super::ReconcileError;

/// Result of reconciling one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No mismatch site overlaps the record; emit it as-is
    Unchanged,
    /// New REF, pruned ALTs and remapped genotypes
    Rewritten(VariantRecord),
    /// Every sample is homozygous for the new REF; the record is no longer a variant
    Dropped,
}

impl Outcome {
    /// The record to emit, if any, given the original
    pub fn into_record(self, original: VariantRecord) -> Option<VariantRecord> {
        match self {
            Self::Unchanged => Some(original),
            Self::Rewritten(record) => Some(record),
            Self::Dropped => None,
        }
    }
}

/// What a whole-file pass does with a rejected record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum RejectPolicy {
    /// Stop the pass at the first rejected record
    #[default]
    Abort,
    /// Log the rejected record and continue without it
    Skip,
}

/// Configuration for a reconciliation pass
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub reject_policy: RejectPolicy,
    /// Reset INFO/FORMAT values declared Number=A/R/G on rewritten records
    pub clear_allele_fields: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            reject_policy: RejectPolicy::Abort,
            clear_allele_fields: true,
        }
    }
}

/// Per-pass outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub records: usize,
    pub unchanged: usize,
    pub rewritten: usize,
    pub dropped: usize,
    pub rejected: usize,
}

impl ReconcileStats {
    pub fn record(&mut self, result: &Result<Outcome, ReconcileError>) {
        self.records += 1;
        match result {
            Ok(Outcome::Unchanged) => self.unchanged += 1,
            Ok(Outcome::Rewritten(_)) => self.rewritten += 1,
            Ok(Outcome::Dropped) => self.dropped += 1,
            Err(_) => self.rejected += 1,
        }
    }

    /// Records written to output
    pub fn emitted(&self) -> usize {
        self.unchanged + self.rewritten
    }
}

/// Reconciles records against a read-only mismatch registry.
///
/// Each call is independent; the engine holds no per-record state.
pub struct ReconciliationEngine<'a> {
    locator: OverlapLocator<'a>,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(registry: &'a MismatchRegistry) -> Self {
        Self {
            locator: OverlapLocator::new(registry),
        }
    }

    /// Whether a REF span on `chrom` starting at `pos` could need reconciling.
    ///
    /// Lets callers skip parsing genotypes for the vast majority of records.
    pub fn touches(&self, chrom: &str, pos: u64, reference_len: usize) -> bool {
        let end = crate::core::variant::span_end(pos, reference_len);
        self.locator.touches(chrom, pos, end)
    }

    /// Reconcile a single record.
    ///
    /// # Errors
    ///
    /// Returns a `ReconcileError` when the record cannot be reconciled without
    /// guessing: REF disagrees with the registry, a genotype is unknown or out
    /// of range, or the record spans several sites.
    pub fn reconcile(&self, record: &VariantRecord) -> Result<Outcome, ReconcileError> {
        let Some(overlap) = self.locator.find_overlap(record)? else {
            return Ok(Outcome::Unchanged);
        };

        let candidates = rewrite_alleles(record, &overlap)?;
        let reindexed = reindex(record, &candidates)?;

        if reindexed.is_reference_only() {
            debug!(
                "{}:{} all samples match {} reference, dropping",
                record.chrom, record.pos, overlap.site.target_base
            );
            return Ok(Outcome::Dropped);
        }

        debug!(
            "{}:{} rewritten REF {} -> {}, ALT {} -> {}",
            record.chrom,
            record.pos,
            record.reference,
            reindexed.reference,
            record.alternates.join(","),
            reindexed.alternates.join(",")
        );

        Ok(Outcome::Rewritten(VariantRecord {
            chrom: record.chrom.clone(),
            pos: record.pos,
            reference: reindexed.reference,
            alternates: reindexed.alternates,
            genotypes: reindexed.genotypes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variant::Genotype;

    fn record(pos: u64, reference: &str, alts: &[&str], gt: &str) -> VariantRecord {
        VariantRecord::new(
            "chr2",
            pos,
            reference,
            alts.iter().map(|s| (*s).to_string()).collect(),
        )
        .with_genotypes(vec![gt.parse::<Genotype>().unwrap()])
    }

    fn rewritten(outcome: Outcome) -> (String, String, String) {
        match outcome {
            Outcome::Rewritten(r) => (
                r.reference,
                r.alternates.join(","),
                r.genotypes[0].to_string(),
            ),
            other => panic!("expected rewritten, got {other:?}"),
        }
    }

    #[test]
    fn test_snv_to_other_base() {
        let registry = MismatchRegistry::load_embedded().unwrap();
        let engine = ReconciliationEngine::new(&registry);
        let outcome = engine
            .reconcile(&record(21_012_603, "C", &["A"], "0/1"))
            .unwrap();
        assert_eq!(
            rewritten(outcome),
            ("T".to_string(), "C,A".to_string(), "1/2".to_string())
        );
    }

    #[test]
    fn test_homozygous_target_base_dropped() {
        let registry = MismatchRegistry::load_embedded().unwrap();
        let engine = ReconciliationEngine::new(&registry);
        let outcome = engine
            .reconcile(&record(21_012_603, "C", &["T"], "1/1"))
            .unwrap();
        assert_eq!(outcome, Outcome::Dropped);
        assert!(outcome
            .into_record(record(21_012_603, "C", &["T"], "1/1"))
            .is_none());
    }

    #[test]
    fn test_unknown_genotype_rejected() {
        let registry = MismatchRegistry::load_embedded().unwrap();
        let engine = ReconciliationEngine::new(&registry);
        let result = engine.reconcile(&record(21_012_603, "C", &["T"], "./."));
        assert!(matches!(
            result,
            Err(ReconcileError::AmbiguousGenotype { .. })
        ));
    }

    #[test]
    fn test_non_overlapping_unchanged() {
        let registry = MismatchRegistry::load_embedded().unwrap();
        let engine = ReconciliationEngine::new(&registry);
        let original = record(21_012_604, "ATG", &["A"], "./.");
        let outcome = engine.reconcile(&original).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(outcome.into_record(original.clone()), Some(original));
    }

    #[test]
    fn test_touches() {
        let registry = MismatchRegistry::load_embedded().unwrap();
        let engine = ReconciliationEngine::new(&registry);
        assert!(engine.touches("chr2", 21_012_602, 5));
        assert!(!engine.touches("chr2", 21_012_602, 1));
        assert!(!engine.touches("chr2", 21_012_604, 3));
    }

    #[test]
    fn test_touches_at_maximum_position() {
        let registry = MismatchRegistry::load_embedded().unwrap();
        let engine = ReconciliationEngine::new(&registry);
        assert!(!engine.touches("chr2", u64::MAX, 1));
        assert!(!engine.touches("chr2", u64::MAX, 4));
    }

    #[test]
    fn test_stats() {
        let mut stats = ReconcileStats::default();
        stats.record(&Ok(Outcome::Unchanged));
        stats.record(&Ok(Outcome::Dropped));
        stats.record(&Ok(Outcome::Rewritten(record(1, "C", &["A"], "0/1"))));
        stats.record(&Err(ReconcileError::MultipleSites {
            chrom: "chr1".to_string(),
            pos: 1,
            positions: vec![1, 2],
        }));
        assert_eq!(stats.records, 4);
        assert_eq!(stats.emitted(), 2);
        assert_eq!(stats.rejected, 1);
    }
}
