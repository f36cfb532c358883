//! Record reconciliation against a mismatch site registry.
//!
//! A record expressed against the source assembly (GRCh38) is rewritten so
//! that it is valid under the target assembly (GRCh37):
//!
//! 1. **Overlap**: find the registry site covered by the REF span
//! 2. **Rewrite**: substitute the target base into REF; the old REF becomes a candidate allele
//! 3. **Reindex**: merge identical alleles, remap genotypes, prune unreferenced ALTs
//! 4. **Decide**: unchanged, rewritten, dropped (all samples now REF), or rejected
//!
//! ## Example
//!
//! ```rust
//! use ref_reconcile::{MismatchRegistry, Outcome, ReconciliationEngine, VariantRecord};
//! use ref_reconcile::core::variant::Genotype;
//!
//! let registry = MismatchRegistry::load_embedded().unwrap();
//! let engine = ReconciliationEngine::new(&registry);
//!
//! let record = VariantRecord::new("chr2", 21_012_603, "C", vec!["A".to_string()])
//!     .with_genotypes(vec!["0/1".parse::<Genotype>().unwrap()]);
//!
//! match engine.reconcile(&record).unwrap() {
//!     Outcome::Rewritten(rewritten) => {
//!         assert_eq!(rewritten.reference, "T");
//!         assert_eq!(rewritten.alternates, vec!["C", "A"]);
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

use std::fmt;

use thiserror::Error;

pub mod engine;
pub mod genotype;
pub mod rewrite;

pub use engine::{Outcome, ReconcileConfig, ReconcileStats, ReconciliationEngine, RejectPolicy};

/// Why a genotype cannot be safely remapped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ambiguity {
    /// A sample has a no-call (`.`) allele
    UnknownCall { sample: usize },
    /// A sample references an allele index the record does not have
    IndexOutOfRange {
        sample: usize,
        index: usize,
        allele_count: usize,
    },
    /// The GT value could not be parsed
    Malformed { sample: usize, value: String },
    /// The record carries no genotypes to classify
    NoGenotypes,
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCall { sample } => write!(f, "sample {sample} has an unknown allele call"),
            Self::IndexOutOfRange {
                sample,
                index,
                allele_count,
            } => write!(
                f,
                "sample {sample} references allele {index} but the record has {allele_count} alleles"
            ),
            Self::Malformed { sample, value } => {
                write!(f, "sample {sample} has malformed genotype '{value}'")
            }
            Self::NoGenotypes => write!(f, "record has no genotypes"),
        }
    }
}

/// A record that cannot be reconciled without guessing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error(
        "REF base at {chrom}:{site_pos} is '{found}' but the registry expects '{expected}' (record at {chrom}:{pos})"
    )]
    InconsistentSite {
        chrom: String,
        pos: u64,
        site_pos: u64,
        expected: char,
        found: char,
    },

    #[error("Ambiguous genotype at {chrom}:{pos}: {reason}")]
    AmbiguousGenotype {
        chrom: String,
        pos: u64,
        reason: Ambiguity,
    },

    #[error("Record at {chrom}:{pos} overlaps multiple mismatch sites: {positions:?}")]
    MultipleSites {
        chrom: String,
        pos: u64,
        positions: Vec<u64>,
    },
}
