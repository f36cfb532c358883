//! # ref-reconcile
//!
//! A library for carrying variant calls across human reference assemblies.
//!
//! GRCh38 and GRCh37 disagree on the reference base at a handful of positions.
//! A record called against GRCh38 at such a site cannot simply have its
//! coordinates lifted: its REF allele is wrong for GRCh37, and which samples
//! are "variant" changes with it.
//!
//! `ref-reconcile` rewrites those records. Given a catalog of mismatch sites,
//! each overlapping record gets a REF carrying the target base, an ALT list
//! that includes the old reference allele where samples carry it, and
//! genotypes re-indexed to match. Records that become all-reference are
//! dropped, and records that cannot be rewritten without guessing are rejected.
//!
//! ## Features
//!
//! - **Allele rewriting**: REF substitution, allele merging, and ALT pruning
//! - **Genotype reindexing**: call order and phasing preserved
//! - **Explicit rejection**: no-calls, out-of-range indices, REF disagreements
//! - **Contig renaming**: hg19 → GRCh37 and UCSC ↔ NCBI, with header rebuild
//! - **Streaming VCF passes**: plain or gzip, unchanged records written byte-identical
//!
//! ## Example
//!
//! ```rust
//! use ref_reconcile::{MismatchRegistry, Outcome, ReconciliationEngine, VariantRecord};
//! use ref_reconcile::core::variant::Genotype;
//!
//! // Load the embedded GRCh38 -> GRCh37 catalog
//! let registry = MismatchRegistry::load_embedded().unwrap();
//! let engine = ReconciliationEngine::new(&registry);
//!
//! // A homozygous call for the base GRCh37 already has as reference
//! let record = VariantRecord::new("chr2", 21_012_603, "C", vec!["T".to_string()])
//!     .with_genotypes(vec!["1/1".parse::<Genotype>().unwrap()]);
//!
//! assert_eq!(engine.reconcile(&record).unwrap(), Outcome::Dropped);
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Mismatch site registry storage and overlap lookup
//! - [`core`]: Core data types for sites, variants, and contigs
//! - [`reconcile`]: Allele rewriting, genotype reindexing, and the reconciliation engine
//! - [`translate`]: Contig name translation
//! - [`convert`]: Whole-file VCF reconcile and rename passes
//! - [`parsing`]: Parsers for VCF, TSV, and FASTA files
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod convert;
pub mod core;
pub mod parsing;
pub mod reconcile;
pub mod translate;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::store::MismatchRegistry;
pub use core::contig::Contig;
pub use core::site::MismatchSite;
pub use core::types::*;
pub use core::variant::VariantRecord;
pub use reconcile::{Outcome, ReconcileError, ReconciliationEngine};
pub use translate::ContigTranslator;
