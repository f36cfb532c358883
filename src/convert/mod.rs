//! Whole-file VCF passes.
//!
//! - [`reconcile`]: rewrite records for the target assembly using a [`ReconciliationEngine`]
//! - [`rename`]: translate contig names with a [`ContigTranslator`]
//!
//! Both passes stream records in input order and report per-pass counts.
//!
//! [`ReconciliationEngine`]: crate::reconcile::ReconciliationEngine
//! [`ContigTranslator`]: crate::translate::ContigTranslator

use thiserror::Error;

use crate::parsing::ParseError;
use crate::reconcile::ReconcileError;

pub mod reconcile;
pub mod rename;

pub use reconcile::reconcile_vcf;
pub use rename::{rename_vcf, RenameStats};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record on input line {line} rejected: {source}")]
    Rejected {
        line: usize,
        #[source]
        source: ReconcileError,
    },
}
