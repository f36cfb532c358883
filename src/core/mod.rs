//! Core data types for cross-assembly reconciliation.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`MismatchSite`](site::MismatchSite): a position where the source and target assemblies carry different reference bases
//! - [`VariantRecord`](variant::VariantRecord), [`Genotype`](variant::Genotype): the parts of a variant call reconciliation works on
//! - [`Contig`](contig::Contig): a header sequence declaration with name, length, and optional MD5
//! - [`Assembly`](types::Assembly), [`NamingConvention`](types::NamingConvention): assembly and contig naming metadata
//!
//! ## Contig Naming
//!
//! Different reference sources use different naming conventions:
//!
//! | Source | Chromosome 1 | Mitochondrial |
//! |--------|--------------|---------------|
//! | UCSC   | chr1         | chrM          |
//! | NCBI   | 1            | MT            |
//!
//! Sites and records are matched on **exact names**; converting between
//! conventions is the job of [`translate`](crate::translate).

pub mod contig;
pub mod site;
pub mod types;
pub mod variant;
