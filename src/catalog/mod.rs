//! Mismatch site registry storage and overlap lookup.
//!
//! The registry lists known single-base discrepancies between a source
//! assembly (GRCh38) and a target assembly (GRCh37). An embedded catalog is
//! compiled into the binary, but custom catalogs can also be loaded from JSON
//! or TSV files.
//!
//! ## Embedded Catalog
//!
//! | GRCh38 | Base | GRCh37 | Base |
//! |--------|------|--------|------|
//! | chr2:21012603 | C | chr2:21235475 | T |
//!
//! ## Example
//!
//! ```rust,no_run
//! use ref_reconcile::MismatchRegistry;
//! use std::path::Path;
//!
//! // Load embedded catalog
//! let registry = MismatchRegistry::load_embedded().unwrap();
//! let site = registry.lookup("chr2", 21_012_603);
//!
//! // Or a custom catalog
//! let custom = MismatchRegistry::load_from_file(Path::new("sites.tsv")).unwrap();
//! ```

pub mod index;
pub mod store;
