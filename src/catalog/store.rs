use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::site::{MismatchSite, SiteKey};
use crate::core::types::Assembly;
use crate::utils::validation::is_valid_base;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid catalog line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    #[error("Duplicate mismatch site {chrom}:{pos}")]
    DuplicateSite { chrom: String, pos: u64 },

    #[error("Invalid {field} '{base}' for site {chrom}:{pos}: expected a single A, C, G or T")]
    InvalidBase {
        chrom: String,
        pos: u64,
        field: &'static str,
        base: char,
    },

    #[error("Invalid position for site on {chrom}: positions are 1-based")]
    ZeroPosition { chrom: String },
}

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// Serializable catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    pub source_assembly: Assembly,
    pub target_assembly: Assembly,
    pub sites: Vec<MismatchSite>,
}

/// Registry of known single-base discrepancies between two assemblies.
///
/// Built once and read-only afterwards. Entries keep insertion order.
#[derive(Debug)]
pub struct MismatchRegistry {
    pub source_assembly: Assembly,
    pub target_assembly: Assembly,

    /// All sites in insertion order
    sites: Vec<MismatchSite>,

    /// Index: (source_chrom, source_pos) -> index in sites vec
    key_to_index: HashMap<SiteKey, usize>,

    /// Index: source_chrom -> (source_pos, index) sorted by position
    chrom_to_positions: HashMap<String, Vec<(u64, usize)>>,
}

impl MismatchRegistry {
    /// Create an empty registry
    pub fn new(source_assembly: Assembly, target_assembly: Assembly) -> Self {
        Self {
            source_assembly,
            target_assembly,
            sites: Vec::new(),
            key_to_index: HashMap::new(),
            chrom_to_positions: HashMap::new(),
        }
    }

    /// Load the embedded default catalog (GRCh38 -> GRCh37)
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded catalog is malformed.
    pub fn load_embedded() -> Result<Self, CatalogError> {
        // Validated at compile time by build.rs
        const EMBEDDED_CATALOG: &str = include_str!("../../catalogs/mismatch_sites.json");
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Load a catalog from a JSON or TSV file, chosen by extension
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains a malformed entry.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let is_tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv") || e.eq_ignore_ascii_case("txt"));

        if is_tsv {
            crate::parsing::tsv::parse_sites_text(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Parse a catalog from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error on invalid JSON, duplicate keys, or non-single-base entries.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != CATALOG_VERSION {
            tracing::warn!(
                "Catalog version mismatch (expected {}, found {})",
                CATALOG_VERSION,
                data.version
            );
        }

        let mut registry = Self::new(data.source_assembly, data.target_assembly);
        for site in data.sites {
            registry.add_site(site)?;
        }

        Ok(registry)
    }

    /// Add a site to the registry, validating it first
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateSite` if the key is already present,
    /// `CatalogError::InvalidBase` for bases other than A/C/G/T, or
    /// `CatalogError::ZeroPosition` for a position of 0.
    pub fn add_site(&mut self, site: MismatchSite) -> Result<(), CatalogError> {
        validate_site(&site)?;

        let key = site.key();
        if self.key_to_index.contains_key(&key) {
            return Err(CatalogError::DuplicateSite {
                chrom: key.0,
                pos: key.1,
            });
        }

        let index = self.sites.len();
        let positions = self
            .chrom_to_positions
            .entry(site.source_chrom.clone())
            .or_default();
        let slot = positions.partition_point(|(pos, _)| *pos < site.source_pos);
        positions.insert(slot, (site.source_pos, index));

        self.key_to_index.insert(key, index);
        self.sites.push(site);
        Ok(())
    }

    /// Look up the site at an exact source position
    pub fn lookup(&self, chrom: &str, pos: u64) -> Option<&MismatchSite> {
        self.key_to_index
            .get(&(chrom.to_string(), pos))
            .map(|&idx| &self.sites[idx])
    }

    /// All sites whose source position lies in `[start, end]` on `chrom`, by position
    pub fn sites_in_span(&self, chrom: &str, start: u64, end: u64) -> Vec<&MismatchSite> {
        let Some(positions) = self.chrom_to_positions.get(chrom) else {
            return Vec::new();
        };

        let first = positions.partition_point(|(pos, _)| *pos < start);
        positions[first..]
            .iter()
            .take_while(|(pos, _)| *pos <= end)
            .map(|&(_, idx)| &self.sites[idx])
            .collect()
    }

    /// Whether any site lies on this source chromosome
    pub fn has_chrom(&self, chrom: &str) -> bool {
        self.chrom_to_positions.contains_key(chrom)
    }

    /// Sites in insertion order
    pub fn sites(&self) -> &[MismatchSite] {
        &self.sites
    }

    /// Export catalog to JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            source_assembly: self.source_assembly.clone(),
            target_assembly: self.target_assembly.clone(),
            sites: self.sites.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of sites in the registry
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

fn validate_site(site: &MismatchSite) -> Result<(), CatalogError> {
    if site.source_pos == 0 {
        return Err(CatalogError::ZeroPosition {
            chrom: site.source_chrom.clone(),
        });
    }
    if site.target_pos == 0 {
        return Err(CatalogError::ZeroPosition {
            chrom: site.target_chrom.clone(),
        });
    }

    for (field, base) in [
        ("source_base", site.source_base),
        ("target_base", site.target_base),
    ] {
        if !is_valid_base(base) {
            return Err(CatalogError::InvalidBase {
                chrom: site.source_chrom.clone(),
                pos: site.source_pos,
                field,
                base,
            });
        }
    }

    Ok(())
}
