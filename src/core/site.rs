use serde::{Deserialize, Serialize};

/// Registry key for a mismatch site: source chromosome and 1-based position
pub type SiteKey = (String, u64);

/// A single-base discrepancy between the source and target assemblies.
///
/// At `source_chrom:source_pos` the source assembly carries `source_base`;
/// the same base lies at `target_chrom:target_pos` in the target assembly
/// and reads `target_base` there. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchSite {
    pub source_chrom: String,
    pub source_pos: u64,
    pub source_base: char,
    pub target_chrom: String,
    pub target_pos: u64,
    pub target_base: char,
}

impl MismatchSite {
    pub fn new(
        source: (impl Into<String>, u64, char),
        target: (impl Into<String>, u64, char),
    ) -> Self {
        Self {
            source_chrom: source.0.into(),
            source_pos: source.1,
            source_base: source.2,
            target_chrom: target.0.into(),
            target_pos: target.1,
            target_base: target.2,
        }
    }

    #[must_use]
    pub fn key(&self) -> SiteKey {
        (self.source_chrom.clone(), self.source_pos)
    }
}

impl std::fmt::Display for MismatchSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} {} -> {}:{} {}",
            self.source_chrom,
            self.source_pos,
            self.source_base,
            self.target_chrom,
            self.target_pos,
            self.target_base
        )
    }
}
