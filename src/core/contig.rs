use serde::{Deserialize, Serialize};

use crate::core::types::NamingConvention;

/// A contig declared in a VCF header (`##contig=<ID=...,length=...>`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contig {
    /// Sequence name (ID attribute)
    pub name: String,

    /// Sequence length (length attribute), if declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,

    /// MD5 checksum of the sequence (md5 attribute)
    /// Lowercase hex, 32 characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
}

impl Contig {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length: Some(length),
            md5: None,
        }
    }

    #[must_use]
    pub fn with_md5(mut self, md5: impl Into<String>) -> Self {
        self.md5 = Some(md5.into());
        self
    }

    /// Copy of this contig under a different name.
    ///
    /// Length and MD5 describe the sequence and carry over.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            length: self.length,
            md5: self.md5.clone(),
        }
    }

    /// Check if this contig is a primary chromosome (1-22, X, Y)
    /// Matches both UCSC (chr1) and NCBI (1) naming conventions exactly
    pub fn is_primary_chromosome(&self) -> bool {
        is_primary_chromosome_name(&self.name)
    }

    /// Check if this is a mitochondrial contig
    pub fn is_mitochondrial(&self) -> bool {
        is_mitochondrial_name(&self.name)
    }
}

/// Primary chromosome check on a bare name (1-22, X, Y with or without `chr`)
pub fn is_primary_chromosome_name(name: &str) -> bool {
    let bare = name.strip_prefix("chr").unwrap_or(name);
    match bare {
        "X" | "Y" => true,
        _ => {
            !bare.starts_with('0')
                && bare.parse::<u8>().is_ok_and(|n| (1..=22).contains(&n))
        }
    }
}

/// Mitochondrial check on a bare name
pub fn is_mitochondrial_name(name: &str) -> bool {
    let name_lower = name.to_lowercase();
    matches!(
        name_lower.as_str(),
        "mt" | "m" | "chrm" | "chrmt" | "nc_012920.1"
    )
}

/// Detect the naming convention used by a set of contig names
pub fn detect_naming_convention<'a>(names: impl IntoIterator<Item = &'a str>) -> NamingConvention {
    let mut has_chr_prefix = false;
    let mut has_no_prefix = false;

    for name in names {
        if is_primary_chromosome_name(name) {
            if name.starts_with("chr") {
                has_chr_prefix = true;
            } else {
                has_no_prefix = true;
            }
        }
    }

    match (has_chr_prefix, has_no_prefix) {
        (true, false) => NamingConvention::Ucsc,
        (false, true) => NamingConvention::Ncbi,
        _ => NamingConvention::Mixed,
    }
}
