use serde::{Deserialize, Serialize};

/// Assembly version (e.g., `GRCh37`, `GRCh38`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Assembly {
    Grch37,
    Grch38,
    Other(String),
}

impl Assembly {
    /// Parse an assembly name, accepting UCSC aliases (hg19, hg38)
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "grch37" | "hg19" | "b37" => Self::Grch37,
            "grch38" | "hg38" => Self::Grch38,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl From<String> for Assembly {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Assembly> for String {
    fn from(assembly: Assembly) -> Self {
        assembly.to_string()
    }
}

impl std::fmt::Display for Assembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grch37 => write!(f, "GRCh37"),
            Self::Grch38 => write!(f, "GRCh38"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Naming convention used for contigs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    /// UCSC style: chr1, chr2, ..., chrX, chrY, chrM
    Ucsc,
    /// NCBI/Ensembl style: 1, 2, ..., X, Y, MT
    Ncbi,
    /// Mixed or unknown
    Mixed,
}
