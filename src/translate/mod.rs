//! Contig name translation between naming conventions.
//!
//! Different reference distributions name the same sequences differently:
//!
//! | Source | Chromosome 1 | Mitochondrial | Unplaced |
//! |--------|--------------|---------------|----------|
//! | UCSC   | chr1         | chrM          | chrUn_KI270302v1 |
//! | NCBI   | 1            | MT            | KI270302.1 |
//!
//! A [`ContigTranslator`] maps names from one convention to another. A name
//! with no counterpart translates to `None`, and the contig is removed from
//! the header along with its records.
//!
//! hg19's `chrM` is not the rCRS sequence GRCh37 uses for `MT`, so the
//! hg19 → GRCh37 preset only renames primary chromosomes.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::core::contig::{is_primary_chromosome_name, Contig};
use crate::parsing::tsv::parse_rename_text;
use crate::parsing::vcf::VcfHeader;
use crate::utils::validation::is_valid_contig_name;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Failed to read rename table: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid rename table line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    #[error("Contig '{from}' is mapped to both '{first}' and '{second}'")]
    ConflictingMapping {
        from: String,
        first: String,
        second: String,
    },

    #[error("Contigs '{first}' and '{second}' are both mapped to '{to}'")]
    DuplicateTarget {
        to: String,
        first: String,
        second: String,
    },

    #[error("Invalid contig name '{0}' in rename table")]
    InvalidName(String),
}

/// Built-in renaming rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RenamePreset {
    /// hg19 (UCSC) to GRCh37 (NCBI): chr1..chr22, chrX, chrY only
    Hg19ToGrch37,
    /// UCSC to NCBI: primary chromosomes, chrM, and hg38-style scaffold names
    UcscToNcbi,
    /// NCBI to UCSC: primary chromosomes and MT
    NcbiToUcsc,
}

#[derive(Debug, Clone)]
enum Rule {
    Preset(RenamePreset),
    Table(HashMap<String, Option<String>>),
}

/// Maps contig names between naming conventions
#[derive(Debug, Clone)]
pub struct ContigTranslator {
    rule: Rule,
}

impl ContigTranslator {
    pub fn preset(preset: RenamePreset) -> Self {
        Self {
            rule: Rule::Preset(preset),
        }
    }

    /// Build a translator from explicit `(from, to)` rows.
    ///
    /// Names not listed have no counterpart.
    ///
    /// # Errors
    ///
    /// Returns an error if a source name is mapped to two different targets,
    /// two sources share a target, or a target is not a valid contig name.
    pub fn from_table(
        rows: impl IntoIterator<Item = (String, Option<String>)>,
    ) -> Result<Self, TranslateError> {
        let mut table: HashMap<String, Option<String>> = HashMap::new();
        let mut targets: HashMap<String, String> = HashMap::new();

        for (from, to) in rows {
            if let Some(to) = &to {
                if !is_valid_contig_name(to) {
                    return Err(TranslateError::InvalidName(to.clone()));
                }
                if let Some(first) = targets.get(to).filter(|first| **first != from) {
                    return Err(TranslateError::DuplicateTarget {
                        to: to.clone(),
                        first: first.clone(),
                        second: from,
                    });
                }
            }

            if let Some(existing) = table.get(&from) {
                if *existing != to {
                    return Err(TranslateError::ConflictingMapping {
                        first: existing.clone().unwrap_or_else(|| "<none>".to_string()),
                        second: to.unwrap_or_else(|| "<none>".to_string()),
                        from,
                    });
                }
                continue;
            }

            if let Some(to) = &to {
                targets.insert(to.clone(), from.clone());
            }
            table.insert(from, to);
        }

        Ok(Self {
            rule: Rule::Table(table),
        })
    }

    /// Load a two-column TSV rename table (`from`, `to`)
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the table is invalid.
    pub fn load_table(path: &Path) -> Result<Self, TranslateError> {
        let content = std::fs::read_to_string(path)?;
        let rows = parse_rename_text(&content)
            .map_err(|(line, reason)| TranslateError::InvalidLine { line, reason })?;
        Self::from_table(rows)
    }

    /// Translate a contig name; `None` if it has no counterpart
    pub fn translate(&self, name: &str) -> Option<String> {
        match &self.rule {
            Rule::Preset(preset) => translate_preset(*preset, name),
            Rule::Table(table) => table.get(name).cloned().flatten(),
        }
    }

    /// Translate a header contig, keeping its length and MD5
    pub fn translate_contig(&self, contig: &Contig) -> Option<Contig> {
        self.translate(&contig.name).map(|name| contig.renamed(name))
    }

    /// Re-emit the header's contig declarations under translated names.
    ///
    /// Declaration order and lengths are preserved. Returns the new header and
    /// the names of contigs that were removed.
    pub fn translate_header(&self, header: &VcfHeader) -> (VcfHeader, Vec<String>) {
        let mut removed = Vec::new();
        let translated = header.map_contigs(|contig| {
            let renamed = self.translate_contig(contig);
            if renamed.is_none() {
                removed.push(contig.name.clone());
            }
            renamed
        });
        (translated, removed)
    }
}

fn translate_preset(preset: RenamePreset, name: &str) -> Option<String> {
    match preset {
        RenamePreset::Hg19ToGrch37 => name
            .strip_prefix("chr")
            .filter(|_| is_primary_chromosome_name(name))
            .map(str::to_string),
        RenamePreset::UcscToNcbi => {
            if is_primary_chromosome_name(name) {
                name.strip_prefix("chr").map(str::to_string)
            } else if name == "chrM" {
                Some("MT".to_string())
            } else {
                ucsc_scaffold_to_accession(name)
            }
        }
        RenamePreset::NcbiToUcsc => {
            if is_primary_chromosome_name(name) && !name.starts_with("chr") {
                Some(format!("chr{name}"))
            } else if matches!(name, "MT" | "M") {
                Some("chrM".to_string())
            } else {
                None
            }
        }
    }
}

/// `chr1_KI270706v1_random`, `chrUn_GL000195v1`, `chr1_KI270762v1_alt` -> `KI270706.1` etc.
fn ucsc_scaffold_to_accession(name: &str) -> Option<String> {
    let rest = name.strip_prefix("chr")?;
    let (_, scaffold) = rest.split_once('_')?;
    let scaffold = scaffold
        .strip_suffix("_random")
        .or_else(|| scaffold.strip_suffix("_alt"))
        .or_else(|| scaffold.strip_suffix("_fix"))
        .unwrap_or(scaffold);

    let (accession, version) = scaffold.rsplit_once('v')?;
    let valid = !accession.is_empty()
        && accession.chars().all(|c| c.is_ascii_alphanumeric())
        && !version.is_empty()
        && version.chars().all(|c| c.is_ascii_digit());

    valid.then(|| format!("{accession}.{version}"))
}
