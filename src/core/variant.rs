//! Variant call records and per-sample genotypes.
//!
//! A [`VariantRecord`] carries only the fields reconciliation needs: position,
//! alleles and one [`Genotype`] per sample. The VCF layer keeps everything else.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid genotype '{value}': {reason}")]
pub struct GenotypeParseError {
    pub value: String,
    pub reason: String,
}

/// One allele reference within a genotype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlleleCall {
    /// Index into the record's alleles (0 = REF, 1.. = ALT)
    Known(usize),
    /// No call (`.`)
    Unknown,
}

impl fmt::Display for AlleleCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(index) => write!(f, "{index}"),
            Self::Unknown => write!(f, "."),
        }
    }
}

/// A per-sample GT value: ordered allele calls with the separator between them.
///
/// `phased[i]` is the separator between `calls[i]` and `calls[i + 1]`
/// (`true` for `|`, `false` for `/`), so there is one fewer entry than calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genotype {
    calls: Vec<AlleleCall>,
    phased: Vec<bool>,
}

impl Genotype {
    /// Unphased genotype from allele indices
    pub fn unphased(indices: &[usize]) -> Self {
        Self {
            calls: indices.iter().copied().map(AlleleCall::Known).collect(),
            phased: vec![false; indices.len().saturating_sub(1)],
        }
    }

    pub fn calls(&self) -> &[AlleleCall] {
        &self.calls
    }

    pub fn ploidy(&self) -> usize {
        self.calls.len()
    }

    pub fn has_unknown(&self) -> bool {
        self.calls.contains(&AlleleCall::Unknown)
    }

    /// Known allele indices, in call order
    pub fn known_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.calls.iter().filter_map(|call| match call {
            AlleleCall::Known(index) => Some(*index),
            AlleleCall::Unknown => None,
        })
    }

    /// True when every call is the reference allele
    pub fn is_reference_only(&self) -> bool {
        self.calls.iter().all(|call| *call == AlleleCall::Known(0))
    }

    /// Apply `f` to every known index, keeping call order and phasing
    #[must_use]
    pub fn map_indices(&self, mut f: impl FnMut(usize) -> usize) -> Self {
        Self {
            calls: self
                .calls
                .iter()
                .map(|call| match call {
                    AlleleCall::Known(index) => AlleleCall::Known(f(*index)),
                    AlleleCall::Unknown => AlleleCall::Unknown,
                })
                .collect(),
            phased: self.phased.clone(),
        }
    }
}

impl FromStr for Genotype {
    type Err = GenotypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = |reason: &str| GenotypeParseError {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        if s.is_empty() {
            return Err(error("empty genotype"));
        }

        let mut calls = Vec::new();
        let mut phased = Vec::new();
        let mut start = 0;

        for (i, c) in s.char_indices() {
            if c == '/' || c == '|' {
                calls.push(parse_call(&s[start..i]).ok_or_else(|| error("bad allele"))?);
                phased.push(c == '|');
                start = i + 1;
            }
        }
        calls.push(parse_call(&s[start..]).ok_or_else(|| error("bad allele"))?);

        Ok(Self { calls, phased })
    }
}

fn parse_call(s: &str) -> Option<AlleleCall> {
    if s == "." {
        Some(AlleleCall::Unknown)
    } else if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok().map(AlleleCall::Known)
    } else {
        None
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, call) in self.calls.iter().enumerate() {
            if i > 0 {
                let separator = if self.phased[i - 1] { '|' } else { '/' };
                write!(f, "{separator}")?;
            }
            write!(f, "{call}")?;
        }
        Ok(())
    }
}

/// A variant call: alleles at a 1-based position plus one genotype per sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub chrom: String,
    /// 1-based position of the first base of `reference`
    pub pos: u64,
    pub reference: String,
    /// Alternate alleles; order is the genotype index basis (index 1 = first ALT)
    pub alternates: Vec<String>,
    pub genotypes: Vec<Genotype>,
}

impl VariantRecord {
    pub fn new(
        chrom: impl Into<String>,
        pos: u64,
        reference: impl Into<String>,
        alternates: Vec<String>,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            reference: reference.into(),
            alternates,
            genotypes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_genotypes(mut self, genotypes: Vec<Genotype>) -> Self {
        self.genotypes = genotypes;
        self
    }

    /// Last reference position covered by REF (inclusive, 1-based)
    pub fn end(&self) -> u64 {
        span_end(self.pos, self.reference.len())
    }

    /// Number of alleles including REF
    pub fn allele_count(&self) -> usize {
        self.alternates.len() + 1
    }

    /// Allele string for a genotype index (0 = REF)
    pub fn allele(&self, index: usize) -> Option<&str> {
        if index == 0 {
            Some(&self.reference)
        } else {
            self.alternates.get(index - 1).map(String::as_str)
        }
    }
}

/// Inclusive end of a span starting at `pos` covering `len` bases
pub fn span_end(pos: u64, len: usize) -> u64 {
    pos.saturating_add(len.max(1) as u64 - 1)
}
