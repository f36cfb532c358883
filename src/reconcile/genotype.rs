use crate::core::variant::{AlleleCall, Genotype, VariantRecord};

use super::rewrite::AlleleCandidates;
use super::{Ambiguity, ReconcileError};

/// Alleles and genotypes after merging, remapping and pruning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reindexed {
    pub reference: String,
    pub alternates: Vec<String>,
    pub genotypes: Vec<Genotype>,
}

impl Reindexed {
    /// True when no sample calls any alternate allele
    pub fn is_reference_only(&self) -> bool {
        self.genotypes.iter().all(Genotype::is_reference_only)
    }
}

/// Map each original allele index to a merged index.
///
/// Index 0 is the new reference. Candidates equal to it map to 0; other
/// distinct sequences get 1, 2, ... in order of their lowest original index.
/// Returns the merged allele list and the per-original-index mapping.
pub fn merge_alleles(candidates: &AlleleCandidates) -> (Vec<&str>, Vec<usize>) {
    let mut merged: Vec<&str> = vec![candidates.new_reference.as_str()];
    let mut mapping = Vec::with_capacity(candidates.candidates.len());

    for candidate in &candidates.candidates {
        let index = match merged.iter().position(|allele| *allele == candidate.as_str()) {
            Some(index) => index,
            None => {
                merged.push(candidate.as_str());
                merged.len() - 1
            }
        };
        mapping.push(index);
    }

    (merged, mapping)
}

/// Remap every sample's genotype onto the merged alleles and prune ALTs no
/// sample references, renumbering the rest contiguously.
///
/// # Errors
///
/// Returns `ReconcileError::AmbiguousGenotype` if the record has no
/// genotypes, any call is unknown, or any index is out of range.
pub fn reindex(
    record: &VariantRecord,
    candidates: &AlleleCandidates,
) -> Result<Reindexed, ReconcileError> {
    let ambiguous = |reason| ReconcileError::AmbiguousGenotype {
        chrom: record.chrom.clone(),
        pos: record.pos,
        reason,
    };

    if record.genotypes.is_empty() {
        return Err(ambiguous(Ambiguity::NoGenotypes));
    }

    let allele_count = candidates.candidates.len();
    for (sample, genotype) in record.genotypes.iter().enumerate() {
        for call in genotype.calls() {
            match *call {
                AlleleCall::Unknown => return Err(ambiguous(Ambiguity::UnknownCall { sample })),
                AlleleCall::Known(index) if index >= allele_count => {
                    return Err(ambiguous(Ambiguity::IndexOutOfRange {
                        sample,
                        index,
                        allele_count,
                    }))
                }
                AlleleCall::Known(_) => {}
            }
        }
    }

    let (merged, mapping) = merge_alleles(candidates);
    let remapped: Vec<Genotype> = record
        .genotypes
        .iter()
        .map(|genotype| genotype.map_indices(|index| mapping[index]))
        .collect();

    // REF always survives; ALTs survive only if some sample calls them
    let mut referenced = vec![false; merged.len()];
    referenced[0] = true;
    for genotype in &remapped {
        for index in genotype.known_indices() {
            referenced[index] = true;
        }
    }

    let mut compacted = vec![0; merged.len()];
    let mut alternates = Vec::new();
    for (index, allele) in merged.iter().enumerate().skip(1) {
        if referenced[index] {
            alternates.push((*allele).to_string());
            compacted[index] = alternates.len();
        }
    }

    let genotypes = remapped
        .iter()
        .map(|genotype| genotype.map_indices(|index| compacted[index]))
        .collect();

    Ok(Reindexed {
        reference: candidates.new_reference.clone(),
        alternates,
        genotypes,
    })
}
