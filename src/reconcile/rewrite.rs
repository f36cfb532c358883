use crate::catalog::index::Overlap;
use crate::core::variant::VariantRecord;

use super::ReconcileError;

/// Allele sequences after substituting the target base into REF.
///
/// `candidates[i]` is the sequence original genotype index `i` denotes. A
/// sample's called sequence is the same whichever assembly it is described
/// against, so the old REF and every ALT keep their strings; only the
/// reference allele changes, to `new_reference`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlleleCandidates {
    pub new_reference: String,
    pub candidates: Vec<String>,
}

/// Substitute the target assembly's base into REF at the overlap offset.
///
/// # Errors
///
/// Returns `ReconcileError::InconsistentSite` if REF does not carry the
/// registry's source base at the offset.
pub fn rewrite_alleles(
    record: &VariantRecord,
    overlap: &Overlap<'_>,
) -> Result<AlleleCandidates, ReconcileError> {
    let site = overlap.site;
    let found = record
        .reference
        .chars()
        .nth(overlap.offset)
        .unwrap_or('?');

    if found != site.source_base {
        return Err(ReconcileError::InconsistentSite {
            chrom: record.chrom.clone(),
            pos: record.pos,
            site_pos: site.source_pos,
            expected: site.source_base,
            found,
        });
    }

    let new_reference: String = record
        .reference
        .chars()
        .enumerate()
        .map(|(i, c)| if i == overlap.offset { site.target_base } else { c })
        .collect();

    let candidates = std::iter::once(record.reference.clone())
        .chain(record.alternates.iter().cloned())
        .collect();

    Ok(AlleleCandidates {
        new_reference,
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::site::MismatchSite;

    fn site() -> MismatchSite {
        MismatchSite::new(("chr2", 21_012_603, 'C'), ("chr2", 21_235_475, 'T'))
    }

    fn alts(alts: &[&str]) -> Vec<String> {
        alts.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_substitutes_at_offset() {
        let site = site();
        let record = VariantRecord::new("chr2", 21_012_602, "ACATG", alts(&["A"]));
        let overlap = Overlap {
            site: &site,
            offset: 1,
        };

        let rewritten = rewrite_alleles(&record, &overlap).unwrap();
        assert_eq!(rewritten.new_reference, "ATATG");
        assert_eq!(rewritten.candidates, alts(&["ACATG", "A"]));
    }

    #[test]
    fn test_alternates_keep_their_sequence() {
        let site = site();
        let record = VariantRecord::new("chr2", 21_012_603, "C", alts(&["T", "CAAT"]));
        let overlap = Overlap {
            site: &site,
            offset: 0,
        };

        let rewritten = rewrite_alleles(&record, &overlap).unwrap();
        assert_eq!(rewritten.new_reference, "T");
        assert_eq!(rewritten.candidates, alts(&["C", "T", "CAAT"]));
    }

    #[test]
    fn test_inconsistent_reference_base() {
        let site = site();
        let record = VariantRecord::new("chr2", 21_012_603, "G", alts(&["A"]));
        let overlap = Overlap {
            site: &site,
            offset: 0,
        };

        let result = rewrite_alleles(&record, &overlap);
        assert!(matches!(
            result,
            Err(ReconcileError::InconsistentSite {
                expected: 'C',
                found: 'G',
                ..
            })
        ));
    }
}
