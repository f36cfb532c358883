use crate::core::site::MismatchSite;
use crate::core::variant::VariantRecord;
use crate::reconcile::ReconcileError;

use super::store::MismatchRegistry;

/// A mismatch site covered by a record's REF span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap<'a> {
    pub site: &'a MismatchSite,
    /// Zero-based index into REF at which the discrepant base sits
    pub offset: usize,
}

/// Finds the mismatch site, if any, covered by a record
pub struct OverlapLocator<'a> {
    registry: &'a MismatchRegistry,
}

impl<'a> OverlapLocator<'a> {
    pub fn new(registry: &'a MismatchRegistry) -> Self {
        Self { registry }
    }

    /// Whether the span `[start, end]` on `chrom` covers any site
    pub fn touches(&self, chrom: &str, start: u64, end: u64) -> bool {
        self.registry.has_chrom(chrom) && !self.registry.sites_in_span(chrom, start, end).is_empty()
    }

    /// Find the site covered by `record`'s REF span.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::MultipleSites` if the span covers more than one
    /// site; only a single discrepancy per record can be reconciled.
    pub fn find_overlap(&self, record: &VariantRecord) -> Result<Option<Overlap<'a>>, ReconcileError> {
        let hits = self
            .registry
            .sites_in_span(&record.chrom, record.pos, record.end());

        match hits.as_slice() {
            [] => Ok(None),
            [site] => {
                // Bounded by the REF length, which is already a usize
                #[allow(clippy::cast_possible_truncation)]
                let offset = (site.source_pos - record.pos) as usize;
                Ok(Some(Overlap { site, offset }))
            }
            sites => Err(ReconcileError::MultipleSites {
                chrom: record.chrom.clone(),
                pos: record.pos,
                positions: sites.iter().map(|s| s.source_pos).collect(),
            }),
        }
    }
}
