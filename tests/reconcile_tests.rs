//! Record Reconciliation Test Suite
//!
//! Runs whole VCF documents through the reconcile pass against the embedded
//! GRCh38 -> GRCh37 catalog (chr2:21012603 C -> T) and checks every record
//! shape around the site: SNVs, deletions and insertions starting at or
//! before the site, records just past it, and genotypes that must be rejected.

use ref_reconcile::convert::{reconcile_vcf, ConvertError};
use ref_reconcile::parsing::vcf::{VcfReader, VcfWriter};
use ref_reconcile::reconcile::{ReconcileConfig, RejectPolicy};
use ref_reconcile::{MismatchRegistry, ReconciliationEngine};

const HEADER: &str = "##fileformat=VCFv4.2
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
##contig=<ID=chr2,length=242193529>
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tsample1
";

#[derive(Debug, PartialEq, Eq)]
enum Expected {
    /// REF, ALT and GT columns of the written record
    Written(String, String, String),
    Unchanged,
    Dropped,
    Rejected,
}

fn written(reference: &str, alt: &str, gt: &str) -> Expected {
    Expected::Written(reference.to_string(), alt.to_string(), gt.to_string())
}

/// Reconcile a single-record VCF and classify what came out
fn reconcile_one(pos: u64, reference: &str, alt: &str, gt: &str) -> Expected {
    let registry = MismatchRegistry::load_embedded().unwrap();
    let engine = ReconciliationEngine::new(&registry);
    let config = ReconcileConfig {
        reject_policy: RejectPolicy::Skip,
        ..ReconcileConfig::default()
    };

    let line = format!("chr2\t{pos}\t.\t{reference}\t{alt}\t.\tPASS\t.\tGT\t{gt}");
    let input = format!("{HEADER}{line}\n");
    let mut reader = VcfReader::new(input.as_bytes()).unwrap();
    let mut writer = VcfWriter::new(Vec::new());
    let stats = reconcile_vcf(&mut reader, &mut writer, &engine, &config, None).unwrap();
    let output = String::from_utf8(writer.into_inner()).unwrap();
    let records: Vec<&str> = output.lines().filter(|l| !l.starts_with('#')).collect();

    if stats.rejected == 1 {
        assert!(records.is_empty());
        return Expected::Rejected;
    }
    if stats.dropped == 1 {
        assert!(records.is_empty());
        return Expected::Dropped;
    }
    assert_eq!(records.len(), 1);
    if stats.unchanged == 1 {
        assert_eq!(records[0], line, "unchanged records are written as read");
        return Expected::Unchanged;
    }

    let fields: Vec<&str> = records[0].split('\t').collect();
    written(fields[3], fields[4], fields[9])
}

/// Every record shape around chr2:21012603, with the expected GRCh37 record
#[test]
fn test_record_table() {
    use Expected::{Dropped, Rejected, Unchanged};

    let cases = [
        // Deletions starting one base before the site
        (21_012_602, "ACATG", "A", "0/1", written("ATATG", "ACATG,A", "1/2")),
        (21_012_602, "ACATG", "A", "1/1", written("ATATG", "A", "1/1")),
        (21_012_602, "AC", "A", "0/1", written("AT", "AC,A", "1/2")),
        (21_012_602, "AC", "A", "1/1", written("AT", "A", "1/1")),
        // SNVs at the site
        (21_012_603, "C", "A", "0/1", written("T", "C,A", "1/2")),
        (21_012_603, "C", "A", "1/1", written("T", "A", "1/1")),
        (21_012_603, "C", "T", "0/1", written("T", "C", "1/0")),
        (21_012_603, "C", "T", "1/1", Dropped),
        (21_012_603, "C", "T", "./.", Rejected),
        (21_012_603, "C", "T", "1/2", Rejected),
        // Deletions and insertions anchored at the site
        (21_012_603, "CATG", "C", "0/1", written("TATG", "CATG,C", "1/2")),
        (21_012_603, "CATG", "C", "1/1", written("TATG", "C", "1/1")),
        (21_012_603, "C", "CAAT", "0/1", written("T", "C,CAAT", "1/2")),
        (21_012_603, "C", "T,CAAT", "1/2", written("T", "CAAT", "0/1")),
        // Records that do not cover the site
        (21_012_604, "ATG", "A", "0/1", Unchanged),
        (21_012_622, "C", "T", "0/1", Unchanged),
    ];

    for (pos, reference, alt, gt, expected) in cases {
        assert_eq!(
            reconcile_one(pos, reference, alt, gt),
            expected,
            "chr2:{pos} {reference}>{alt} {gt}"
        );
    }
}

/// Phasing and call order survive reindexing
#[test]
fn test_phased_genotypes() {
    assert_eq!(
        reconcile_one(21_012_603, "C", "A", "0|1"),
        written("T", "C,A", "1|2")
    );
    assert_eq!(
        reconcile_one(21_012_603, "C", "A", "1|0"),
        written("T", "C,A", "2|1")
    );
    assert_eq!(
        reconcile_one(21_012_603, "C", "T", "1|0"),
        written("T", "C", "0|1")
    );
}

/// Haploid and partially missing calls
#[test]
fn test_ploidy_and_missing_calls() {
    assert_eq!(
        reconcile_one(21_012_603, "C", "A", "1"),
        written("T", "A", "1")
    );
    assert_eq!(reconcile_one(21_012_603, "C", "T", "1"), Expected::Dropped);
    assert_eq!(reconcile_one(21_012_603, "C", "A", "0/."), Expected::Rejected);
}

/// A REF that disagrees with the catalog's source base is never rewritten
#[test]
fn test_inconsistent_reference_rejected() {
    assert_eq!(reconcile_one(21_012_603, "G", "A", "0/1"), Expected::Rejected);
    assert_eq!(reconcile_one(21_012_603, "c", "A", "0/1"), Expected::Rejected);
    assert_eq!(reconcile_one(21_012_602, "AGATG", "A", "0/1"), Expected::Rejected);
}

/// Multi-sample records: the record survives if any sample is still variant
#[test]
fn test_multi_sample_records() {
    let registry = MismatchRegistry::load_embedded().unwrap();
    let engine = ReconciliationEngine::new(&registry);
    let header = HEADER.replace("sample1\n", "sample1\tsample2\tsample3\n");
    let body = "chr2\t21012603\t.\tC\tT,A\t.\tPASS\t.\tGT\t1/1\t0/1\t1/2
chr2\t21012603\t.\tC\tT\t.\tPASS\t.\tGT\t1/1\t1|1\t1
";
    let input = format!("{header}{body}");
    let mut reader = VcfReader::new(input.as_bytes()).unwrap();
    let mut writer = VcfWriter::new(Vec::new());
    let stats = reconcile_vcf(
        &mut reader,
        &mut writer,
        &engine,
        &ReconcileConfig::default(),
        None,
    )
    .unwrap();

    assert_eq!(stats.rewritten, 1);
    assert_eq!(stats.dropped, 1);

    let output = String::from_utf8(writer.into_inner()).unwrap();
    let records: Vec<&str> = output.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(
        records,
        vec!["chr2\t21012603\t.\tT\tC,A\t.\tPASS\t.\tGT\t0/0\t1/0\t0/2"]
    );
}

/// The default policy stops at the first record that cannot be reconciled
#[test]
fn test_abort_policy() {
    let registry = MismatchRegistry::load_embedded().unwrap();
    let engine = ReconciliationEngine::new(&registry);
    let input = format!("{HEADER}chr2\t21012603\t.\tC\tT\t.\tPASS\t.\tGT\t./.\n");
    let mut reader = VcfReader::new(input.as_bytes()).unwrap();
    let mut writer = VcfWriter::new(Vec::new());

    let result = reconcile_vcf(
        &mut reader,
        &mut writer,
        &engine,
        &ReconcileConfig::default(),
        None,
    );
    assert!(matches!(result, Err(ConvertError::Rejected { line: 5, .. })));
}

/// Sites-only records at a site carry no genotypes to classify
#[test]
fn test_sites_only_record_rejected() {
    let registry = MismatchRegistry::load_embedded().unwrap();
    let engine = ReconciliationEngine::new(&registry);
    let input = "##fileformat=VCFv4.2
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
chr2\t21012603\t.\tC\tT\t.\tPASS\t.
chr2\t21012700\t.\tC\tT\t.\tPASS\t.
";
    let mut reader = VcfReader::new(input.as_bytes()).unwrap();
    let mut writer = VcfWriter::new(Vec::new());
    let config = ReconcileConfig {
        reject_policy: RejectPolicy::Skip,
        ..ReconcileConfig::default()
    };

    let stats = reconcile_vcf(&mut reader, &mut writer, &engine, &config, None).unwrap();
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.unchanged, 1);
}

/// Catalog contigs are matched by exact name, so NCBI-named input passes through
#[test]
fn test_other_naming_passes_through() {
    let registry = MismatchRegistry::load_embedded().unwrap();
    let engine = ReconciliationEngine::new(&registry);
    assert!(!engine.touches("2", 21_012_603, 1));
    assert!(engine.touches("chr2", 21_012_603, 1));
}

/// A rewritten record placed at its target coordinates no longer overlaps
/// any site, so reconciling it again leaves it unchanged
#[test]
fn test_rewritten_record_is_stable_at_target_position() {
    use ref_reconcile::core::variant::Genotype;
    use ref_reconcile::{Outcome, VariantRecord};

    let registry = MismatchRegistry::load_embedded().unwrap();
    let engine = ReconciliationEngine::new(&registry);
    let alternates = vec!["T".to_string(), "CAAT".to_string()];
    let record = VariantRecord::new("chr2", 21_012_603, "C", alternates)
        .with_genotypes(vec!["1/2".parse::<Genotype>().unwrap()]);

    let Outcome::Rewritten(mut rewritten) = engine.reconcile(&record).unwrap() else {
        panic!("expected a rewritten record");
    };
    let site = registry.lookup("chr2", 21_012_603).unwrap();
    rewritten.pos = site.target_pos;

    assert_eq!(engine.reconcile(&rewritten).unwrap(), Outcome::Unchanged);
}
