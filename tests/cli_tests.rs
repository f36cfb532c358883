//! Command-Line Test Suite
//!
//! Drives the `ref-reconcile` binary end to end on small VCF, TSV and FASTA
//! files written to temporary directories.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const GRCH38_VCF: &str = "##fileformat=VCFv4.2
##INFO=<ID=AF,Number=A,Type=Float,Description=\"Allele frequency\">
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
##contig=<ID=chr1,length=248956422>
##contig=<ID=chr2,length=242193529>
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tsample1
chr1\t100\t.\tA\tG\t50\tPASS\tAF=0.5\tGT\t0/1
chr2\t21012603\t.\tC\tA\t50\tPASS\tAF=0.5\tGT\t0/1
chr2\t21012603\t.\tC\tT\t50\tPASS\tAF=1.0\tGT\t1/1
chr2\t21012622\t.\tC\tT\t50\tPASS\tAF=0.5\tGT\t0/1
";

const HG19_VCF: &str = "##fileformat=VCFv4.2
##contig=<ID=chr1,length=249250621>
##contig=<ID=chr2,length=243199373>
##contig=<ID=chr3,length=198022430>
##contig=<ID=chr6_ssto_hap7,length=4928567>
##contig=<ID=chrM,length=16571>
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tsample1
chr1\t100\t.\tA\tG\t50\tPASS\t.\tGT\t0/1
chr2\t200\t.\tC\tT\t50\tPASS\t.\tGT\t0/1
chr3\t300\t.\tG\tA\t50\tPASS\t.\tGT\t1/1
chr6_ssto_hap7\t400\t.\tT\tC\t50\tPASS\t.\tGT\t0/1
chrM\t500\t.\tA\tG\t50\tPASS\t.\tGT\t1/1
";

fn cmd() -> Command {
    Command::cargo_bin("ref-reconcile").unwrap()
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn data_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_reconcile_file() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "in.vcf", GRCH38_VCF);
    let output = dir.path().join("out.vcf");

    cmd()
        .arg("reconcile")
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("rewritten"));

    assert_eq!(
        data_lines(&output),
        vec![
            "chr1\t100\t.\tA\tG\t50\tPASS\tAF=0.5\tGT\t0/1",
            "chr2\t21012603\t.\tT\tC,A\t50\tPASS\tAF=.\tGT\t1/2",
            "chr2\t21012622\t.\tC\tT\t50\tPASS\tAF=0.5\tGT\t0/1",
        ]
    );
}

#[test]
fn test_reconcile_json_summary() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "in.vcf", GRCH38_VCF);
    let output = dir.path().join("out.vcf");

    let assert = cmd()
        .args(["--format", "json", "reconcile"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["stats"]["records"], 4);
    assert_eq!(json["stats"]["unchanged"], 2);
    assert_eq!(json["stats"]["rewritten"], 1);
    assert_eq!(json["stats"]["dropped"], 1);
    assert_eq!(json["stats"]["rejected"], 0);
}

#[test]
fn test_reconcile_stdin_to_stdout() {
    cmd()
        .args(["reconcile", "-", "-"])
        .write_stdin(GRCH38_VCF)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "chr2\t21012603\t.\tT\tC,A\t50\tPASS\tAF=.\tGT\t1/2",
        ))
        .stdout(predicate::str::contains("AF=1.0").not())
        // Summary moves to stderr when stdout carries the VCF
        .stderr(predicate::str::contains("rewritten"));
}

#[test]
fn test_reconcile_gzip_round_trip() {
    use flate2::read::MultiGzDecoder;

    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "in.vcf", GRCH38_VCF);
    let output = dir.path().join("out.vcf.gz");

    cmd()
        .arg("reconcile")
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    // BGZF: gzip members carrying a BC extra subfield
    let bytes = fs::read(&output).unwrap();
    assert_eq!(bytes[3] & 0x04, 0x04);
    assert_eq!(&bytes[12..14], b"BC");

    let mut text = String::new();
    MultiGzDecoder::new(bytes.as_slice())
        .read_to_string(&mut text)
        .unwrap();
    assert!(text.starts_with("##fileformat=VCFv4.2"));
    assert!(text.contains("chr2\t21012603\t.\tT\tC,A"));
}

#[test]
fn test_reconcile_rejection_aborts_by_default() {
    let dir = TempDir::new().unwrap();
    let vcf = GRCH38_VCF.replace("C\tT\t50\tPASS\tAF=1.0\tGT\t1/1", "C\tT\t50\tPASS\tAF=1.0\tGT\t./.");
    let input = write_file(&dir, "in.vcf", &vcf);
    let output = dir.path().join("out.vcf");

    cmd()
        .arg("reconcile")
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 9"));
}

#[test]
fn test_reconcile_skip_with_rejected_file() {
    let dir = TempDir::new().unwrap();
    let vcf = GRCH38_VCF.replace("C\tT\t50\tPASS\tAF=1.0\tGT\t1/1", "C\tT\t50\tPASS\tAF=1.0\tGT\t./.");
    let input = write_file(&dir, "in.vcf", &vcf);
    let output = dir.path().join("out.vcf");
    let rejected = dir.path().join("rejected.vcf");

    cmd()
        .arg("reconcile")
        .arg(&input)
        .arg(&output)
        .args(["--on-reject", "skip", "--rejected"])
        .arg(&rejected)
        .assert()
        .success();

    assert_eq!(data_lines(&output).len(), 3);
    assert_eq!(
        data_lines(&rejected),
        vec!["chr2\t21012603\t.\tC\tT\t50\tPASS\tAF=1.0\tGT\t./."]
    );
}

#[test]
fn test_reconcile_rejected_requires_skip() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "in.vcf", GRCH38_VCF);

    cmd()
        .arg("reconcile")
        .arg(&input)
        .arg(dir.path().join("out.vcf"))
        .arg("--rejected")
        .arg(dir.path().join("rejected.vcf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--on-reject skip"));
}

#[test]
fn test_reconcile_custom_tsv_catalog() {
    let dir = TempDir::new().unwrap();
    let sites = write_file(
        &dir,
        "sites.tsv",
        "source_chrom\tsource_pos\tsource_base\ttarget_chrom\ttarget_pos\ttarget_base\nchr1\t100\tA\tchr1\t90\tG\n",
    );
    let input = write_file(&dir, "in.vcf", GRCH38_VCF);
    let output = dir.path().join("out.vcf");

    cmd()
        .arg("reconcile")
        .arg(&input)
        .arg(&output)
        .arg("--sites")
        .arg(&sites)
        .assert()
        .success();

    let lines = data_lines(&output);
    // chr1:100 A>G 0/1 is now G>A 1/0; chr2 records pass through untouched
    assert_eq!(lines[0], "chr1\t100\t.\tG\tA\t50\tPASS\tAF=.\tGT\t1/0");
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_rename_hg19_to_grch37() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "hg19.vcf", HG19_VCF);
    let output = dir.path().join("grch37.vcf");

    cmd()
        .arg("rename")
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));

    let text = fs::read_to_string(&output).unwrap();
    let contigs: Vec<&str> = text.lines().filter(|l| l.starts_with("##contig")).collect();
    assert_eq!(
        contigs,
        vec![
            "##contig=<ID=1,length=249250621>",
            "##contig=<ID=2,length=243199373>",
            "##contig=<ID=3,length=198022430>",
        ]
    );

    let chroms: Vec<String> = data_lines(&output)
        .iter()
        .map(|l| l.split('\t').next().unwrap().to_string())
        .collect();
    assert_eq!(chroms, vec!["1", "2", "3"]);
}

#[test]
fn test_rename_tsv_summary() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "hg19.vcf", HG19_VCF);

    cmd()
        .args(["--format", "tsv", "rename"])
        .arg(&input)
        .arg(dir.path().join("out.vcf"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "records\trenamed\tunchanged\tremoved\tcontigs_removed\n5\t3\t0\t2\t2\n",
        ));
}

#[test]
fn test_rename_with_table() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "hg19.vcf", HG19_VCF);
    let table = write_file(&dir, "names.tsv", "from\tto\nchr1\t1\nchrM\tMT\n");
    let output = dir.path().join("out.vcf");

    cmd()
        .arg("rename")
        .arg(&input)
        .arg(&output)
        .arg("--table")
        .arg(&table)
        .assert()
        .success();

    let chroms: Vec<String> = data_lines(&output)
        .iter()
        .map(|l| l.split('\t').next().unwrap().to_string())
        .collect();
    assert_eq!(chroms, vec!["1", "MT"]);
}

#[test]
fn test_rename_conflicting_table() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "hg19.vcf", HG19_VCF);
    let table = write_file(&dir, "names.tsv", "chr1\t1\nchr2\t1\n");

    cmd()
        .arg("rename")
        .arg(&input)
        .arg(dir.path().join("out.vcf"))
        .arg("--table")
        .arg(&table)
        .assert()
        .failure()
        .stderr(predicate::str::contains("both mapped to '1'"));
}

#[test]
fn test_sites_list() {
    cmd()
        .args(["sites", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chr2:21012603"))
        .stdout(predicate::str::contains("chr2:21235475"));
}

#[test]
fn test_sites_show() {
    cmd()
        .args(["--format", "json", "sites", "show", "chr2:21012603"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"target_pos\": 21235475"));

    cmd()
        .args(["sites", "show", "chr2:21012604"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No mismatch site"));
}

#[test]
fn test_sites_export_and_reload() {
    let dir = TempDir::new().unwrap();
    let json = dir.path().join("sites.json");
    let tsv = dir.path().join("sites.tsv");

    cmd()
        .args(["sites", "export"])
        .arg(&json)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 sites"));
    cmd().args(["sites", "export"]).arg(&tsv).assert().success();

    for path in [&json, &tsv] {
        cmd()
            .args(["--format", "tsv", "sites", "list", "--sites"])
            .arg(path)
            .assert()
            .success()
            .stdout(predicate::str::contains("chr2\t21012603\tC\tchr2\t21235475\tT"));
    }
}

#[test]
fn test_sites_check() {
    let dir = TempDir::new().unwrap();
    // 21012603 is past the end of this toy contig, so use a custom catalog
    let sites = write_file(&dir, "sites.tsv", "chr2\t3\tC\tchr2\t5\tT\n");
    let source = dir.path().join("source.fa");
    let target = dir.path().join("target.fa");
    fs::File::create(&source)
        .unwrap()
        .write_all(b">chr2\nAACGT\n")
        .unwrap();
    fs::File::create(&target)
        .unwrap()
        .write_all(b">chr2\nAACGt\n")
        .unwrap();

    cmd()
        .args(["sites", "check", "--sites"])
        .arg(&sites)
        .arg("--source-fasta")
        .arg(&source)
        .arg("--target-fasta")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("GRCh38: ok"))
        .stdout(predicate::str::contains("GRCh37: ok"));

    // The embedded site is absent from the toy reference
    cmd()
        .args(["sites", "check", "--source-fasta"])
        .arg(&source)
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing"))
        .stderr(predicate::str::contains("1 of 1 sites disagree"));
}

#[test]
fn test_sites_check_requires_a_fasta() {
    cmd().args(["sites", "check"]).assert().failure();
}
