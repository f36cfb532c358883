//! Streaming VCF reader and writer.
//!
//! The header is parsed into a [`noodles::vcf::Header`], which supplies the
//! contig declarations and the `Number` of each `##INFO`/`##FORMAT` key.
//! Data lines are parsed with the noodles lazy [`vcf::Record`] and kept as
//! their original text, so a record that is not modified is written back
//! byte-identical.
//!
//! Paths ending `.gz` or `.bgz` are read gzip-compressed and written as BGZF;
//! `-` means stdin/stdout.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::bgzf;
use noodles::vcf::{
    self,
    header::record::value::{map, Map},
};
use thiserror::Error;

use crate::core::contig::Contig;
use crate::core::variant::{Genotype, VariantRecord};
use crate::parsing::ParseError;
use crate::utils::validation::{normalize_md5, MAX_CONTIGS};

const CHROM: usize = 0;
const POS: usize = 1;
const REF: usize = 3;
const ALT: usize = 4;
const INFO: usize = 7;
const FORMAT: usize = 8;
const FIRST_SAMPLE: usize = 9;

/// Largest POS a VCF record may carry (2^31 - 1)
pub const MAX_POSITION: u64 = (1 << 31) - 1;

const MISSING: &str = ".";

/// A GT value that does not parse as a genotype
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("sample {sample} has malformed genotype '{value}'")]
pub struct MalformedGenotype {
    pub sample: usize,
    pub value: String,
}

/// A parsed VCF header
#[derive(Debug, Clone)]
pub struct VcfHeader {
    inner: vcf::Header,
}

impl VcfHeader {
    /// Parse header text, up to and including the `#CHROM` line
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` if the `#CHROM` line is missing or
    /// the header is malformed, or `ParseError::TooManyContigs` if the contig
    /// limit is exceeded.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        if !text.lines().any(|line| line.starts_with("#CHROM")) {
            return Err(ParseError::InvalidFormat(
                "Missing #CHROM header line".to_string(),
            ));
        }

        let inner: vcf::Header = text
            .parse()
            .map_err(|e| ParseError::InvalidFormat(format!("Invalid VCF header: {e}")))?;

        // Check contig limit for DOS protection
        let contig_count = inner.contigs().len();
        if contig_count > MAX_CONTIGS {
            return Err(ParseError::TooManyContigs(contig_count));
        }

        Ok(Self { inner })
    }

    /// Declared contigs, in header order
    pub fn contigs(&self) -> impl Iterator<Item = Contig> + '_ {
        self.inner
            .contigs()
            .iter()
            .map(|(name, map)| contig_from_map(name, map))
    }

    pub fn contig_names(&self) -> impl Iterator<Item = &str> {
        self.inner.contigs().keys().map(String::as_str)
    }

    /// Check if a contig is declared in the header
    pub fn has_contig(&self, name: &str) -> bool {
        self.inner.contigs().contains_key(name)
    }

    pub fn samples(&self) -> impl Iterator<Item = &str> {
        self.inner.sample_names().iter().map(String::as_str)
    }

    pub fn sample_count(&self) -> usize {
        self.inner.sample_names().len()
    }

    /// Whether an INFO key is declared with a per-allele Number (A, R or G)
    pub fn is_allele_dependent_info(&self, key: &str) -> bool {
        self.inner
            .infos()
            .get(key)
            .is_some_and(|info| {
                matches!(
                    info.number(),
                    map::info::Number::AlternateBases | map::info::Number::ReferenceAlternateBases | map::info::Number::Samples
                )
            })
    }

    /// Whether a FORMAT key is declared with a per-allele Number (A, R or G)
    pub fn is_allele_dependent_format(&self, key: &str) -> bool {
        self.inner
            .formats()
            .get(key)
            .is_some_and(|format| {
                matches!(
                    format.number(),
                    map::format::Number::AlternateBases | map::format::Number::ReferenceAlternateBases | map::format::Number::Samples
                )
            })
    }

    /// Rebuild the contig declarations through `f`, keeping their order.
    ///
    /// Contigs for which `f` returns `None` are removed. All other header
    /// records are kept.
    #[must_use]
    pub fn map_contigs(&self, mut f: impl FnMut(&Contig) -> Option<Contig>) -> Self {
        let mut inner = self.inner.clone();
        let contigs = std::mem::take(inner.contigs_mut());

        for (name, map) in &contigs {
            if let Some(contig) = f(&contig_from_map(name, map)) {
                let map = contig_map(&contig);
                inner.contigs_mut().insert(contig.name, map);
            }
        }

        Self { inner }
    }

    /// Write all header lines, ending with the `#CHROM` line
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        vcf::io::Writer::new(writer).write_header(&self.inner)
    }
}

fn contig_from_map(name: &str, map: &Map<map::Contig>) -> Contig {
    Contig {
        name: name.to_string(),
        length: map.length().and_then(|length| u64::try_from(length).ok()),
        md5: map.md5().and_then(|md5| normalize_md5(md5)),
    }
}

fn contig_map(contig: &Contig) -> Map<map::Contig> {
    let mut map = Map::<map::Contig>::new();
    *map.length_mut() = contig.length.and_then(|length| usize::try_from(length).ok());
    *map.md5_mut() = contig.md5.clone();
    map
}

/// A VCF data line: the original text plus its tab-separated columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfRecord {
    line: String,
    fields: Vec<String>,
    pos: u64,
}

impl VcfRecord {
    /// Parse one data line
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidRecord` if the line has fewer than 8
    /// columns, POS is outside `1..=MAX_POSITION`, or REF is empty.
    pub fn parse(line: &str, line_number: usize) -> Result<Self, ParseError> {
        let invalid = |reason: String| ParseError::InvalidRecord {
            line: line_number,
            reason,
        };

        let fields: Vec<String> = line.split('\t').map(str::to_string).collect();
        if fields.len() <= INFO {
            return Err(invalid(format!(
                "expected at least 8 tab-separated columns, found {}",
                fields.len()
            )));
        }

        let mut record = vcf::Record::default();
        vcf::io::Reader::new(line.as_bytes())
            .read_record(&mut record)
            .map_err(|e| invalid(e.to_string()))?;

        let pos = record
            .variant_start()
            .and_then(Result::ok)
            .and_then(|position| u64::try_from(position.get()).ok())
            .filter(|p| (1..=MAX_POSITION).contains(p))
            .ok_or_else(|| invalid(format!("invalid POS '{}'", fields[POS])))?;

        if fields[REF].is_empty() {
            return Err(invalid("empty REF".to_string()));
        }

        Ok(Self {
            line: line.to_string(),
            fields,
            pos,
        })
    }

    pub fn chrom(&self) -> &str {
        &self.fields[CHROM]
    }

    pub fn pos(&self) -> u64 {
        self.pos
    }

    pub fn reference(&self) -> &str {
        &self.fields[REF]
    }

    /// ALT alleles; a missing ALT (`.`) yields none
    pub fn alternates(&self) -> Vec<String> {
        match self.fields[ALT].as_str() {
            MISSING | "" => Vec::new(),
            alt => alt.split(',').map(str::to_string).collect(),
        }
    }

    pub fn sample_count(&self) -> usize {
        self.fields.len().saturating_sub(FIRST_SAMPLE)
    }

    /// The record exactly as read (or as last rebuilt)
    pub fn as_line(&self) -> &str {
        &self.line
    }

    /// Raw GT value per sample; `None` if FORMAT has no GT key.
    ///
    /// A sample column that stops before the GT key yields `.`.
    pub fn genotype_values(&self) -> Option<Vec<&str>> {
        let gt_index = self.format_index("GT")?;
        Some(
            self.fields[FIRST_SAMPLE..]
                .iter()
                .map(|column| column.split(':').nth(gt_index).unwrap_or(MISSING))
                .collect(),
        )
    }

    fn format_index(&self, key: &str) -> Option<usize> {
        self.fields
            .get(FORMAT)
            .and_then(|format| format.split(':').position(|k| k == key))
    }

    /// Extract the fields reconciliation works on
    ///
    /// # Errors
    ///
    /// Returns `MalformedGenotype` if a sample's GT value does not parse.
    pub fn to_variant(&self) -> Result<VariantRecord, MalformedGenotype> {
        let genotypes = self
            .genotype_values()
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(sample, value)| {
                value.parse::<Genotype>().map_err(|_| MalformedGenotype {
                    sample,
                    value: value.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VariantRecord::new(
            self.chrom(),
            self.pos,
            self.reference(),
            self.alternates(),
        )
        .with_genotypes(genotypes))
    }

    /// Copy of this record on a different contig
    #[must_use]
    pub fn with_chrom(&self, chrom: &str) -> Self {
        let mut fields = self.fields.clone();
        fields[CHROM] = chrom.to_string();
        Self::from_fields(fields, self.pos)
    }

    /// Copy of this record carrying a reconciled variant's alleles and genotypes.
    ///
    /// With `clear_allele_fields`, INFO and FORMAT values declared
    /// `Number=A/R/G` in `header` are reset to `.`, since they were indexed by
    /// the old allele list.
    #[must_use]
    pub fn with_variant(
        &self,
        variant: &VariantRecord,
        header: &VcfHeader,
        clear_allele_fields: bool,
    ) -> Self {
        let mut fields = self.fields.clone();
        fields[REF].clone_from(&variant.reference);
        fields[ALT] = if variant.alternates.is_empty() {
            MISSING.to_string()
        } else {
            variant.alternates.join(",")
        };

        if clear_allele_fields {
            fields[INFO] = clear_info(&fields[INFO], header);
        }

        if let Some(format) = fields.get(FORMAT).cloned() {
            let keys: Vec<&str> = format.split(':').collect();
            for (sample, column) in fields.iter_mut().skip(FIRST_SAMPLE).enumerate() {
                let mut values: Vec<String> = column.split(':').map(str::to_string).collect();
                for (value, key) in values.iter_mut().zip(&keys) {
                    if *key == "GT" {
                        if let Some(genotype) = variant.genotypes.get(sample) {
                            *value = genotype.to_string();
                        }
                    } else if clear_allele_fields && header.is_allele_dependent_format(key) {
                        *value = MISSING.to_string();
                    }
                }
                *column = values.join(":");
            }
        }

        Self::from_fields(fields, variant.pos)
    }

    fn from_fields(fields: Vec<String>, pos: u64) -> Self {
        Self {
            line: fields.join("\t"),
            fields,
            pos,
        }
    }
}

fn clear_info(info: &str, header: &VcfHeader) -> String {
    if info == MISSING {
        return info.to_string();
    }

    info.split(';')
        .map(|entry| match entry.split_once('=') {
            Some((key, _)) if header.is_allele_dependent_info(key) => format!("{key}={MISSING}"),
            _ => entry.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// VCF reader yielding records lazily, in file order
pub struct VcfReader<R> {
    inner: R,
    header: VcfHeader,
    line_number: usize,
    buf: String,
}

impl<R: BufRead> VcfReader<R> {
    /// Create a reader, consuming the header
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the header cannot be read or parsed.
    pub fn new(mut inner: R) -> Result<Self, ParseError> {
        let mut text = String::new();
        let mut line_number = 0;
        let mut line = String::new();

        loop {
            line.clear();
            if inner.read_line(&mut line)? == 0 {
                break;
            }
            line_number += 1;

            if !line.starts_with('#') && !line.trim().is_empty() {
                return Err(ParseError::InvalidFormat(format!(
                    "Data line {line_number} appears before the #CHROM header line"
                )));
            }
            text.push_str(&line);
            if line.starts_with("#CHROM") {
                break;
            }
        }

        let header = VcfHeader::parse(&text)?;

        Ok(Self {
            inner,
            header,
            line_number,
            buf: String::new(),
        })
    }

    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    /// 1-based number of the last line read
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next record, or `None` at end of input
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` on I/O failure or a malformed line.
    pub fn read_record(&mut self) -> Result<Option<VcfRecord>, ParseError> {
        loop {
            self.buf.clear();
            if self.inner.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buf.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }
            return VcfRecord::parse(line, self.line_number).map(Some);
        }
    }

    /// Iterate over the remaining records
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over VCF records; stops after the first error
pub struct Records<'a, R> {
    reader: &'a mut VcfReader<R>,
    done: bool,
}

impl<R: BufRead> Iterator for Records<'_, R> {
    type Item = Result<VcfRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// VCF writer.
///
/// Headers go through the noodles writer; records are written as their
/// text line.
pub struct VcfWriter<W> {
    inner: vcf::io::Writer<W>,
}

impl<W: Write> VcfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: vcf::io::Writer::new(inner),
        }
    }

    /// # Errors
    ///
    /// Returns any I/O error from the underlying writer.
    pub fn write_header(&mut self, header: &VcfHeader) -> io::Result<()> {
        self.inner.write_header(&header.inner)
    }

    /// # Errors
    ///
    /// Returns any I/O error from the underlying writer.
    pub fn write_record(&mut self, record: &VcfRecord) -> io::Result<()> {
        let writer = self.inner.get_mut();
        writer.write_all(record.as_line().as_bytes())?;
        writer.write_all(b"\n")
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Open a VCF for reading: plain, gzip/bgzip by extension, or stdin for `-`
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn open_vcf(path: &Path) -> io::Result<Box<dyn BufRead>> {
    if is_stdio(path) {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let file = File::open(path)?;
    if is_gzipped(path) {
        // MultiGzDecoder reads every BGZF block, not just the first member
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Destination for VCF output
pub enum OutputSink {
    Stdout(BufWriter<io::Stdout>),
    Plain(BufWriter<File>),
    Bgzf(bgzf::Writer<File>),
}

impl OutputSink {
    /// Flush and, for BGZF output, write the EOF block
    ///
    /// # Errors
    ///
    /// Returns any I/O error from flushing or finishing the stream.
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::Stdout(mut w) => w.flush(),
            Self::Plain(mut w) => w.flush(),
            Self::Bgzf(w) => w.finish()?.flush(),
        }
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(w) => w.write(buf),
            Self::Plain(w) => w.write(buf),
            Self::Bgzf(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::Plain(w) => w.flush(),
            Self::Bgzf(w) => w.flush(),
        }
    }
}

/// Create a VCF output: plain, BGZF by extension, or stdout for `-`
///
/// # Errors
///
/// Returns an error if the file cannot be created.
pub fn create_vcf(path: &Path) -> io::Result<OutputSink> {
    if is_stdio(path) {
        return Ok(OutputSink::Stdout(BufWriter::new(io::stdout())));
    }

    let file = File::create(path)?;
    if is_gzipped(path) {
        Ok(OutputSink::Bgzf(bgzf::Writer::new(file)))
    } else {
        Ok(OutputSink::Plain(BufWriter::new(file)))
    }
}
