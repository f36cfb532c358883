//! Command-line interface for ref-reconcile.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **reconcile**: Rewrite GRCh38-named records at known mismatch sites for GRCh37
//! - **rename**: Translate contig names (hg19 → GRCh37 by default)
//! - **sites**: List, show, export, or check the mismatch site catalog
//!
//! ## Usage
//!
//! ```text
//! # Reconcile a VCF against the embedded catalog
//! ref-reconcile reconcile calls.vcf.gz reconciled.vcf.gz
//!
//! # Keep going past records that cannot be reconciled, saving them for review
//! ref-reconcile reconcile calls.vcf out.vcf --on-reject skip --rejected review.vcf
//!
//! # Rename hg19 contigs to GRCh37, streaming
//! zcat hg19.vcf.gz | ref-reconcile rename - - > grch37.vcf
//!
//! # JSON run summary for scripting
//! ref-reconcile reconcile in.vcf out.vcf --format json
//!
//! # Verify catalog bases against both assemblies
//! ref-reconcile sites check --source-fasta GRCh38.fa --target-fasta GRCh37.fa
//! ```

use std::io::{self, Write};
use std::path::Path;

use clap::{Parser, Subcommand};

use crate::catalog::store::MismatchRegistry;

pub mod reconcile;
pub mod rename;
pub mod sites;

#[derive(Parser)]
#[command(name = "ref-reconcile")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Reconcile variant calls across reference assemblies")]
#[command(
    long_about = "ref-reconcile converts variant calls between GRCh38 and GRCh37 where a simple coordinate liftover is not enough.\n\nIt provides:\n- Allele and genotype rewriting at sites where the two assemblies carry different reference bases\n- Contig renaming between UCSC and NCBI conventions, including hg19 to GRCh37\n- Inspection and verification of the mismatch site catalog"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite records at assembly mismatch sites
    Reconcile(reconcile::ReconcileArgs),

    /// Translate contig names
    Rename(rename::RenameArgs),

    /// Inspect the mismatch site catalog
    Sites(sites::SitesArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Load a custom catalog, or the embedded one
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub fn load_registry(path: Option<&Path>) -> anyhow::Result<MismatchRegistry> {
    let registry = if let Some(path) = path {
        MismatchRegistry::load_from_file(path)?
    } else {
        MismatchRegistry::load_embedded()?
    };
    Ok(registry)
}

/// Where a pass summary goes: stdout, unless VCF output is already using it
fn summary_writer(output: &Path) -> Box<dyn Write> {
    if output.as_os_str() == "-" {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    }
}

/// Print `(label, count)` rows as text, a JSON object, or a two-line TSV
fn print_counts(
    out: &mut dyn Write,
    title: &str,
    rows: &[(&str, usize)],
    json: &serde_json::Value,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "{title}")?;
            let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
            for (label, count) in rows {
                writeln!(out, "  {label:<width$}  {count:>10}")?;
            }
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(json)?)?;
        }
        OutputFormat::Tsv => {
            let labels: Vec<&str> = rows.iter().map(|(label, _)| *label).collect();
            let counts: Vec<String> = rows.iter().map(|(_, count)| count.to_string()).collect();
            writeln!(out, "{}", labels.join("\t"))?;
            writeln!(out, "{}", counts.join("\t"))?;
        }
    }
    Ok(())
}
