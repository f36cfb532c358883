use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::catalog::store::MismatchRegistry;
use crate::cli::{load_registry, OutputFormat};
use crate::core::site::{MismatchSite, SiteKey};
use crate::parsing::fasta::{fetch_bases, is_fasta_file};
use crate::parsing::tsv::write_sites_text;

#[derive(Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommands,
}

#[derive(Subcommand)]
pub enum SitesCommands {
    /// List all sites in the catalog
    List {
        /// Path to custom catalog file (JSON or TSV)
        #[arg(long)]
        sites: Option<PathBuf>,

        /// Only list sites on this source contig
        #[arg(long)]
        chrom: Option<String>,
    },

    /// Show the site at a source position
    Show {
        /// Source assembly position as CHROM:POS (e.g., "chr2:21012603")
        #[arg(required = true)]
        position: String,

        /// Path to custom catalog file (JSON or TSV)
        #[arg(long)]
        sites: Option<PathBuf>,
    },

    /// Export the catalog to a file (TSV if the name ends in .tsv, JSON otherwise)
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,

        /// Path to custom catalog file to export (defaults to embedded)
        #[arg(long)]
        sites: Option<PathBuf>,
    },

    /// Verify site bases against reference FASTA files
    Check {
        /// Path to custom catalog file (JSON or TSV)
        #[arg(long)]
        sites: Option<PathBuf>,

        /// FASTA of the source assembly; checks each site's source base
        #[arg(long, required_unless_present = "target_fasta")]
        source_fasta: Option<PathBuf>,

        /// FASTA of the target assembly; checks each site's target base
        #[arg(long)]
        target_fasta: Option<PathBuf>,
    },
}

/// Execute sites subcommand
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, a site is not found, or
/// `check` finds bases that disagree with the references.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SitesArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        SitesCommands::List { sites, chrom } => {
            run_list(sites.as_deref(), chrom.as_deref(), format, verbose)
        }
        SitesCommands::Show { position, sites } => run_show(&position, sites.as_deref(), format),
        SitesCommands::Export { output, sites } => run_export(&output, sites.as_deref()),
        SitesCommands::Check {
            sites,
            source_fasta,
            target_fasta,
        } => run_check(
            sites.as_deref(),
            source_fasta.as_deref(),
            target_fasta.as_deref(),
            format,
        ),
    }
}

fn run_list(
    catalog_path: Option<&Path>,
    chrom_filter: Option<&str>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let registry = load_registry(catalog_path)?;

    if verbose {
        eprintln!("Loaded catalog with {} sites", registry.len());
    }

    let filtered: Vec<&MismatchSite> = registry
        .sites()
        .iter()
        .filter(|s| chrom_filter.map_or(true, |chrom| s.source_chrom == chrom))
        .collect();

    match format {
        OutputFormat::Text => {
            println!(
                "Mismatch Sites ({} sites, {} -> {})\n",
                filtered.len(),
                registry.source_assembly,
                registry.target_assembly
            );
            let source_width = filtered
                .iter()
                .map(|s| format!("{}:{}", s.source_chrom, s.source_pos).len())
                .max()
                .unwrap_or(6)
                .max(6);
            println!(
                "{:<src_w$} {:>4}   {:<src_w$} {:>4}",
                "Source",
                "Base",
                "Target",
                "Base",
                src_w = source_width
            );
            println!("{}", "-".repeat(source_width * 2 + 12));
            for s in &filtered {
                println!(
                    "{:<src_w$} {:>4}   {:<src_w$} {:>4}",
                    format!("{}:{}", s.source_chrom, s.source_pos),
                    s.source_base,
                    format!("{}:{}", s.target_chrom, s.target_pos),
                    s.target_base,
                    src_w = source_width
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&filtered)?);
        }
        OutputFormat::Tsv => {
            println!("source_chrom\tsource_pos\tsource_base\ttarget_chrom\ttarget_pos\ttarget_base");
            for s in &filtered {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    s.source_chrom,
                    s.source_pos,
                    s.source_base,
                    s.target_chrom,
                    s.target_pos,
                    s.target_base
                );
            }
        }
    }

    Ok(())
}

/// Parse `CHROM:POS`, splitting at the last colon so contig names may contain one
fn parse_position(position: &str) -> anyhow::Result<SiteKey> {
    let (chrom, pos) = position
        .rsplit_once(':')
        .ok_or_else(|| anyhow::anyhow!("Expected CHROM:POS, got '{position}'"))?;
    let pos = pos
        .replace(',', "")
        .parse::<u64>()
        .map_err(|_| anyhow::anyhow!("Invalid position '{pos}' in '{position}'"))?;
    if chrom.is_empty() || pos == 0 {
        anyhow::bail!("Expected CHROM:POS with a 1-based position, got '{position}'");
    }
    Ok((chrom.to_string(), pos))
}

fn run_show(position: &str, catalog_path: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    let registry = load_registry(catalog_path)?;
    let (chrom, pos) = parse_position(position)?;

    let site = registry.lookup(&chrom, pos).ok_or_else(|| {
        anyhow::anyhow!(
            "No mismatch site at {chrom}:{pos} in the {} catalog",
            registry.source_assembly
        )
    })?;

    match format {
        OutputFormat::Text => {
            println!("Mismatch site {}:{}\n", site.source_chrom, site.source_pos);
            println!(
                "{:<8} {}:{} {}",
                format!("{}:", registry.source_assembly),
                site.source_chrom,
                site.source_pos,
                site.source_base
            );
            println!(
                "{:<8} {}:{} {}",
                format!("{}:", registry.target_assembly),
                site.target_chrom,
                site.target_pos,
                site.target_base
            );
            println!(
                "\nRecords whose REF covers this position are rewritten with {} at that offset.",
                site.target_base
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(site)?);
        }
        OutputFormat::Tsv => {
            println!("source_chrom\tsource_pos\tsource_base\ttarget_chrom\ttarget_pos\ttarget_base");
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                site.source_chrom,
                site.source_pos,
                site.source_base,
                site.target_chrom,
                site.target_pos,
                site.target_base
            );
        }
    }

    Ok(())
}

#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn run_export(output: &Path, catalog_path: Option<&Path>) -> anyhow::Result<()> {
    let registry = load_registry(catalog_path)?;

    let is_tsv = output.to_string_lossy().to_lowercase().ends_with(".tsv");
    let content = if is_tsv {
        write_sites_text(&registry)
    } else {
        registry.to_json()?
    };
    std::fs::write(output, content)?;

    println!("Exported {} sites to {}", registry.len(), output.display());

    Ok(())
}

/// Outcome of checking one recorded base against a FASTA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BaseCheck {
    Match,
    Mismatch(char),
    Missing,
    NotChecked,
}

impl BaseCheck {
    fn new(expected: char, found: Option<char>) -> Self {
        match found {
            Some(base) if base == expected => Self::Match,
            Some(base) => Self::Mismatch(base),
            None => Self::Missing,
        }
    }

    fn is_failure(self) -> bool {
        matches!(self, Self::Mismatch(_) | Self::Missing)
    }

    fn label(self) -> String {
        match self {
            Self::Match => "ok".to_string(),
            Self::Mismatch(found) => format!("found {found}"),
            Self::Missing => "missing".to_string(),
            Self::NotChecked => "-".to_string(),
        }
    }
}

fn check_bases(
    registry: &MismatchRegistry,
    fasta: Option<&Path>,
    key: impl Fn(&MismatchSite) -> (SiteKey, char),
) -> anyhow::Result<Vec<BaseCheck>> {
    let Some(fasta) = fasta else {
        return Ok(vec![BaseCheck::NotChecked; registry.len()]);
    };
    if !is_fasta_file(fasta) {
        eprintln!(
            "Warning: {} does not have a FASTA extension (.fa, .fasta, .fna)",
            fasta.display()
        );
    }

    let wanted: Vec<SiteKey> = registry.sites().iter().map(|s| key(s).0).collect();
    let found = fetch_bases(fasta, &wanted)?;

    Ok(registry
        .sites()
        .iter()
        .map(|s| {
            let (position, expected) = key(s);
            BaseCheck::new(expected, found.get(&position).copied())
        })
        .collect())
}

fn run_check(
    catalog_path: Option<&Path>,
    source_fasta: Option<&Path>,
    target_fasta: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let registry = load_registry(catalog_path)?;

    let source = check_bases(&registry, source_fasta, |s| {
        ((s.source_chrom.clone(), s.source_pos), s.source_base)
    })?;
    let target = check_bases(&registry, target_fasta, |s| {
        ((s.target_chrom.clone(), s.target_pos), s.target_base)
    })?;

    let results: Vec<(&MismatchSite, BaseCheck, BaseCheck)> = registry
        .sites()
        .iter()
        .zip(source)
        .zip(target)
        .map(|((site, source), target)| (site, source, target))
        .collect();

    match format {
        OutputFormat::Text => {
            println!("Checked {} sites\n", results.len());
            for (site, source, target) in &results {
                println!(
                    "{}  {}: {}  {}: {}",
                    site,
                    registry.source_assembly,
                    source.label(),
                    registry.target_assembly,
                    target.label()
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = results
                .iter()
                .map(|(site, source, target)| {
                    serde_json::json!({
                        "site": site,
                        "source": source.label(),
                        "target": target.label(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("source_chrom\tsource_pos\ttarget_chrom\ttarget_pos\tsource_check\ttarget_check");
            for (site, source, target) in &results {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    site.source_chrom,
                    site.source_pos,
                    site.target_chrom,
                    site.target_pos,
                    source.label(),
                    target.label()
                );
            }
        }
    }

    let failures = results
        .iter()
        .filter(|(_, source, target)| source.is_failure() || target.is_failure())
        .count();
    if failures > 0 {
        anyhow::bail!("{failures} of {} sites disagree with the reference", results.len());
    }

    Ok(())
}
