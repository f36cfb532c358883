use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{load_registry, print_counts, summary_writer, OutputFormat};
use crate::convert::reconcile_vcf;
use crate::parsing::vcf::{create_vcf, open_vcf, VcfReader, VcfWriter};
use crate::reconcile::{ReconcileConfig, ReconcileStats, ReconciliationEngine, RejectPolicy};

#[derive(Args)]
pub struct ReconcileArgs {
    /// Input VCF with source assembly (GRCh38) alleles; '-' for stdin
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output VCF; '-' for stdout. Written gzip-compressed if the name ends in .gz/.bgz
    #[arg(required = true)]
    pub output: PathBuf,

    /// Path to a custom mismatch site catalog (JSON or TSV)
    #[arg(long)]
    pub sites: Option<PathBuf>,

    /// What to do with a record that cannot be reconciled
    #[arg(long, value_enum, default_value = "abort")]
    pub on_reject: RejectPolicy,

    /// Write rejected records to this VCF (requires --on-reject skip)
    #[arg(long)]
    pub rejected: Option<PathBuf>,

    /// Keep INFO/FORMAT values declared Number=A/R/G on rewritten records
    #[arg(long)]
    pub keep_allele_fields: bool,
}

/// Execute reconcile subcommand
///
/// # Errors
///
/// Returns an error if the catalog or input cannot be read, the output cannot
/// be written, or a record is rejected under `--on-reject abort`.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ReconcileArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if args.rejected.is_some() && args.on_reject == RejectPolicy::Abort {
        anyhow::bail!("--rejected requires --on-reject skip");
    }

    let registry = load_registry(args.sites.as_deref())?;
    if verbose {
        eprintln!(
            "Loaded {} mismatch sites ({} -> {})",
            registry.len(),
            registry.source_assembly,
            registry.target_assembly
        );
    }
    if registry.is_empty() {
        eprintln!("Warning: Catalog is empty, every record will pass through unchanged.");
    }

    let engine = ReconciliationEngine::new(&registry);
    let config = ReconcileConfig {
        reject_policy: args.on_reject,
        clear_allele_fields: !args.keep_allele_fields,
    };

    let input = open_vcf(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let mut reader = VcfReader::new(input)?;
    let mut writer = VcfWriter::new(
        create_vcf(&args.output)
            .with_context(|| format!("Failed to create {}", args.output.display()))?,
    );
    let mut rejected = match &args.rejected {
        Some(path) => Some(VcfWriter::new(
            create_vcf(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => None,
    };

    let stats = reconcile_vcf(
        &mut reader,
        &mut writer,
        &engine,
        &config,
        rejected.as_mut(),
    )?;

    writer.into_inner().finish()?;
    if let Some(rejected) = rejected {
        rejected.into_inner().finish()?;
    }

    print_stats(&stats, &args, format)
}

fn print_stats(
    stats: &ReconcileStats,
    args: &ReconcileArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rows = [
        ("records", stats.records),
        ("unchanged", stats.unchanged),
        ("rewritten", stats.rewritten),
        ("dropped", stats.dropped),
        ("rejected", stats.rejected),
    ];
    let json = serde_json::json!({
        "input": args.input.display().to_string(),
        "output": args.output.display().to_string(),
        "stats": stats,
    });

    let mut out = summary_writer(&args.output);
    print_counts(
        out.as_mut(),
        &format!("Reconciled {}", args.input.display()),
        &rows,
        &json,
        format,
    )
}
