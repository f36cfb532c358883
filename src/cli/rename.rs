use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{print_counts, summary_writer, OutputFormat};
use crate::convert::{rename_vcf, RenameStats};
use crate::core::contig::detect_naming_convention;
use crate::core::types::NamingConvention;
use crate::parsing::vcf::{create_vcf, open_vcf, VcfReader, VcfWriter};
use crate::translate::{ContigTranslator, RenamePreset};

#[derive(Args)]
pub struct RenameArgs {
    /// Input VCF; '-' for stdin
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output VCF; '-' for stdout. Written gzip-compressed if the name ends in .gz/.bgz
    #[arg(required = true)]
    pub output: PathBuf,

    /// Built-in renaming rule
    #[arg(long, value_enum, default_value = "hg19-to-grch37", conflicts_with = "table")]
    pub preset: RenamePreset,

    /// Two-column TSV rename table (from, to); contigs not listed are removed
    #[arg(long)]
    pub table: Option<PathBuf>,
}

/// Execute rename subcommand
///
/// # Errors
///
/// Returns an error if the rename table or input cannot be read, or the output
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: RenameArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let translator = match &args.table {
        Some(path) => ContigTranslator::load_table(path)
            .with_context(|| format!("Failed to load rename table {}", path.display()))?,
        None => ContigTranslator::preset(args.preset),
    };

    let input = open_vcf(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let mut reader = VcfReader::new(input)?;

    let naming = detect_naming_convention(reader.header().contig_names());
    if verbose {
        eprintln!(
            "Input declares {} contigs ({naming:?} naming)",
            reader.header().contig_names().count()
        );
    }
    if args.table.is_none() {
        warn_on_naming_mismatch(args.preset, naming);
    }

    let mut writer = VcfWriter::new(
        create_vcf(&args.output)
            .with_context(|| format!("Failed to create {}", args.output.display()))?,
    );
    let stats = rename_vcf(&mut reader, &mut writer, &translator)?;
    writer.into_inner().finish()?;

    print_stats(&stats, &args, format)
}

fn warn_on_naming_mismatch(preset: RenamePreset, naming: NamingConvention) {
    let expected = match preset {
        RenamePreset::Hg19ToGrch37 | RenamePreset::UcscToNcbi => NamingConvention::Ucsc,
        RenamePreset::NcbiToUcsc => NamingConvention::Ncbi,
    };
    if naming != expected && naming != NamingConvention::Mixed {
        eprintln!(
            "Warning: Input contigs use {naming:?} naming but the preset expects {expected:?}; most records will be removed."
        );
    }
}

fn print_stats(stats: &RenameStats, args: &RenameArgs, format: OutputFormat) -> anyhow::Result<()> {
    let rows = [
        ("records", stats.records),
        ("renamed", stats.renamed),
        ("unchanged", stats.unchanged),
        ("removed", stats.removed),
        ("contigs_removed", stats.contigs_removed.len()),
    ];
    let json = serde_json::json!({
        "input": args.input.display().to_string(),
        "output": args.output.display().to_string(),
        "stats": stats,
    });

    let mut out = summary_writer(&args.output);
    print_counts(
        out.as_mut(),
        &format!("Renamed contigs in {}", args.input.display()),
        &rows,
        &json,
        format,
    )
}
