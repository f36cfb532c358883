use crate::catalog::store::{CatalogError, MismatchRegistry};
use crate::core::site::MismatchSite;
use crate::core::types::Assembly;
use crate::utils::validation::{parse_base, MAX_SITES};

/// Data lines of a TSV file: 1-based line number and tab-split fields.
///
/// Blank lines and `#` comments are skipped, as is a first line whose first
/// column matches one of `header_names`.
fn data_lines<'a>(
    text: &'a str,
    header_names: &'a [&'a str],
) -> impl Iterator<Item = (usize, Vec<&'a str>)> + 'a {
    let mut first_data_line = true;

    text.lines()
        .enumerate()
        .filter_map(move |(i, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }

            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();

            // Check if first non-empty/non-comment line is a header
            if first_data_line {
                first_data_line = false;
                let first = fields.first().map(|s| s.to_lowercase()).unwrap_or_default();
                if header_names.contains(&first.as_str()) {
                    return None;
                }
            }

            // Line numbers in errors are 1-based for user friendliness
            Some((i + 1, fields))
        })
}

/// Parse a mismatch site catalog with columns:
/// `source_chrom, source_pos, source_base, target_chrom, target_pos, target_base`
///
/// The source and target assemblies default to GRCh38 and GRCh37.
///
/// # Errors
///
/// Returns `CatalogError::InvalidLine` for lines with missing columns, bad
/// positions or bad bases, and any error from `MismatchRegistry::add_site`.
pub fn parse_sites_text(text: &str) -> Result<MismatchRegistry, CatalogError> {
    let mut registry = MismatchRegistry::new(Assembly::Grch38, Assembly::Grch37);

    for (line, fields) in data_lines(text, &["source_chrom", "chrom", "#source_chrom"]) {
        let invalid = |reason: String| CatalogError::InvalidLine { line, reason };

        if fields.len() < 6 {
            return Err(invalid(format!(
                "expected 6 tab-separated fields, found {}",
                fields.len()
            )));
        }

        let pos = |value: &str| {
            value
                .parse::<u64>()
                .map_err(|_| invalid(format!("invalid position '{value}'")))
        };
        let base = |value: &str| {
            parse_base(value).ok_or_else(|| invalid(format!("invalid base '{value}'")))
        };

        if registry.len() >= MAX_SITES {
            return Err(invalid(format!("more than {MAX_SITES} sites")));
        }

        registry.add_site(MismatchSite::new(
            (fields[0], pos(fields[1])?, base(fields[2])?),
            (fields[3], pos(fields[4])?, base(fields[5])?),
        ))?;
    }

    Ok(registry)
}

/// Render a registry in the format `parse_sites_text` reads, with a header row
pub fn write_sites_text(registry: &MismatchRegistry) -> String {
    let mut out =
        String::from("source_chrom\tsource_pos\tsource_base\ttarget_chrom\ttarget_pos\ttarget_base\n");
    for site in registry.sites() {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            site.source_chrom,
            site.source_pos,
            site.source_base,
            site.target_chrom,
            site.target_pos,
            site.target_base
        ));
    }
    out
}

/// Parse a contig rename table with columns: `from, to`.
///
/// A row with an empty or missing `to` column marks the contig as having no
/// counterpart.
///
/// # Errors
///
/// Returns the 1-based line number and a reason for lines with no `from` column.
pub fn parse_rename_text(text: &str) -> Result<Vec<(String, Option<String>)>, (usize, String)> {
    let mut rows = Vec::new();

    for (line, fields) in data_lines(text, &["from", "source", "name"]) {
        let from = fields.first().copied().unwrap_or_default();
        if from.is_empty() {
            return Err((line, "missing source contig name".to_string()));
        }
        let to = fields
            .get(1)
            .copied()
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        rows.push((from.to_string(), to));
    }

    Ok(rows)
}
