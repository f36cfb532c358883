//! Centralized validation and helper functions.

/// Maximum number of contigs allowed in a single header (DOS protection)
pub const MAX_CONTIGS: usize = 100_000;

/// Maximum number of sites accepted from a custom catalog
pub const MAX_SITES: usize = 1_000_000;

/// Validate that a character is a single unambiguous nucleotide (A, C, G or T).
///
/// # Examples
///
/// ```
/// use ref_reconcile::utils::validation::is_valid_base;
///
/// assert!(is_valid_base('C'));
/// assert!(!is_valid_base('N'));
/// assert!(!is_valid_base('c'));
/// ```
#[must_use]
pub fn is_valid_base(base: char) -> bool {
    matches!(base, 'A' | 'C' | 'G' | 'T')
}

/// Parse a catalog base field, which must be exactly one valid nucleotide
#[must_use]
pub fn parse_base(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(base), None) if is_valid_base(base) => Some(base),
        _ => None,
    }
}

/// Validate that a string is a valid MD5 checksum (32 hex characters).
///
/// # Examples
///
/// ```
/// use ref_reconcile::utils::validation::is_valid_md5;
///
/// assert!(is_valid_md5("6aef897c3d6ff0c78aff06ac189178dd"));
/// assert!(!is_valid_md5("not-an-md5"));
/// ```
#[must_use]
pub fn is_valid_md5(s: &str) -> bool {
    s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Normalize an MD5 string to lowercase.
/// Returns None if the input is not a valid MD5.
#[must_use]
pub fn normalize_md5(s: &str) -> Option<String> {
    if is_valid_md5(s) {
        Some(s.to_lowercase())
    } else {
        None
    }
}

/// Validate a contig name for use in a VCF header or record.
///
/// VCF forbids whitespace, commas and angle brackets in contig IDs, and
/// names may not start with `*` or `=`.
#[must_use]
pub fn is_valid_contig_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(['*', '='])
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ',' | '<' | '>' | '"' | '\''))
}
