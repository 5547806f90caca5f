//! Slug generation for page identities.

use unicode_normalization::UnicodeNormalization;

/// Convert text to a URL-safe slug.
///
/// Decomposes to NFKD and drops what is left outside ASCII, so accented
/// letters keep their base letter. Then keeps letters, digits, underscores,
/// and hyphens; lowercases; turns runs of whitespace and hyphens into a
/// single hyphen; strips leading and trailing hyphens and underscores.
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .nfkd()
        .filter(char::is_ascii)
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-') || c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut pending_dash = false;
    for c in kept.chars() {
        if c == '-' || c.is_whitespace() {
            pending_dash = true;
            continue;
        }
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.push(c);
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Slugify and truncate to at most `max_len` characters.
pub fn slug_for(title: &str, max_len: usize) -> String {
    slugify(title).chars().take(max_len).collect()
}
