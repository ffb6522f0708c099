//! Column-name and value normalization.

/// Normalizes text for matching: lowercases, turns separators into spaces and
/// collapses whitespace.
pub fn normalize_text(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', '-', '.', '/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercases, replaces every non-alphanumeric character with a space and
/// trims the ends. Inner whitespace is left as is.
pub fn default_process(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}
