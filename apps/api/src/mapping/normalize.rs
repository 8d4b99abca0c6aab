/// Canonicalises a raw CSV header for fuzzy comparison.
///
/// Lowercases, turns `_` and `-` into spaces, drops every character that is
/// not alphanumeric, whitespace or `%`, then collapses and trims whitespace.
/// The result is a fixed point: normalising it again changes nothing.
pub fn normalize_header(header: &str) -> String {
    let cleaned: String = header
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '%')
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
