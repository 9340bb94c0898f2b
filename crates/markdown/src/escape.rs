/// Replace HTML-significant characters with entities.
///
/// Ampersand goes first so the entities introduced by the later replacements
/// are not themselves re-escaped. Escaping already-escaped text double-escapes
/// on purpose: every call site escapes raw input exactly once.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Allow-list link targets.
///
/// Only `http://`, `https://` and `mailto:` pass through (case-insensitive);
/// everything else, including `javascript:` and relative paths, collapses to
/// `"#"`. This is the sole defense for user-influenced hrefs.
pub fn sanitize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return "#".to_string();
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("mailto:")
    {
        trimmed.to_string()
    } else {
        "#".to_string()
    }
}
