//! Shared utility functions used across multiple modules.

use std::path::Path;

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// File name without its final extension, case preserved.
///
/// `"Pokemon (USA).gba"` becomes `"Pokemon (USA)"`.
pub fn file_stem(file_name: &str) -> String {
    Path::new(file_name).file_stem().map_or_else(
        || file_name.to_string(),
        |stem| stem.to_string_lossy().into_owned(),
    )
}

/// Final extension including the leading dot, or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Whether a directory entry name is hidden (dot-prefixed).
pub fn is_hidden(file_name: &str) -> bool {
    file_name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_option_rejects_empty() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some("   ".to_string())), None);
    }

    #[test]
    fn normalize_text_option_trims_value() {
        assert_eq!(
            normalize_text_option(Some(" http://romm.local ".to_string())),
            Some("http://romm.local".to_string())
        );
    }

    #[test]
    fn is_http_url_accepts_valid_schemes() {
        assert!(is_http_url("http://localhost"));
        assert!(is_http_url("https://example.com"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("example.com"));
    }

    #[test]
    fn file_stem_keeps_region_tags() {
        assert_eq!(
            file_stem("Pokemon Emerald (USA).gba"),
            "Pokemon Emerald (USA)"
        );
        assert_eq!(file_stem("Tetris.v1.gb"), "Tetris.v1");
        assert_eq!(file_stem("README"), "README");
    }

    #[test]
    fn dotted_extension_includes_dot() {
        assert_eq!(dotted_extension(Path::new("/saves/Zelda.srm")), ".srm");
        assert_eq!(dotted_extension(Path::new("/saves/Zelda")), "");
    }
}
