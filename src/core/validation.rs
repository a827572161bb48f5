//! URL and filename validation utilities
//!
//! Provides security-focused validation for user inputs:
//! - URL validation (scheme + host must both be present)
//! - Filename sanitization (remove filesystem-unsafe characters, defeat traversal)
//! - Link-list parsing for batch ingestion

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Maximum length of a sanitized filename, in characters.
/// Chosen to respect common remote-filesystem name limits.
pub const MAX_FILENAME_LEN: usize = 220;

/// Everything outside word characters, hyphen, underscore, period, space
/// and parentheses gets stripped.
static FILENAME_DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"[^\w\-_. ()]").expect("filename pattern is a valid regex")
});

/// Validates that a string is a well-formed absolute URL.
///
/// Contract: true iff the string parses into a URL with both a non-empty
/// scheme and a non-empty host. Never panics or errors; any parse failure
/// yields `false`.
///
/// # Examples
/// ```
/// use zagruzka::core::validation::validate_url;
///
/// assert!(validate_url("https://example.com/a.pdf"));
/// assert!(validate_url("ftp://example.com/file"));
/// assert!(!validate_url("not a url"));
/// assert!(!validate_url("ftp://"));
/// ```
pub fn validate_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => !parsed.scheme().is_empty() && parsed.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Sanitizes a filename into a safe local name.
///
/// Keeps word characters, hyphen, underscore, period, space and parentheses;
/// removes every literal `..` (defeats path traversal); truncates to
/// [`MAX_FILENAME_LEN`] characters. Pure and total: always returns a usable
/// string, empty if every input character was disallowed.
///
/// Idempotent: sanitizing an already-sanitized name yields the same name.
///
/// # Examples
/// ```
/// use zagruzka::core::validation::sanitize_filename;
///
/// assert_eq!(sanitize_filename("lecture 01 (intro).pdf"), "lecture 01 (intro).pdf");
/// assert_eq!(sanitize_filename("../../etc/passwd"), "etcpasswd");
/// assert_eq!(sanitize_filename("a:b*c?.mp4"), "abc.mp4");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = FILENAME_DISALLOWED.replace_all(name, "");
    let cleaned = cleaned.replace("..", "");
    cleaned.chars().take(MAX_FILENAME_LEN).collect()
}

/// Parses a free-form text blob (e.g. an uploaded .txt file) into the list
/// of URLs accepted for a batch.
///
/// Lines are trimmed; empty lines and lines failing [`validate_url`] are
/// dropped silently. Input order is preserved.
pub fn parse_link_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| validate_url(line))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== validate_url Tests ====================

    #[test]
    fn test_validate_url_valid() {
        let valid_urls = vec![
            "https://example.com/a.pdf",
            "http://example.com",
            "https://cdn.example.com/path/to/lecture.mp4?token=abc",
            "ftp://files.example.com/pub/file.zip",
        ];

        for url in valid_urls {
            assert!(validate_url(url), "Failed for: {}", url);
        }
    }

    #[test]
    fn test_validate_url_invalid() {
        let invalid_urls = vec!["not a url", "ftp://", "", "example.com/a.pdf", "https://"];

        for url in invalid_urls {
            assert!(!validate_url(url), "Should fail for: {}", url);
        }
    }

    // ==================== sanitize_filename Tests ====================

    #[test]
    fn test_sanitize_filename_valid() {
        let cases = vec![
            ("video.mp4", "video.mp4"),
            ("my-video_2024.mp4", "my-video_2024.mp4"),
            ("video (1).mp4", "video (1).mp4"),
            ("Видео на русском.mp4", "Видео на русском.mp4"),
        ];

        for (input, expected) in cases {
            assert_eq!(sanitize_filename(input), expected, "Failed for: {}", input);
        }
    }

    #[test]
    fn test_sanitize_filename_removes_unsafe_chars() {
        let cases = vec![
            ("video:file.mp4", "videofile.mp4"),
            ("path/to/file.mp4", "pathtofile.mp4"),
            ("file*?.mp4", "file.mp4"),
            ("file<>|.mp4", "file.mp4"),
            ("file\"name.mp4", "filename.mp4"),
        ];

        for (input, expected) in cases {
            assert_eq!(sanitize_filename(input), expected, "Failed for: {}", input);
        }
    }

    #[test]
    fn test_sanitize_filename_defeats_traversal() {
        let sanitized = sanitize_filename("../../etc/passwd");
        assert!(!sanitized.contains(".."), "traversal left in: {}", sanitized);
        assert!(!sanitized.contains('/'), "separator left in: {}", sanitized);
    }

    #[test]
    fn test_sanitize_filename_truncates() {
        let long = "a".repeat(500);
        assert_eq!(sanitize_filename(&long).chars().count(), MAX_FILENAME_LEN);
    }

    #[test]
    fn test_sanitize_filename_idempotent() {
        let inputs = vec!["../../etc/passwd", "my file (2).pdf", "a:b*c.mp4", "....", ""];
        for input in inputs {
            let once = sanitize_filename(input);
            let twice = sanitize_filename(&once);
            assert_eq!(once, twice, "Not idempotent for: {}", input);
        }
    }

    #[test]
    fn test_sanitize_filename_empty_result() {
        assert_eq!(sanitize_filename("/:*?\"<>|"), "");
    }

    // ==================== parse_link_list Tests ====================

    #[test]
    fn test_parse_link_list_filters_invalid() {
        let text = "https://example.com/a.pdf\n\nnot a url\n  https://example.com/b.mp4  \nftp://\n";
        let links = parse_link_list(text);
        assert_eq!(links, vec!["https://example.com/a.pdf", "https://example.com/b.mp4"]);
    }

    #[test]
    fn test_parse_link_list_empty() {
        assert!(parse_link_list("").is_empty());
        assert!(parse_link_list("\n\n  \n").is_empty());
    }
}
