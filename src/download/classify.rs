//! Resource classification: picks a retrieval strategy from the URL alone.
//!
//! This is a filename heuristic, not content inspection — it never issues
//! network calls and never fails. The legacy rule that any filename
//! containing the substring "pdf" counts as a document is preserved on
//! purpose: it decides the document/video split in the final summary.

use url::Url;

/// Coarse kind of a remote resource, used to pick the fetch strategy and
/// to bucket successes in the batch summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Direct byte-fetch target (.pdf, .doc, ...)
    Document,
    /// Media-extraction target (yt-dlp)
    Video,
    /// Recognized as neither; still fetched via media extraction
    Unknown,
}

impl FileKind {
    /// Short label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Video => "video",
            Self::Unknown => "unknown",
        }
    }
}

/// Extensions fetched as plain documents.
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

/// Extensions fetched through media extraction.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m3u8", "webm", "mkv", "mov"];

/// Returns the final path segment of a URL, or an empty string.
pub fn url_filename(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("")
}

/// Classifies a URL by the lowercased extension of its final path segment.
///
/// Rules, in order:
/// 1. Filename contains the substring "pdf" → `Document` (legacy rule).
/// 2. Known document extension → `Document`; known video extension → `Video`.
/// 3. Unrecognized extension → `Unknown`.
/// 4. No extension at all (page URLs, watch links) → `Video`, the default,
///    since those are what the media extractor exists for.
pub fn classify_url(url: &Url) -> FileKind {
    let filename = url_filename(url).to_lowercase();

    if filename.contains("pdf") {
        return FileKind::Document;
    }

    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some(ext) if DOCUMENT_EXTENSIONS.contains(&ext) => FileKind::Document,
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext) => FileKind::Video,
        Some(_) => FileKind::Unknown,
        None => FileKind::Video,
    }
}
