use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the batch downloader

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Root download folder
/// Read from DOWNLOAD_FOLDER environment variable, defaults to "downloads".
/// Batch destination directories are created underneath by the caller.
pub static DOWNLOAD_FOLDER: Lazy<String> =
    Lazy::new(|| env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| "downloads".to_string()));

/// Default number of concurrent downloads per batch
/// Read from MAX_CONCURRENT environment variable, defaults to 3.
pub static MAX_CONCURRENT_DOWNLOADS: Lazy<usize> = Lazy::new(|| {
    env::var("MAX_CONCURRENT")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(3)
});

/// Default per-file size cap in bytes (50 MB)
/// Read from MAX_FILE_SIZE environment variable.
pub static MAX_FILE_SIZE: Lazy<u64> = Lazy::new(|| {
    env::var("MAX_FILE_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(52_428_800)
});

/// Download configuration
pub mod download {
    use super::Duration;

    /// Timeout for a single yt-dlp invocation (in seconds)
    pub const YTDLP_TIMEOUT_SECS: u64 = 1800; // 30 minutes

    /// Connect timeout for direct HTTP fetches (in seconds)
    pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 30;

    /// Overall timeout for direct HTTP fetches (in seconds)
    pub const HTTP_TIMEOUT_SECS: u64 = 600;

    /// yt-dlp command timeout duration
    pub fn ytdlp_timeout() -> Duration {
        Duration::from_secs(YTDLP_TIMEOUT_SECS)
    }
}

/// Progress reporting configuration
pub mod progress {
    use super::Duration;

    /// Minimum interval between status-sink updates (in milliseconds).
    /// Events arriving faster than this are dropped; last write wins.
    pub const MIN_UPDATE_INTERVAL_MS: u64 = 1500;

    /// Throttle interval duration
    pub fn min_update_interval() -> Duration {
        Duration::from_millis(MIN_UPDATE_INTERVAL_MS)
    }
}
