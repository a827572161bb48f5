//! Zagruzka - bounded-concurrency batch downloader for documents and videos
//!
//! This library takes a list of URLs and downloads them in parallel under an
//! admission gate (at most N simultaneous transfers), classifying each item
//! as a document (direct HTTP fetch) or a video (yt-dlp extraction), and
//! produces an aggregate summary of the run.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, validation, and common utilities
//! - `download`: Batch orchestration, fetch strategies, and progress reporting

pub mod core;
pub mod download;

// Re-export commonly used types for convenience
pub use core::error::{AppError, AppResult};
pub use download::batch::{run_batch, run_batch_with, BatchRequest, BatchSummary, ItemOutcome};
pub use download::classify::FileKind;
pub use download::fetch::{Fetcher, MediaFetcher};
pub use download::progress::{LogSink, ProgressEvent, ProgressSink};
