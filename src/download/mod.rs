//! Download engine: batch orchestration, fetch strategies, progress reporting

pub mod batch;
pub mod classify;
pub mod fetch;
pub mod progress;
pub mod ytdlp;

// Re-exports for convenience
pub use batch::{run_batch, run_batch_with, BatchRequest, BatchSummary, ItemOutcome};
pub use classify::{classify_url, FileKind};
pub use fetch::{FetchItem, Fetcher, MediaFetcher};
pub use progress::{LogSink, ProgressEvent, ProgressSink};
