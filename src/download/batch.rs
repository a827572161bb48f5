//! Batch orchestration: bounded-concurrency scheduling and outcome tallying.
//!
//! One task per accepted URL, all submitted at batch start, gated by a
//! `tokio::sync::Semaphore` of size N. Tasks complete in any order; outcomes
//! are collected as they arrive and folded into the summary. A single item
//! failing — including a panicking fetcher — never terminates the batch.
//! Batches run to completion; there is no mechanism to abort in-flight
//! fetches early.

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::validation::{sanitize_filename, validate_url};
use crate::download::classify::{classify_url, url_filename, FileKind};
use crate::download::fetch::{FetchItem, Fetcher, MediaFetcher};
use crate::download::progress::{spawn_reporter, ProgressSink};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use url::Url;

/// Immutable input to one orchestration run. Created once by the caller,
/// never mutated by the engine.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Ordered candidate URLs; invalid entries are dropped before scheduling
    pub urls: Vec<String>,
    /// Explicit destination directory for this batch. Passed down rather
    /// than rebuilt from ambient state at each call site.
    pub dest_dir: PathBuf,
    /// Vertical-resolution ceiling for video items (None = best available)
    pub max_height: Option<u32>,
    /// Maximum simultaneous in-flight downloads (must be >= 1)
    pub concurrency: usize,
    /// Per-file size cap for document fetches, in bytes
    pub max_file_size: Option<u64>,
}

impl BatchRequest {
    /// Creates a request with configured defaults (concurrency from
    /// `MAX_CONCURRENT`, size cap from `MAX_FILE_SIZE`, no height ceiling).
    pub fn new(urls: Vec<String>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            urls,
            dest_dir: dest_dir.into(),
            max_height: None,
            concurrency: *config::MAX_CONCURRENT_DOWNLOADS,
            max_file_size: Some(*config::MAX_FILE_SIZE),
        }
    }

    /// Creates a request targeting the configured root download folder
    /// (`DOWNLOAD_FOLDER`, "downloads" unless overridden).
    pub fn with_default_dest(urls: Vec<String>) -> Self {
        Self::new(urls, config::DOWNLOAD_FOLDER.as_str())
    }

    /// Caps video fetches at the given vertical resolution (e.g. 360, 1080).
    pub fn with_max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Overrides the concurrency limit for this batch.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit;
        self
    }
}

/// Terminal result of one fetch attempt. Produced exactly once per
/// scheduled URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Fetch completed; `kind` decides the summary bucket
    Success { kind: FileKind },
    /// Fetch failed; the cause is retained for logging/aggregation
    Failed { error: String },
}

/// Aggregate over all item outcomes of a run.
///
/// Invariants: `success + failed` equals the number of URLs accepted into
/// the batch, and `documents + videos <= success` (Unknown successes count
/// in neither kind bucket).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub success: usize,
    pub failed: usize,
    pub documents: usize,
    pub videos: usize,
}

impl BatchSummary {
    /// Folds one outcome into the tally.
    fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Success { kind } => {
                self.success += 1;
                match kind {
                    FileKind::Document => self.documents += 1,
                    FileKind::Video => self.videos += 1,
                    FileKind::Unknown => {}
                }
            }
            ItemOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Renders the final stats message delivered to the sink.
    pub fn to_message(&self) -> String {
        format!(
            "✅ Download Complete!\n📥 Successful: {}\n❌ Failed: {}\n📄 Documents: {}\n🎥 Videos: {}",
            self.success, self.failed, self.documents, self.videos
        )
    }
}

/// Runs a batch with the real fetcher (HTTP documents + yt-dlp media).
///
/// Returns synchronously-from-the-caller's-point-of-view: the future
/// resolves only once every scheduled fetch has reported an outcome.
///
/// # Errors
///
/// Only a precondition violation (concurrency limit of zero) or a failure
/// to create the destination directory rejects the whole batch; individual
/// fetch failures are folded into the summary instead.
pub async fn run_batch(request: BatchRequest, sink: Arc<dyn ProgressSink>) -> AppResult<BatchSummary> {
    run_batch_with(Arc::new(MediaFetcher::new()), request, sink).await
}

/// Runs a batch with a caller-supplied fetcher. This is the seam used by
/// tests and by embedders with custom retrieval backends.
pub async fn run_batch_with(
    fetcher: Arc<dyn Fetcher>,
    request: BatchRequest,
    sink: Arc<dyn ProgressSink>,
) -> AppResult<BatchSummary> {
    if request.concurrency == 0 {
        return Err(AppError::Precondition(
            "concurrency limit must be at least 1".to_string(),
        ));
    }

    // Pre-filter: URLs failing validation are dropped and never counted
    let accepted: Vec<Url> = request
        .urls
        .iter()
        .filter(|u| validate_url(u))
        .filter_map(|u| Url::parse(u).ok())
        .collect();
    let dropped = request.urls.len() - accepted.len();
    if dropped > 0 {
        log::warn!("{} of {} URL(s) failed validation and were dropped", dropped, request.urls.len());
    }

    std::fs::create_dir_all(&request.dest_dir)?;

    let total = accepted.len();
    log::info!(
        "Starting batch: {} item(s), concurrency {}, dest {}",
        total,
        request.concurrency,
        request.dest_dir.display()
    );

    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let reporter = spawn_reporter(progress_rx, Arc::clone(&sink));

    // Admission gate: at most `concurrency` transfers hold a permit at once
    let semaphore = Arc::new(Semaphore::new(request.concurrency));
    let mut tasks = JoinSet::new();

    for (idx, url) in accepted.into_iter().enumerate() {
        let item = FetchItem {
            kind: classify_url(&url),
            filename: sanitize_filename(url_filename(&url)),
            url,
            index: idx + 1,
            total,
            dest_dir: request.dest_dir.clone(),
            max_height: request.max_height,
            max_file_size: request.max_file_size,
        };
        let semaphore = Arc::clone(&semaphore);
        let fetcher = Arc::clone(&fetcher);
        let progress_tx = progress_tx.clone();

        tasks.spawn(async move {
            let permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                // The gate is never closed during a run; treat it as a failed item anyway
                Err(_) => {
                    return ItemOutcome::Failed {
                        error: "admission gate closed".to_string(),
                    }
                }
            };

            let result = fetcher.fetch(&item, progress_tx).await;

            // Release the gate before reporting, success or failure alike
            drop(permit);

            match result {
                Ok(kind) => {
                    log::info!("✅ Downloaded {}/{}: {}", item.index, item.total, item.url);
                    ItemOutcome::Success { kind }
                }
                Err(e) => {
                    log::error!("Download failed for {}: {}", item.url, e);
                    ItemOutcome::Failed { error: e.to_string() }
                }
            }
        });
    }
    drop(progress_tx);

    // Collect outcomes in completion order, not submission order
    let mut summary = BatchSummary::default();
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.unwrap_or_else(|e| ItemOutcome::Failed {
            error: format!("fetch task panicked: {}", e),
        });
        summary.record(&outcome);
    }

    // All senders are gone by now; wait for the reporter to drain and exit
    let _ = reporter.await;

    if let Err(e) = sink.update(summary.to_message()).await {
        log::warn!("Failed to deliver final summary: {}", e);
    }

    log::info!(
        "Batch finished: {} ok, {} failed ({} documents, {} videos)",
        summary.success,
        summary.failed,
        summary.documents,
        summary.videos
    );
    Ok(summary)
}
