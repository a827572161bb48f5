//! Single-item fetching: the `Fetcher` seam and the real strategies.
//!
//! `MediaFetcher` retrieves exactly one URL into the batch's destination
//! folder, picking the strategy from the item's classification: documents go
//! through a streaming HTTP fetch, everything else through yt-dlp
//! (`ytdlp::download_media`). The orchestrator talks only to the [`Fetcher`]
//! trait, which is also the seam tests mock.

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::download::classify::FileKind;
use crate::download::progress::ProgressEvent;
use crate::download::ytdlp;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;
use url::Url;

/// One schedulable unit of a batch: an accepted URL plus everything the
/// fetch strategies need to place and report it.
#[derive(Debug, Clone)]
pub struct FetchItem {
    /// Validated source URL
    pub url: Url,
    /// 1-based position in the batch (for progress display)
    pub index: usize,
    /// Number of items in the batch
    pub total: usize,
    /// Sanitized local filename; may be empty when the URL path has no
    /// usable final segment
    pub filename: String,
    /// Destination directory for this batch
    pub dest_dir: PathBuf,
    /// Classification decided before scheduling
    pub kind: FileKind,
    /// Vertical-resolution ceiling for video items (None = best available)
    pub max_height: Option<u32>,
    /// Per-file size cap in bytes for document fetches
    pub max_file_size: Option<u64>,
}

/// Trait for single-item fetch implementations.
///
/// `fetch` retrieves one item and returns its kind on success. Progress is
/// emitted through the channel fire-and-forget; implementations must never
/// block on delivery. Everything an implementation can throw is converted to
/// a failed outcome at the orchestrator boundary.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, item: &FetchItem, progress_tx: mpsc::UnboundedSender<ProgressEvent>)
        -> AppResult<FileKind>;
}

/// The real fetcher: direct HTTP for documents, yt-dlp for media.
pub struct MediaFetcher {
    client: Client,
}

impl Default for MediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaFetcher {
    pub fn new() -> Self {
        #[allow(clippy::expect_used)]
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; zagruzka/0.3)")
            .timeout(std::time::Duration::from_secs(config::download::HTTP_TIMEOUT_SECS))
            .connect_timeout(std::time::Duration::from_secs(config::download::HTTP_CONNECT_TIMEOUT_SECS))
            .build()
            .expect("HTTP client build failed: user_agent + timeout config should always succeed");

        Self { client }
    }

    /// Document strategy: stream the body to `<name>.part`, then rename.
    ///
    /// The rename makes the publish atomic — a crashed or size-capped fetch
    /// leaves at most a `.part` file, never a truncated final one.
    async fn fetch_document(&self, item: &FetchItem) -> AppResult<()> {
        log::info!("📥 HTTP document download: {}", item.url);

        let response = self.client.get(item.url.as_str()).send().await?;
        if !response.status().is_success() {
            return Err(AppError::HttpStatus(response.status()));
        }

        let name = if item.filename.is_empty() {
            format!("document-{}", item.index)
        } else {
            item.filename.clone()
        };
        let final_path = item.dest_dir.join(&name);
        let part_path = item.dest_dir.join(format!("{}.part", name));

        let mut file = std::fs::File::create(&part_path)?;
        let mut downloaded: u64 = 0;

        let mut stream = response.bytes_stream();
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| AppError::Transfer(format!("error reading body: {}", e)))?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;

            if let Some(max_size) = item.max_file_size {
                if downloaded > max_size {
                    drop(file);
                    let _ = std::fs::remove_file(&part_path);
                    return Err(AppError::Validation(format!(
                        "file exceeds maximum size: {} bytes > {} bytes",
                        downloaded, max_size
                    )));
                }
            }
        }

        file.flush()?;
        drop(file);
        std::fs::rename(&part_path, &final_path)?;

        log::info!(
            "✅ Document saved: {} ({:.2} MB)",
            final_path.display(),
            downloaded as f64 / (1024.0 * 1024.0)
        );
        Ok(())
    }
}

#[async_trait]
impl Fetcher for MediaFetcher {
    async fn fetch(
        &self,
        item: &FetchItem,
        progress_tx: mpsc::UnboundedSender<ProgressEvent>,
    ) -> AppResult<FileKind> {
        match item.kind {
            FileKind::Document => {
                self.fetch_document(item).await?;
                Ok(FileKind::Document)
            }
            kind => {
                ytdlp::download_media(item, progress_tx).await?;
                Ok(kind)
            }
        }
    }
}
