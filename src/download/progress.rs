//! Progress events, bar rendering, and the reporter task.
//!
//! Fetch tasks emit [`ProgressEvent`]s into an unbounded channel and never
//! wait for delivery; a single reporter task drains the channel, throttles,
//! renders a status line and pushes it to the external [`ProgressSink`].
//! Sink failures are logged and swallowed — a broken status message must
//! never fail the download it describes. Updates from concurrent items race
//! on the shared sink and the most recent write wins.

use crate::core::config;
use crate::core::error::AppResult;
use crate::core::utils::format_eta;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Width of the rendered progress bar, in cells.
pub const PROGRESS_BAR_LENGTH: usize = 20;

/// Transient snapshot of one in-flight fetch. Consumed by the reporter and
/// discarded; never persisted.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// 1-based position of the item in the batch
    pub index: usize,
    /// Number of items in the batch
    pub total: usize,
    /// Human filename shown in the status line
    pub filename: String,
    /// Percent complete (0.0-100.0)
    pub percent: f64,
    /// Transfer rate in MB/s, when known
    pub speed_mbs: Option<f64>,
    /// Estimated time remaining in seconds, when known
    pub eta_seconds: Option<u64>,
}

impl ProgressEvent {
    /// Renders the status-message text for this event.
    ///
    /// # Example
    ///
    /// ```
    /// use zagruzka::download::progress::ProgressEvent;
    ///
    /// let event = ProgressEvent {
    ///     index: 2,
    ///     total: 5,
    ///     filename: "lecture-02.mp4".to_string(),
    ///     percent: 60.0,
    ///     speed_mbs: Some(2.3),
    ///     eta_seconds: Some(65),
    /// };
    /// let text = event.to_message();
    /// assert!(text.contains("2/5"));
    /// assert!(text.contains("60.0%"));
    /// ```
    pub fn to_message(&self) -> String {
        let mut s = String::with_capacity(self.filename.len() + 120);
        s.push_str(&format!("🔄 Downloading {}/{}\n", self.index, self.total));
        s.push_str(&format!("📦 {}\n", self.filename));
        if let Some(speed) = self.speed_mbs {
            s.push_str(&format!("🚀 Speed: {:.1} MB/s\n", speed));
        }
        if let Some(eta) = self.eta_seconds {
            s.push_str(&format!("⏳ ETA: {}\n", format_eta(eta)));
        }
        s.push_str(&render_progress_bar(self.percent));
        s
    }
}

/// Renders a fixed-width progress bar for a percentage.
///
/// Filled cells = floor(percent / 100 × bar length); out-of-range input is
/// clamped rather than rejected.
pub fn render_progress_bar(percent: f64) -> String {
    let clamped = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { 0.0 };
    let filled = ((clamped / 100.0) * PROGRESS_BAR_LENGTH as f64).floor() as usize;
    let empty = PROGRESS_BAR_LENGTH - filled;
    format!("[{}{}] {:.1}%", "█".repeat(filled), "░".repeat(empty), clamped)
}

/// External consumer of status lines (e.g. an editable chat message).
///
/// Called concurrently from the reporter on behalf of multiple fetch tasks;
/// implementations must tolerate concurrent calls or serialize internally.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn update(&self, text: String) -> AppResult<()>;
}

/// Sink that just logs status lines. Handy default for headless runs.
pub struct LogSink;

#[async_trait]
impl ProgressSink for LogSink {
    async fn update(&self, text: String) -> AppResult<()> {
        log::info!("{}", text.replace('\n', " | "));
        Ok(())
    }
}

/// Spawns the reporter task for one batch run.
///
/// Drains `rx` until every sender is dropped, delivering at most one update
/// per [`config::progress::MIN_UPDATE_INTERVAL_MS`] (completed items always
/// go through). Delivery failures are logged and dropped. The returned
/// handle resolves once the channel is closed and drained.
pub fn spawn_reporter(
    mut rx: mpsc::UnboundedReceiver<ProgressEvent>,
    sink: Arc<dyn ProgressSink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let min_interval = config::progress::min_update_interval();
        let mut last_sent: Option<Instant> = None;

        while let Some(event) = rx.recv().await {
            let due = last_sent.is_none_or(|t| t.elapsed() >= min_interval) || event.percent >= 100.0;
            if !due {
                continue;
            }
            last_sent = Some(Instant::now());

            if let Err(e) = sink.update(event.to_message()).await {
                log::warn!("Progress update failed: {}", e);
            }
        }
    })
}
