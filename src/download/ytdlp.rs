//! Video strategy: yt-dlp subprocess invocation and progress-line parsing.
//!
//! yt-dlp does its own blocking I/O, format negotiation and internal
//! retries, so each invocation runs under `spawn_blocking` — it must never
//! occupy the scheduler threads that accept sibling gate acquisitions.
//! Progress lines on stdout/stderr are parsed into [`ProgressEvent`]s and
//! sent fire-and-forget; a dead receiver never fails the download.

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::download::fetch::FetchItem;
use crate::download::progress::ProgressEvent;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How many characters of stderr survive into the extraction error.
const STDERR_TAIL_CHARS: usize = 500;

/// Progress fields parsed from one yt-dlp output line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawProgress {
    pub percent: f64,
    pub speed_mbs: Option<f64>,
    pub eta_seconds: Option<u64>,
}

/// Item fields the blocking subprocess loop needs for event construction.
#[derive(Debug, Clone)]
struct ItemContext {
    index: usize,
    total: usize,
    filename: String,
}

/// Builds the yt-dlp format selector for a resolution ceiling.
///
/// Picks the best video+audio (or combined) stream at or below the ceiling;
/// no ceiling means best available.
pub fn build_format_selector(max_height: Option<u32>) -> String {
    match max_height {
        Some(h) => format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]"),
        None => "bestvideo+bestaudio/best".to_string(),
    }
}

/// Downloads one media item via yt-dlp.
///
/// The output template is `<dest>/<sanitized-filename>`, falling back to
/// yt-dlp's own `%(title)s.%(ext)s` naming when the URL carried no usable
/// filename. Fails with [`AppError::Extraction`] carrying the stderr tail.
pub async fn download_media(
    item: &FetchItem,
    progress_tx: mpsc::UnboundedSender<ProgressEvent>,
) -> AppResult<()> {
    let ytdl_bin = config::YTDL_BIN.clone();
    let url = item.url.to_string();
    let format_arg = build_format_selector(item.max_height);
    let output_template = if item.filename.is_empty() {
        item.dest_dir.join("%(title)s.%(ext)s")
    } else {
        item.dest_dir.join(&item.filename)
    }
    .to_string_lossy()
    .into_owned();
    let ctx = ItemContext {
        index: item.index,
        total: item.total,
        filename: if item.filename.is_empty() {
            url.clone()
        } else {
            item.filename.clone()
        },
    };

    log::info!("🎬 yt-dlp download {}/{}: {}", item.index, item.total, item.url);

    let handle = tokio::task::spawn_blocking(move || {
        let args = [
            "-o",
            &output_template,
            "--newline",
            "--no-playlist",
            "--force-overwrites",
            "-f",
            &format_arg,
            &url,
        ];
        run_ytdlp_with_progress(&ytdl_bin, &args, &progress_tx, &ctx)
    });

    handle
        .await
        .map_err(|e| AppError::Extraction(format!("task join error: {}", e)))?
}

/// Runs yt-dlp with stdout/stderr capture, forwarding progress and keeping a
/// stderr tail for error reporting. Kills the process on timeout.
fn run_ytdlp_with_progress(
    ytdl_bin: &str,
    args: &[&str],
    progress_tx: &mpsc::UnboundedSender<ProgressEvent>,
    ctx: &ItemContext,
) -> AppResult<()> {
    let mut child = Command::new(ytdl_bin)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| AppError::Extraction(format!("failed to spawn {}: {}", ytdl_bin, e)))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stderr_lines = Arc::new(std::sync::Mutex::new(VecDeque::<String>::new()));
    let stderr_lines_clone = Arc::clone(&stderr_lines);
    let tx_clone = progress_tx.clone();
    let ctx_clone = ctx.clone();

    // Read stderr in a separate thread; yt-dlp mixes progress into both streams
    let stderr_reader = stderr.map(|stderr_stream| {
        std::thread::spawn(move || {
            let reader = BufReader::new(stderr_stream);
            for line in reader.lines().map_while(Result::ok) {
                log::debug!("yt-dlp stderr: {}", line);
                if let Ok(mut lines) = stderr_lines_clone.lock() {
                    lines.push_back(line.clone());
                    if lines.len() > 200 {
                        lines.pop_front();
                    }
                }
                if let Some(raw) = parse_progress(&line) {
                    let _ = tx_clone.send(to_event(&ctx_clone, raw));
                }
            }
        })
    });

    // Read stdout on the current (blocking-pool) thread
    if let Some(stdout_stream) = stdout {
        let reader = BufReader::new(stdout_stream);
        for line in reader.lines().map_while(Result::ok) {
            log::debug!("yt-dlp stdout: {}", line);
            if let Some(raw) = parse_progress(&line) {
                let _ = progress_tx.send(to_event(ctx, raw));
            }
        }
    }

    // Wait for the process with a timeout
    let ytdlp_timeout = config::download::ytdlp_timeout();
    let deadline = std::time::Instant::now() + ytdlp_timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(s)) => break Some(s),
            Ok(None) => {
                if std::time::Instant::now() >= deadline {
                    log::error!("yt-dlp process timed out after {}s, killing", ytdlp_timeout.as_secs());
                    let _ = child.kill();
                    let _ = child.wait(); // Reap the zombie
                    break None;
                }
                std::thread::sleep(Duration::from_millis(500));
            }
            Err(e) => return Err(AppError::Io(e)),
        }
    };

    // The pipe is closed now; wait for the reader to push the last lines
    // before the tail is read, or a fast-failing process reports nothing.
    if let Some(handle) = stderr_reader {
        let _ = handle.join();
    }

    let status = match status {
        Some(s) => s,
        None => {
            return Err(AppError::Extraction(format!(
                "yt-dlp process timed out after {}s",
                ytdlp_timeout.as_secs()
            )))
        }
    };

    if status.success() {
        return Ok(());
    }

    let stderr_text = stderr_lines
        .lock()
        .map(|mut lines| lines.make_contiguous().join("\n"))
        .unwrap_or_default();
    Err(AppError::Extraction(format!(
        "yt-dlp exited with {}: {}",
        status,
        stderr_tail(&stderr_text)
    )))
}

/// Last [`STDERR_TAIL_CHARS`] characters of the captured stderr, cut on a
/// character boundary so non-ASCII output never splits mid-character.
fn stderr_tail(text: &str) -> &str {
    match text.char_indices().rev().nth(STDERR_TAIL_CHARS - 1) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

fn to_event(ctx: &ItemContext, raw: RawProgress) -> ProgressEvent {
    ProgressEvent {
        index: ctx.index,
        total: ctx.total,
        filename: ctx.filename.clone(),
        percent: raw.percent,
        speed_mbs: raw.speed_mbs,
        eta_seconds: raw.eta_seconds,
    }
}

/// Parses progress from a yt-dlp output line.
/// Example: `[download]  45.2% of 10.00MiB at 500.00KiB/s ETA 00:10`
pub fn parse_progress(line: &str) -> Option<RawProgress> {
    if !line.contains("[download]") || !line.contains('%') {
        // Может быть другое сообщение, например "[download] Destination: ..."
        return None;
    }

    let mut percent = None;
    let mut speed_mbs = None;
    let mut eta_seconds = None;

    let parts: Vec<&str> = line.split_whitespace().collect();
    for (i, part) in parts.iter().enumerate() {
        if let Some(p) = part.strip_suffix('%').and_then(|v| v.parse::<f64>().ok()) {
            // Обрезаем в разумные границы, чтобы не прыгать на 100% при мусорных данных
            percent = Some(p.clamp(0.0, 100.0));
        }

        // Скорость: "at 500.00KiB/s" или "at 2.3MiB/s"
        if *part == "at" && i + 1 < parts.len() {
            if let Some(speed) = parse_size(parts[i + 1].trim_end_matches("/s")) {
                speed_mbs = Some(speed / (1024.0 * 1024.0));
            }
        }

        // ETA: "ETA 00:10" или "ETA 1:02:03"
        if *part == "ETA" && i + 1 < parts.len() {
            eta_seconds = parse_eta(parts[i + 1]);
        }
    }

    percent.map(|p| RawProgress {
        percent: p,
        speed_mbs,
        eta_seconds,
    })
}

/// Parses a size like "10.00MiB", "500.00KiB" or "1.5GiB" into bytes.
fn parse_size(s: &str) -> Option<f64> {
    let s = s.trim_start_matches('~');
    let (multiplier, digits) = if let Some(v) = s.strip_suffix("GiB") {
        (1024.0 * 1024.0 * 1024.0, v)
    } else if let Some(v) = s.strip_suffix("MiB") {
        (1024.0 * 1024.0, v)
    } else if let Some(v) = s.strip_suffix("KiB") {
        (1024.0, v)
    } else if let Some(v) = s.strip_suffix('B') {
        (1.0, v)
    } else {
        return None;
    };
    digits.parse::<f64>().ok().map(|v| v * multiplier)
}

/// Parses an ETA like "00:10", "1:23" or "1:02:03" into seconds.
fn parse_eta(s: &str) -> Option<u64> {
    let fields: Vec<&str> = s.split(':').collect();
    if fields.is_empty() || fields.len() > 3 {
        return None;
    }
    let mut seconds: u64 = 0;
    for field in &fields {
        seconds = seconds * 60 + field.parse::<u64>().ok()?;
    }
    Some(seconds)
}
