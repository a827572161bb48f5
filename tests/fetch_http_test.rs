//! HTTP document-strategy tests against a local mock server.
//!
//! Covers the three outcomes of a direct byte fetch: a clean publish, an
//! error status, and a mid-stream size-cap abort. Nothing here touches
//! the network.

use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zagruzka::download::fetch::FetchItem;
use zagruzka::{run_batch, AppError, BatchRequest, Fetcher, FileKind, LogSink, MediaFetcher};

fn document_item(url: &str, dir: &std::path::Path, max_file_size: Option<u64>) -> FetchItem {
    let url = Url::parse(url).unwrap();
    FetchItem {
        kind: FileKind::Document,
        filename: "notes.pdf".to_string(),
        url,
        index: 1,
        total: 1,
        dest_dir: dir.to_path_buf(),
        max_height: None,
        max_file_size,
    }
}

#[tokio::test]
async fn document_download_publishes_final_file_only() {
    let server = MockServer::start().await;
    let body = b"%PDF-1.4 fake document body".to_vec();
    Mock::given(method("GET"))
        .and(path("/notes.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = MediaFetcher::new();
    let item = document_item(&format!("{}/notes.pdf", server.uri()), dir.path(), None);
    let (tx, _rx) = mpsc::unbounded_channel();

    let kind = fetcher.fetch(&item, tx).await.unwrap();

    assert_eq!(kind, FileKind::Document);
    assert_eq!(std::fs::read(dir.path().join("notes.pdf")).unwrap(), body);
    // The .part staging file must not outlive the publish
    assert!(!dir.path().join("notes.pdf.part").exists());
}

#[tokio::test]
async fn document_download_rejects_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = MediaFetcher::new();
    let item = document_item(&format!("{}/notes.pdf", server.uri()), dir.path(), None);
    let (tx, _rx) = mpsc::unbounded_channel();

    let err = fetcher.fetch(&item, tx).await.unwrap_err();

    assert!(
        matches!(err, AppError::HttpStatus(status) if status.as_u16() == 404),
        "got: {:?}",
        err
    );
    assert!(!dir.path().join("notes.pdf").exists());
}

#[tokio::test]
async fn document_download_aborts_over_size_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = MediaFetcher::new();
    let item = document_item(&format!("{}/notes.pdf", server.uri()), dir.path(), Some(1024));
    let (tx, _rx) = mpsc::unbounded_channel();

    let err = fetcher.fetch(&item, tx).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)), "got: {:?}", err);
    // Neither the final file nor the staging file may survive the abort
    assert!(!dir.path().join("notes.pdf").exists());
    assert!(!dir.path().join("notes.pdf.part").exists());
}

#[tokio::test]
async fn size_capped_document_is_a_failed_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut request = BatchRequest::new(vec![format!("{}/notes.pdf", server.uri())], dir.path());
    request.max_file_size = Some(1024);

    let summary = run_batch(request, Arc::new(LogSink)).await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.success, 0);
    assert_eq!(summary.documents, 0);
}
