//! End-to-end build against a local image server and filesystem store.

use std::sync::Arc;
use std::time::Duration;

use instafolio::error::AppError;
use instafolio::models::Config;
use instafolio::pipeline::run_build;
use instafolio::services::HttpUploader;
use instafolio::storage::LocalObjectStore;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve `jpeg` for every path except ones containing `missing` (404).
async fn image_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let response = if request.lines().next().unwrap_or("").contains("missing") {
                    "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                } else {
                    "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: 4\r\nConnection: close\r\n\r\njpeg"
                };
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{addr}")
}

fn uploader(store_dir: &std::path::Path) -> HttpUploader {
    let store = LocalObjectStore::with_public_base(store_dir, "https://media.test");
    HttpUploader::new(
        reqwest::Client::new(),
        Arc::new(store),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn test_builds_page_with_mirrored_and_fallback_images() {
    let base = image_server().await;
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("scraped_data_20250301120000.json");
    std::fs::write(
        &input,
        format!(
            r#"[
                {{"id":"1","shortCode":"s1","images":["{base}/a.jpg"],"ownerUsername":"nightowl",
                  "timestamp":"2025-03-01T22:00:00.000Z","caption":"Opening night"}},
                {{"id":"2","shortCode":"s1","images":["{base}/missing.jpg"]}},
                {{"id":"3","shortCode":"s3","caption":"Text only"}}
            ]"#
        ),
    )
    .unwrap();
    let store_dir = tmp.path().join("bucket");
    let output = tmp.path().join("static").join("cms_20250301120000.html");

    let summary = run_build(&Config::default(), &input, &output, &uploader(&store_dir))
        .await
        .unwrap();

    assert_eq!(summary.raw_count, 3);
    assert_eq!(summary.post_count, 2);
    assert_eq!(summary.child_count, 1);
    assert_eq!(summary.report.uploaded, 1);
    assert_eq!(summary.report.missing_source, 1);
    assert_eq!(summary.report.failures.len(), 1);
    assert_eq!(summary.report.failures[0].destination_key, "images/2.jpg");

    assert_eq!(std::fs::read(store_dir.join("images/1.jpg")).unwrap(), b"jpeg");
    assert!(!store_dir.join("images/2.jpg").exists());

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.contains("https://media.test/images/1.jpg"));
    assert!(html.contains(&format!("{base}/missing.jpg")));
    assert!(html.contains("Opening night"));
    assert!(html.contains(r#"class="image-placeholder""#));
}

#[tokio::test]
async fn test_malformed_input_fails_without_output() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("scraped.json");
    std::fs::write(&input, "[{\"id\": ").unwrap();
    let output = tmp.path().join("cms.html");

    let err = run_build(
        &Config::default(),
        &input,
        &output,
        &uploader(&tmp.path().join("bucket")),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Load { .. }));
    assert!(!output.exists());
}
