use axum::{Router, http::StatusCode, routing::get};
use imgdump::coordinator::ArtifactNamer;
use imgdump::server::{build_app, serve};
use imgdump::{BatchStatus, Config, Coordinator, FsStore, HttpFetcher};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

async fn start_image_host() -> SocketAddr {
    let app = Router::new()
        .route("/a.png", get(|| async { PNG_MAGIC.to_vec() }))
        .route("/b.png", get(|| async { b"second image".to_vec() }))
        .route("/gone.png", get(|| async { StatusCode::GONE }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn files_in(dir: &std::path::Path) -> HashSet<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[tokio::test]
async fn test_mixed_batch_writes_only_successes() {
    let host = start_image_host().await;
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        output_dir: dir.path().to_path_buf(),
        timeout_secs: 5,
        ..Config::default()
    };
    let coordinator = config.build_coordinator().await.unwrap();

    let result = coordinator
        .fetch_all(vec![
            format!("http://{}/a.png", host),
            format!("http://{}/gone.png", host),
            format!("http://{}/b.png", host),
        ])
        .await;

    assert_eq!(result.status(), BatchStatus::PartialFailure);
    assert_eq!(result.succeeded(), 2);
    assert_eq!(result.failed(), 1);

    let written = files_in(dir.path());
    let reported: HashSet<String> = result.artifacts().iter().map(|s| s.to_string()).collect();
    assert_eq!(written, reported);

    let first = result.outcomes()[0].artifact().unwrap();
    assert_eq!(std::fs::read(dir.path().join(first)).unwrap(), PNG_MAGIC);
}

#[tokio::test]
async fn test_duplicate_urls_on_disk() {
    let host = start_image_host().await;
    let dir = tempfile::tempdir().unwrap();
    let coordinator = Coordinator::new(
        HttpFetcher::new(Duration::from_secs(5), Duration::from_secs(1)).unwrap(),
        FsStore::open(dir.path()).await.unwrap(),
        ArtifactNamer::new("imageDump", "png"),
    )
    .with_max_concurrency(Some(2));

    let url = format!("http://{}/a.png", host);
    let result = coordinator
        .fetch_all(vec![url.clone(), url.clone(), url])
        .await;

    assert_eq!(result.status(), BatchStatus::AllSucceeded);
    assert_eq!(files_in(dir.path()).len(), 3);
}

#[tokio::test]
async fn test_http_service_end_to_end() {
    let host = start_image_host().await;
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        output_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    let app = build_app(Arc::new(config.build_coordinator().await.unwrap()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let service = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(serve(listener, app, shutdown.clone()));

    let client = reqwest::Client::new();
    let health: serde_json::Value = client
        .get(format!("http://{}/health-check", service))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["message"], "The application is up!");

    // The route is a GET carrying a JSON body.
    let response = client
        .get(format!("http://{}/getImagesByUrl", service))
        .json(&serde_json::json!({
            "UrlList": [
                format!("http://{}/a.png", host),
                format!("http://{}/b.png", host),
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["type"], "success");
    assert_eq!(body["message"], "All files have been downloaded");
    assert_eq!(body["report"]["status"], "all-succeeded");
    assert_eq!(files_in(dir.path()).len(), 2);

    let rejected = client
        .get(format!("http://{}/getImagesByUrl", service))
        .body("UrlList=nope")
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(files_in(dir.path()).len(), 2);

    drop(client);
    shutdown.cancel();
    server.await.unwrap().unwrap();
}
