use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::coordinator::{BatchReport, Coordinator};
use crate::error::{Error, RequestError, Result};
use crate::fetcher::Fetcher;
use crate::store::Store;

/// Body of `/getImagesByUrl`.
#[derive(Debug, Deserialize, Serialize)]
pub struct DownloadRequest {
    #[serde(rename = "UrlList", alias = "urlList")]
    pub url_list: Vec<String>,
}

/// Envelope for every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<BatchReport>,
}

impl ApiResponse {
    fn success(message: &str) -> Self {
        Self {
            kind: "success".to_string(),
            message: message.to_string(),
            report: None,
        }
    }

    fn error(message: String) -> Self {
        Self {
            kind: "error".to_string(),
            message,
            report: None,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(self.to_string())),
        )
            .into_response()
    }
}

async fn health_check() -> Json<ApiResponse> {
    Json(ApiResponse::success("The application is up!"))
}

/// The body is parsed by hand so a missing or wrong content type is not required.
async fn download<F: Fetcher, S: Store>(
    State(coordinator): State<Arc<Coordinator<F, S>>>,
    body: Bytes,
) -> std::result::Result<Json<ApiResponse>, RequestError> {
    let request: DownloadRequest = serde_json::from_slice(&body).map_err(|err| {
        warn!(error = %err, "rejecting malformed download request");
        RequestError::from(err)
    })?;

    let result = coordinator.fetch_all(request.url_list).await;

    let mut response = ApiResponse::success("All files have been downloaded");
    response.report = Some(result.report());
    Ok(Json(response))
}

pub fn build_app<F: Fetcher, S: Store>(coordinator: Arc<Coordinator<F, S>>) -> Router {
    Router::new()
        .route("/health-check", get(health_check))
        .route(
            "/getImagesByUrl",
            get(download::<F, S>).post(download::<F, S>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(coordinator)
}

/// Serve `app` until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, app: Router, shutdown: CancellationToken) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|err| Error::Serve(err.to_string()))
}

pub async fn startup(config: Config, address: String, port: u16) -> Result<()> {
    let coordinator = Arc::new(config.build_coordinator().await?);
    let app = build_app(coordinator);

    let addr = format!("{}:{}", address, port);
    let listener = TcpListener::bind(&addr).await?;

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
        }
        on_signal.cancel();
    });

    info!("Listening on http://{}", addr);
    serve(listener, app, shutdown).await
}
