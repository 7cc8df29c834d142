//! JSON-over-HTTP search API.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use juris::{JurisError, Retriever, SearchRequest, SearchResponse};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::cli::ServeCommand;
use crate::context::{self, CliConfig};

#[derive(Clone)]
struct AppState {
    retriever: Arc<Retriever>,
}

#[derive(Debug, Deserialize)]
struct ClassifyRequest {
    query: String,
}

/// Error body returned by every endpoint.
struct ApiError(JurisError);

impl From<JurisError> for ApiError {
    fn from(e: JurisError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!("request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

fn status_for(error: &JurisError) -> StatusCode {
    match error {
        JurisError::InvalidArgument(_) | JurisError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
        JurisError::EmbeddingUnavailable(_) | JurisError::EmbeddingTimeout(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let response = state.retriever.search(request).await?;
    Ok(Json(response))
}

async fn classify(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> impl IntoResponse {
    Json(state.retriever.classify(&request.query))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": juris::VERSION,
        "snapshot": state.retriever.stats(),
    }))
}

fn router(retriever: Arc<Retriever>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/search", post(search))
        .route("/classify", post(classify))
        .with_state(AppState { retriever })
}

/// Build the index and serve it until interrupted.
pub async fn run(cmd: ServeCommand, config: &CliConfig) -> Result<()> {
    let retriever =
        Arc::new(context::open_retriever(config, &cmd.corpus, cmd.cache.as_deref()).await?);
    let stats = retriever.stats();
    info!(
        "serving snapshot {} ({} chunks from {} documents)",
        stats.id, stats.documents, stats.sources
    );

    let listener = TcpListener::bind(cmd.addr)
        .await
        .with_context(|| format!("Failed to bind {}", cmd.addr))?;
    println!("Listening on http://{}", cmd.addr);

    axum::serve(listener, router(retriever))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for shutdown signal: {e}");
            }
            info!("shutting down");
        })
        .await
        .context("HTTP server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_validation_errors_are_bad_requests() {
        let err = JurisError::invalid_argument("top_k must be between 1 and 50, got 0");
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_other_errors_map_to_server_statuses() {
        assert_eq!(
            status_for(&JurisError::EmbeddingTimeout(Duration::from_secs(3))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&JurisError::internal("broken")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_request_body_defaults() {
        let request: SearchRequest = serde_json::from_str(r#"{"query": "Article 329"}"#).unwrap();
        assert_eq!(request.top_k, juris::DEFAULT_TOP_K);
        assert!(request.filter.is_none());
    }
}
