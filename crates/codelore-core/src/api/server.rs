//! HTTP API server — axum router over TCP.
//!
//! The editor extension speaks localhost HTTP to these routes. CORS is
//! wide open: requests arrive from webview origins that vary per editor.
//! Route handlers own input validation and the mapping from
//! [`AnalyzeError`] to status codes; everything below them returns the
//! canonical result shape.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use codelore_config::AppConfig;

use super::types::*;
use crate::analyze::{AnalyzeError, AnalyzeRequest, analyze_file};
use crate::llm::{self, AnalysisResult, ProviderError};

/// Shared state accessible to all route handlers.
pub struct ApiState {
    pub config: AppConfig,
}

/// Build the axum router with all API routes.
pub fn router(state: Arc<ApiState>) -> axum::Router {
    axum::Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/context/file", post(handle_analyze_file))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the API server on the configured address.
///
/// Runs until ctrl-c.
pub async fn serve(config: AppConfig) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind((
        config.server.listen_addr.as_str(),
        config.server.listen_port,
    ))
    .await?;
    info!(
        addr = %config.server.listen_addr,
        port = config.server.listen_port,
        "API server listening"
    );

    let state = Arc::new(ApiState { config });
    let app = router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("API server shutting down");
        })
        .await?;

    Ok(())
}

// ── Route handlers ──────────────────────────────────────────────────────

async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "healthy".to_string(),
        service: "Codelore API".to_string(),
        version: crate::build_info::VERSION.to_string(),
    })
}

async fn handle_health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let available_providers = llm::available_providers(&state.config.llm).await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::build_info::VERSION.to_string(),
        git_hash: crate::build_info::GIT_HASH.to_string(),
        build_profile: crate::build_info::BUILD_PROFILE.to_string(),
        llm_provider: state.config.llm.provider.as_str().to_string(),
        available_providers,
    })
}

async fn handle_analyze_file(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<AnalyzeFileRequest>,
) -> Result<Json<AnalysisResult>, (StatusCode, Json<ErrorResponse>)> {
    if req.file_path.is_empty() {
        return Err(bad_request("file_path must not be empty".to_string()));
    }
    if let Some(limit) = req.commit_limit {
        if !(1..=100).contains(&limit) {
            return Err(bad_request(format!(
                "commit_limit must be in 1..=100, got {limit}"
            )));
        }
    }

    let request = AnalyzeRequest {
        repo_path: req.repo_path,
        file_path: req.file_path,
        selected_code: req.selected_code,
        commit_limit: req.commit_limit,
        provider: req.llm_provider,
        model: req.llm_model,
    };

    match analyze_file(&state.config, &request).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            warn!(error = %e, file = %request.file_path, "analysis failed");
            Err(map_error(e))
        }
    }
}

fn bad_request(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
}

/// Map core errors to HTTP statuses: unreadable input is the client's
/// problem, a dead local server is 503, an upstream failure is 502.
fn map_error(e: AnalyzeError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        AnalyzeError::FileNotFound(_) | AnalyzeError::Source(_) => StatusCode::BAD_REQUEST,
        AnalyzeError::ProviderUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AnalyzeError::Provider(provider_err) => match provider_err {
            ProviderError::Unreachable { .. } | ProviderError::Timeout { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ProviderError::Upstream { .. } | ProviderError::Network(_) => StatusCode::BAD_GATEWAY,
        },
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}
