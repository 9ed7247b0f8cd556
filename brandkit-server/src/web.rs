//! JSON API for the wizard front end.
//!
//! The conversation endpoints drive the stage machine one reply at a time.
//! `/generate_logo` runs the image pipeline synchronously within the
//! request. Generated files are served back through `/download_logo` (as an
//! attachment) and under `/static` for inline previews.

use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use brandkit_core::prompt::logo_prompt;
use brandkit_core::{BrandDetails, ConversationError, Reply, Started};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::server::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (
        status,
        Json(serde_json::json!({ "error": message.to_string() })),
    )
}

/// Build the axum router.
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    Router::new()
        .route("/health", get(health))
        .route("/start_conversation", post(start_conversation))
        .route("/process_response", post(process_response))
        .route("/generate_logo", post(generate_logo))
        .route("/download_logo/{*path}", get(download_logo))
        .nest_service("/static", ServeDir::new(&static_dir))
        .fallback_service(ServeDir::new(&static_dir))
        .layer(axum::middleware::from_fn(security_headers))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Unwrap a JSON body, turning axum's plain-text rejection into `{error}`.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(api_error(StatusCode::BAD_REQUEST, rejection.body_text()))
        }
    }
}

// ── Request/response types ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ProcessRequest {
    #[serde(default)]
    conversation_id: String,
    #[serde(default)]
    user_response: String,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    brand_details: Option<BrandDetails>,
    #[serde(default)]
    conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    logo_path: String,
    prompt_used: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    sessions: usize,
    uptime_secs: u64,
}

// ── Handlers ───────────────────────────────────────────────────────────

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.conversation.sessions().len(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

async fn start_conversation(State(state): State<Arc<AppState>>) -> Json<Started> {
    Json(state.conversation.start())
}

async fn process_response(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<Reply>, ApiError> {
    let req = json_body(body)?;
    match state
        .conversation
        .respond(&req.conversation_id, &req.user_response)
        .await
    {
        Ok(reply) => Ok(Json(reply)),
        Err(e @ ConversationError::NotFound) => {
            tracing::debug!(conversation = %req.conversation_id, "Unknown conversation");
            Err(api_error(StatusCode::NOT_FOUND, e))
        }
        Err(e @ ConversationError::InvalidSelection { .. }) => {
            Err(api_error(StatusCode::BAD_REQUEST, e))
        }
    }
}

async fn generate_logo(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let req = json_body(body)?;
    let details = match (req.brand_details, req.conversation_id) {
        (Some(details), _) => details,
        (None, Some(id)) => state
            .conversation
            .brand_details(&id)
            .await
            .ok_or_else(|| api_error(StatusCode::NOT_FOUND, ConversationError::NotFound))?,
        (None, None) => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "brand_details or conversation_id required",
            ));
        }
    };

    let prompt = logo_prompt(&details);
    tracing::info!(%prompt, brand = ?details.brand_name, "Generating logo");

    match state
        .logos
        .generate(&prompt, details.brand_name.as_deref())
        .await
    {
        Ok(path) => Ok(Json(GenerateResponse {
            logo_path: public_logo_path(&state.config.static_dir, &path),
            prompt_used: prompt,
        })),
        Err(e) => {
            tracing::error!(error = ?e, %prompt, "Logo generation failed: {e}");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

/// Path the front end can load a logo from: under `static/` when the logo
/// directory sits inside the static root, otherwise via `download_logo/`.
fn public_logo_path(static_dir: &FsPath, file: &FsPath) -> String {
    if let Ok(rel) = file.strip_prefix(static_dir) {
        let parts: Vec<_> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect();
        return format!("static/{}", parts.join("/"));
    }
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("download_logo/{name}")
}

/// Map a requested download path onto a file inside the logo directory.
///
/// Accepts either a bare file name or the path returned by
/// `/generate_logo`. Only the final component is used.
fn resolve_logo_path(logo_dir: &FsPath, requested: &str) -> Option<PathBuf> {
    let requested = FsPath::new(requested);
    if !requested
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }
    requested.file_name().map(|name| logo_dir.join(name))
}

async fn download_logo(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let file = resolve_logo_path(state.logos.logo_dir(), &path)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Invalid logo path"))?;

    let bytes = tokio::fs::read(&file).await.map_err(|e| {
        tracing::warn!(path = %file.display(), "Download failed: {e}");
        if e.kind() == std::io::ErrorKind::NotFound {
            api_error(StatusCode::NOT_FOUND, "Logo not found")
        } else {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    })?;

    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = if name.ends_with(".png") {
        "image/png"
    } else {
        "application/octet-stream"
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Security headers middleware.
async fn security_headers(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    resp
}
