/*!
 * HTTP surface of the service.
 *
 * Routes, the CORS policy and the mapping from `AppError` to status codes.
 * The router is built explicitly from a shared `TranscriptService` and the
 * configured `CorsSettings`.
 */

use std::sync::Arc;
use anyhow::{Context, Result};
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{info, warn};
use serde_json::json;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::app_config::{CorsSettings, ServerConfig};
use crate::errors::AppError;
use crate::transcript_service::{FormattedTranscript, TranscriptResponse, TranscriptService};

type SharedService = Arc<TranscriptService>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Build the CORS layer for the given policy
///
/// With credentials enabled the `*` wildcards are not allowed, so methods and
/// headers mirror the preflight request instead.
pub fn cors_layer(settings: &CorsSettings) -> CorsLayer {
    if settings.allows_any_origin() {
        if settings.allow_credentials {
            warn!("Ignoring allow_credentials: not permitted with a wildcard origin");
        }
        return CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = settings.allowed_origins.iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Skipping invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_origin(AllowOrigin::list(origins));

    if settings.allow_credentials {
        layer
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        layer
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Build the application router
pub fn build_router(service: SharedService, cors: &CorsSettings) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/transcript/*video", get(get_transcript))
        .route("/transcript-formatted/*video", get(get_transcript_formatted))
        .layer(cors_layer(cors))
        .with_state(service)
}

/// Bind the listener and serve until Ctrl-C
pub async fn serve(server: &ServerConfig, cors: &CorsSettings, service: SharedService) -> Result<()> {
    let address = server.bind_address();
    let listener = tokio::net::TcpListener::bind(address.as_str())
        .await
        .context(format!("Failed to bind {}", address))?;
    let local_addr = listener.local_addr()
        .context("Failed to read local listener address")?;

    info!("Listening on http://{}", local_addr);

    axum::serve(listener, build_router(service, cors))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}

/// Put back a query string the router split off the wildcard segment, so
/// `watch?v=...` URLs survive the trip
fn reassemble_input(video: String, query: Option<String>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{}?{}", video, query),
        _ => video,
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "greeting": "Hello, World!",
        "message": "Welcome to captionmerge!",
    }))
}

async fn get_transcript(
    State(service): State<SharedService>,
    Path(video): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<TranscriptResponse>, AppError> {
    let input = reassemble_input(video, query);
    info!("GET /transcript/{}", input);
    Ok(Json(service.transcript(&input).await?))
}

async fn get_transcript_formatted(
    State(service): State<SharedService>,
    Path(video): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<FormattedTranscript>, AppError> {
    let input = reassemble_input(video, query);
    info!("GET /transcript-formatted/{}", input);
    Ok(Json(service.formatted(&input).await?))
}
