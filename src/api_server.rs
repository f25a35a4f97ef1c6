use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use anyhow::{Result, anyhow};
use chrono::Utc;
use log::{debug, error, info};
use tokio::net::TcpListener;

use crate::config::Config;
use crate::event::EventResponse;
use crate::parser::{EventExtractor, ExtractionContext, ExtractorSettings, create_extractor};

// API state that will be shared across handlers
pub struct ApiState {
    pub config: Config,
    pub extractor: Box<dyn EventExtractor + Send + Sync>,
}

impl ApiState {
    pub fn new(config: Config) -> Result<Self> {
        let extractor = create_extractor("heuristic", ExtractorSettings::from(&config))?;
        Ok(Self { config, extractor })
    }
}

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: Option<String>,
    pub timezone: Option<String>,
    pub locale: Option<String>,
    /// RFC 3339 reference time; the server clock is used when absent.
    pub now: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

type ApiError = (StatusCode, Json<ApiResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse { success: false, message: message.into() }))
}

async fn parse_handler(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<EventResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!("Rejected request body: {}", rejection.body_text());
        api_error(StatusCode::BAD_REQUEST, format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let text = match request.text.as_deref() {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(api_error(StatusCode::BAD_REQUEST, "Field 'text' is required")),
    };

    let defaults = &state.config.extraction;
    let timezone = request.timezone.as_deref().unwrap_or(&defaults.default_timezone);
    let locale = request.locale.as_deref().unwrap_or(&defaults.default_locale);
    let now = match request.now.as_deref() {
        Some(now) => ExtractionContext::parse_now(now)
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?,
        None => Utc::now(),
    };
    let ctx = ExtractionContext::new(now, timezone, locale)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    info!("Parsing {} characters (tz={}, locale={})", text.chars().count(), timezone, locale);

    match state.extractor.extract_event(text, &ctx).await {
        Ok(event) => {
            info!("Extracted '{}' via {}", event.title, event.extraction_path);
            Ok(Json(EventResponse::from(&event)))
        }
        Err(e) if e.is_input_error() => Err(api_error(StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => {
            error!("Extraction failed: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to parse event: {}", e),
            ))
        }
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "snapcal",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    // Browser extensions call the API directly
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/parse", post(parse_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_api_server(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(ApiState::new(config)?);
    let app = create_router(state);

    info!("API server starting on http://{}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow!("Failed to bind to address {}: {}", addr, e))?;

    info!("API server successfully bound to {}. Waiting for connections...", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow!("Failed to start API server: {}", e))?;

    Ok(())
}
