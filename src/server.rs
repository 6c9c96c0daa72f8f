//! HTTP front-end: serves the browser page and the JSON API it calls.
//!
//! Each `/api/convert` call drives its own [`ConversionController`]; the
//! translation client is shared between requests.

use crate::config::Config;
use crate::controller::ConversionController;
use crate::error::ConversionError;
use crate::languages::LanguageCatalog;
use crate::security::is_authorized;
use crate::translation::TranslationService;
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: Arc<TranslationService>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let service = TranslationService::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            service: Arc::new(service),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub languages: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConvertBody {
    #[serde(default)]
    pub source_language: String,
    #[serde(default)]
    pub target_language: String,
    #[serde(default)]
    pub source_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub converted_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/languages", get(list_languages))
        .route("/convert", post(convert_code))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to `0.0.0.0:<port>` and serve until the process stops.
pub async fn serve(config: Config) -> Result<()> {
    let port = config.port;
    let state = AppState::new(config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("✓ Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "OK"
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    if !is_authorized(state.config.api_key.as_deref(), presented) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Unauthorized".to_string(),
            }),
        )
            .into_response();
    }

    next.run(request).await
}

async fn list_languages(Query(query): Query<LanguageQuery>) -> Json<LanguagesResponse> {
    let languages = LanguageCatalog::get()
        .filter(&query.q)
        .into_iter()
        .map(str::to_string)
        .collect();

    Json(LanguagesResponse { languages })
}

async fn convert_code(
    State(state): State<AppState>,
    body: Result<Json<ConvertBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return (
                rejection.status(),
                Json(ErrorResponse {
                    error: rejection.body_text(),
                }),
            )
                .into_response();
        }
    };

    let catalog = LanguageCatalog::get();

    // Names outside the catalog count as "not selected".
    let mut controller = ConversionController::new();
    controller.set_source_language(catalog.resolve(&body.source_language).unwrap_or_default());
    controller.set_target_language(catalog.resolve(&body.target_language).unwrap_or_default());
    controller.set_source_code(body.source_code);

    match controller.convert(&state.service).await {
        Ok(result) => (
            StatusCode::OK,
            Json(ConvertResponse {
                converted_code: result.converted_code,
            }),
        )
            .into_response(),
        Err(e) => {
            let status = match e {
                ConversionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ConversionError::Busy => StatusCode::CONFLICT,
                ConversionError::Transport(_) | ConversionError::ResponseFormat(_) => {
                    StatusCode::BAD_GATEWAY
                }
            };
            (
                status,
                Json(ErrorResponse {
                    error: e.user_message(),
                }),
            )
                .into_response()
        }
    }
}
