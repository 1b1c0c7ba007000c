//! HTTP surface.
//!
//! | Route              | Body                              | Success            |
//! |--------------------|-----------------------------------|--------------------|
//! | `POST /api/analyze`| `{url?, context?, mode?}`         | `StrategyResult`   |
//! | `POST /api/poster` | `{strategy, style?}`              | `image/png`        |
//! | `GET /health`      | none                              | `ok`               |
//!
//! Failures are `{"error": "<public message>"}` with the status from
//! [`StratosError::status_code`]. Internal detail goes to the log only.

use crate::analyze::{analyze_with, resolve_provider, StrategyRequest};
use crate::config::ServiceConfig;
use crate::error::StratosError;
use crate::output::StrategyResult;
use crate::pipeline::fetch::build_client;
use crate::pipeline::provider::GenerationProvider;
use crate::poster::{encode_png, poster_filename, render_poster, PosterStyle};
use axum::async_trait;
use axum::extract::{FromRequest, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Shared across handlers. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub client: reqwest::Client,
    pub provider: Arc<dyn GenerationProvider>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Result<Self, StratosError> {
        let client = build_client(&config.guard)
            .map_err(|e| StratosError::Internal(format!("HTTP client: {e}")))?;
        let provider = resolve_provider(&client, &config);
        Ok(Self {
            config: Arc::new(config),
            client,
            provider,
        })
    }
}

/// Body of `POST /api/poster`.
#[derive(Debug, Deserialize)]
pub struct PosterRequest {
    pub strategy: StrategyResult,
    #[serde(default)]
    pub style: PosterStyle,
}

/// `Json` that rejects with [`StratosError::InvalidRequest`].
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = StratosError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(StratosError::InvalidRequest {
                detail: rejection.body_text(),
            }),
        }
    }
}

impl IntoResponse for StratosError {
    fn into_response(self) -> Response {
        if self.is_validation() {
            debug!("Request rejected: {}", self);
        } else {
            error!("Request failed: {}", self);
        }
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route("/api/poster", post(poster_handler))
        .route("/health", get(health))
        .with_state(state)
}

async fn analyze_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<StrategyRequest>,
) -> Result<Json<StrategyResult>, StratosError> {
    let output = analyze_with(
        &state.client,
        state.provider.as_ref(),
        &request,
        &state.config,
    )
    .await?;
    Ok(Json(output.strategy))
}

async fn poster_handler(
    ApiJson(request): ApiJson<PosterRequest>,
) -> Result<impl IntoResponse, StratosError> {
    let PosterRequest { strategy, style } = request;
    let png = tokio::task::spawn_blocking(move || encode_png(&render_poster(&strategy, style)))
        .await
        .map_err(|e| StratosError::Internal(format!("Render task panicked: {e}")))??;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        poster_filename(style, chrono::Utc::now())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        png,
    ))
}

async fn health() -> &'static str {
    "ok"
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(config: ServiceConfig, addr: SocketAddr) -> Result<(), StratosError> {
    let state = AppState::new(config)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StratosError::Internal(format!("bind {addr}: {e}")))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .map_err(|e| StratosError::Internal(format!("server: {e}")))
}
