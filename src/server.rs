//! HTTP front end
//!
//! Routes:
//! - `GET /` redirects to the project page
//! - `GET /{arch}/{os}/{version}?modules=&endian=&implementation=&artifacts=`
//! - `POST /` with a JSON [`RuntimeRequest`]
//! - `POST /{arch}/{os}/{version}` with a `module-info.java` body
//!
//! Failures are answered with `{"success": false, "reason": ...}`.

use crate::config::{Config, ConfigManager};
use crate::error::{JlinkError, JlinkResult};
use crate::jlink::parse_module_info;
use crate::release::ReleaseMetadataCache;
use crate::request::{split_list, RuntimeRequest};
use crate::service::{RuntimeImage, RuntimeService};
use axum::extract::rejection::{JsonRejection, StringRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    service: Arc<RuntimeService>,
    index_redirect: Arc<str>,
}

impl AppState {
    pub fn new(service: Arc<RuntimeService>, index_redirect: &str) -> Self {
        Self {
            service,
            index_redirect: Arc::from(index_redirect),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(build_from_json))
        .route(
            "/{arch}/{os}/{version}",
            get(build_from_query).post(build_from_module_info),
        )
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn serve(config: &Config) -> JlinkResult<()> {
    ConfigManager::ensure_dirs(config).await?;

    let service = Arc::new(RuntimeService::new(config).await?);
    if config.release.refresh_interval_secs > 0 {
        spawn_refresh(
            Arc::clone(service.releases()),
            config.release.refresh_majors.clone(),
            Duration::from_secs(config.release.refresh_interval_secs),
        );
    }

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| JlinkError::io(format!("binding {}", addr), e))?;
    info!("Listening on {}", addr);

    let state = AppState::new(service, &config.server.index_redirect);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| JlinkError::io("serving HTTP", e))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Periodically rebuild the release cache
pub fn spawn_refresh(
    releases: Arc<ReleaseMetadataCache>,
    majors: Vec<u32>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match releases.refresh(&majors).await {
                Ok(count) => info!("Release cache refreshed ({} entries)", count),
                Err(e) => warn!("Release cache refresh failed: {}", e),
            }
        }
    })
}

#[derive(Debug, Default, Deserialize)]
struct BuildParams {
    modules: Option<String>,
    endian: Option<String>,
    implementation: Option<String>,
    artifacts: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    reason: &'a str,
}

/// A failed request, ready to be sent
pub struct ApiError {
    status: StatusCode,
    reason: String,
}

impl ApiError {
    fn bad_request(reason: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            reason: reason.into(),
        }
    }
}

impl From<JlinkError> for ApiError {
    fn from(err: JlinkError) -> Self {
        if err.is_client_error() {
            match &err {
                JlinkError::LinkFailed { output, .. } if !output.is_empty() => {
                    warn!("Request failed: {}\n{}", err, output)
                }
                _ => warn!("Request failed: {}", err),
            }
            Self::bad_request(err.reason())
        } else {
            error!("Request failed: {}", err);
            Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                reason: err.reason().to_string(),
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            reason: &self.reason,
        };
        (self.status, Json(body)).into_response()
    }
}

fn image_response(image: RuntimeImage) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", image.file_name);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::ACCEPT_RANGES, "bytes".to_string()),
        ],
        image.bytes,
    )
        .into_response()
}

/// Build one request inside its own span
async fn respond(state: &AppState, request: RuntimeRequest) -> Response {
    let span = info_span!("request", id = %Uuid::new_v4());
    async move {
        match state.service.build(&request).await {
            Ok(image) => image_response(image),
            Err(e) => ApiError::from(e).into_response(),
        }
    }
    .instrument(span)
    .await
}

async fn index(State(state): State<AppState>) -> Response {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, state.index_redirect.to_string())],
    )
        .into_response()
}

async fn build_from_query(
    State(state): State<AppState>,
    Path((arch, platform, version)): Path<(String, String, String)>,
    Query(params): Query<BuildParams>,
) -> Response {
    let request = RuntimeRequest {
        arch,
        platform,
        version,
        implementation: params.implementation,
        endian: params.endian,
        modules: params.modules.as_deref().map(split_list).unwrap_or_default(),
        artifacts: params.artifacts.as_deref().map(split_list).unwrap_or_default(),
    };
    respond(&state, request).await
}

async fn build_from_json(
    State(state): State<AppState>,
    body: Result<Json<RuntimeRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(request)) => respond(&state, request).await,
        Err(rejection) => {
            warn!("Rejected JSON body: {}", rejection);
            ApiError::bad_request("The request body must be a valid JSON runtime request")
                .into_response()
        }
    }
}

async fn build_from_module_info(
    State(state): State<AppState>,
    Path((arch, platform, version)): Path<(String, String, String)>,
    Query(params): Query<BuildParams>,
    body: Result<String, StringRejection>,
) -> Response {
    let source = match body {
        Ok(source) => source,
        Err(rejection) => {
            warn!("Rejected module-info body: {}", rejection);
            return ApiError::bad_request("The request body must be a valid module-info.java file")
                .into_response();
        }
    };

    let request = RuntimeRequest {
        arch,
        platform,
        version,
        implementation: params.implementation,
        endian: params.endian,
        modules: parse_module_info(&source),
        artifacts: params.artifacts.as_deref().map(split_list).unwrap_or_default(),
    };
    respond(&state, request).await
}
