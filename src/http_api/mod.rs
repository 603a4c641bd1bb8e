use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::{
    Direction, Position, PositionValidationError, Timeline, TimelineMetadata, TimelineSummary,
    validate_position,
};

#[derive(Clone)]
pub struct AppState {
    timeline: Arc<RwLock<Timeline>>,
}

impl AppState {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline: Arc::new(RwLock::new(timeline)),
        }
    }

    fn timeline(&self) -> Arc<RwLock<Timeline>> {
        self.timeline.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug, Serialize)]
struct DirectionBody {
    name: &'static str,
    value: u8,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<polars::prelude::PolarsError> for ApiError {
    fn from(value: polars::prelude::PolarsError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl From<PositionValidationError> for ApiError {
    fn from(value: PositionValidationError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metadata", get(get_metadata).put(update_metadata))
        .route("/positions", get(list_positions).post(create_position))
        .route(
            "/positions/:id",
            get(get_position).put(update_position).delete(delete_position),
        )
        .route("/summary", get(get_summary))
        .route("/directions", get(list_directions))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, timeline: Timeline) -> std::io::Result<()> {
    let state = AppState::new(timeline);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_metadata(State(state): State<AppState>) -> Json<TimelineMetadata> {
    let timeline = state.timeline();
    let metadata = {
        let guard = timeline.read();
        guard.metadata().clone()
    };
    Json(metadata)
}

async fn update_metadata(
    State(state): State<AppState>,
    Json(metadata): Json<TimelineMetadata>,
) -> Result<Json<TimelineMetadata>, ApiError> {
    let timeline = state.timeline();
    let current = {
        let mut guard = timeline.write();
        guard
            .set_metadata(metadata)
            .map_err(|err| ApiError::invalid(err.to_string()))?;
        guard.metadata().clone()
    };
    Ok(Json(current))
}

async fn list_positions(State(state): State<AppState>) -> Result<Json<Vec<Position>>, ApiError> {
    let timeline = state.timeline();
    let positions = {
        let guard = timeline.read();
        guard.positions()?
    };
    Ok(Json(positions))
}

async fn get_position(
    State(state): State<AppState>,
    Path(position_id): Path<i32>,
) -> Result<Json<Position>, ApiError> {
    let timeline = state.timeline();
    let result = {
        let guard = timeline.read();
        guard.find_position(position_id)?
    };
    match result {
        Some(position) => Ok(Json(position)),
        None => Err(ApiError::not_found(format!(
            "position {position_id} not found"
        ))),
    }
}

async fn create_position(
    State(state): State<AppState>,
    Json(position): Json<Position>,
) -> Result<(StatusCode, Json<Position>), ApiError> {
    validate_position(&position)?;
    let timeline = state.timeline();
    let created = {
        let mut guard = timeline.write();
        if guard.contains(position.id)? {
            return Err(ApiError::Conflict(format!(
                "position {} already exists",
                position.id
            )));
        }
        let id = position.id;
        guard.upsert_position(position)?;
        guard
            .find_position(id)?
            .ok_or_else(|| ApiError::internal("position not found after creation"))?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_position(
    State(state): State<AppState>,
    Path(position_id): Path<i32>,
    Json(position): Json<Position>,
) -> Result<Json<Position>, ApiError> {
    if position.id != position_id {
        return Err(ApiError::invalid(
            "position id in payload does not match path parameter",
        ));
    }
    validate_position(&position)?;
    let timeline = state.timeline();
    let updated = {
        let mut guard = timeline.write();
        if !guard.contains(position_id)? {
            return Err(ApiError::not_found(format!(
                "position {position_id} not found"
            )));
        }
        guard.upsert_position(position)?;
        guard
            .find_position(position_id)?
            .ok_or_else(|| ApiError::internal("position not found after update"))?
    };
    Ok(Json(updated))
}

async fn delete_position(
    State(state): State<AppState>,
    Path(position_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let timeline = state.timeline();
    let removed = {
        let mut guard = timeline.write();
        guard.delete_position(position_id)?
    };
    if !removed {
        return Err(ApiError::not_found(format!(
            "position {position_id} not found"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_summary(State(state): State<AppState>) -> Result<Json<TimelineSummary>, ApiError> {
    let timeline = state.timeline();
    let summary = {
        let guard = timeline.read();
        guard.summary()?
    };
    Ok(Json(summary))
}

async fn list_directions() -> Json<Vec<DirectionBody>> {
    let directions = Direction::variants()
        .into_iter()
        .map(|direction| DirectionBody {
            name: direction.as_str(),
            value: direction.value(),
        })
        .collect();
    Json(directions)
}
