//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{infrastructure::dto::http::HealthDto, ui::state::AppState};

/// Health check endpoint
///
/// アクティブな接続数も返す。
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
        connections: state.registry.count().await,
    })
}
