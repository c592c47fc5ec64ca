//! Health check endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use crate::database::traits::DatabaseProvider;
use crate::schema::StatusResponse;

/// Handler for GET /api/status
///
/// Answers `{"status": "ok"}` when the database responds to a trivial query,
/// otherwise 503 with `{"status": "error", "error": "..."}`.
pub async fn status_handler<DB: DatabaseProvider>(State(database): State<Arc<DB>>) -> Response {
    match database.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusResponse {
                status: "ok".to_string(),
                error: None,
            }),
        )
            .into_response(),
        Err(error) => {
            tracing::warn!(%error, "database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(StatusResponse {
                    status: "error".to_string(),
                    error: Some(error.to_string()),
                }),
            )
                .into_response()
        }
    }
}
