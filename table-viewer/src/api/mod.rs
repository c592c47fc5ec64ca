//! REST API endpoints
//!
//! This module contains all handlers of the table gateway surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::database::traits::{DatabaseError, DatabaseProvider};
use crate::schema::{ErrorResponse, MutationResponse};

pub mod rows;
pub mod status;
pub mod tables;

// Re-export handlers for convenience
pub use rows::{add_row_handler, delete_row_handler, get_table_data_handler, update_row_handler};
pub use status::status_handler;
pub use tables::{
    get_schema_details_handler, list_databases_handler, list_relations_handler,
    list_tables_handler,
};

/// Create the API router with all endpoints
///
/// # Arguments
///
/// * `database` - Arc-wrapped database provider implementation
///
/// # Returns
///
/// An Axum Router configured with all gateway routes
pub fn create_api_router<DB: DatabaseProvider>(database: Arc<DB>) -> Router {
    // Axum 0.8 uses {param} syntax instead of :param
    Router::new()
        .route("/status", get(status_handler::<DB>))
        .route("/databases", get(list_databases_handler::<DB>))
        .route("/relations", get(list_relations_handler::<DB>))
        .route("/tables", get(list_tables_handler::<DB>))
        .route("/tables/{name}/data", get(get_table_data_handler::<DB>))
        .route(
            "/tables/{name}/schema-details",
            get(get_schema_details_handler::<DB>),
        )
        .route("/tables/{name}/add", post(add_row_handler::<DB>))
        .route("/tables/{name}/update/{id}", put(update_row_handler::<DB>))
        .route("/tables/{name}/delete/{id}", delete(delete_row_handler::<DB>))
        .with_state(database)
}

/// Use the requested database or fall back to the provider's default
pub(crate) fn resolve_database<DB: DatabaseProvider>(
    database: &DB,
    requested: Option<String>,
) -> String {
    requested
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| database.default_database().to_string())
}

/// Error body for the read endpoints
pub(crate) fn error_response(error: &DatabaseError) -> Response {
    (
        error.status_code(),
        Json(ErrorResponse {
            error: Some(error.to_string()),
        }),
    )
        .into_response()
}

/// Result body for the mutation endpoints
pub(crate) fn mutation_response(result: Result<(), DatabaseError>) -> Response {
    match result {
        Ok(()) => (StatusCode::OK, Json(MutationResponse::succeeded())).into_response(),
        Err(error) => (
            error.status_code(),
            Json(MutationResponse::failed(error.to_string())),
        )
            .into_response(),
    }
}
