//! Row fetching and single-row mutation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::{error_response, mutation_response, resolve_database};
use crate::database::traits::DatabaseProvider;
use crate::schema::{AddRowRequest, DatabaseQuery, DeleteQuery, UpdateRowRequest};

/// Handler for GET /api/tables/{name}/data?database=D
///
/// Returns the rows of a table together with its column names:
/// `{"data": [...], "columns": [...]}`.
pub async fn get_table_data_handler<DB: DatabaseProvider>(
    State(database): State<Arc<DB>>,
    Path(table_name): Path<String>,
    Query(query): Query<DatabaseQuery>,
) -> Response {
    let database_name = resolve_database(database.as_ref(), query.database);

    match database.fetch_rows(&database_name, &table_name).await {
        Ok(table) => (StatusCode::OK, Json(table)).into_response(),
        Err(error) => {
            tracing::error!(
                database = %database_name,
                table = %table_name,
                %error,
                "failed to fetch rows"
            );
            error_response(&error)
        }
    }
}

/// Handler for POST /api/tables/{name}/add
///
/// Request body:
/// ```json
/// { "database": "main", "record": { "name": "Alice", "email": null } }
/// ```
///
/// Response: `{"success": true}` or `{"success": false, "error": "..."}`
/// with a 4xx/5xx status.
pub async fn add_row_handler<DB: DatabaseProvider>(
    State(database): State<Arc<DB>>,
    Path(table_name): Path<String>,
    Json(request): Json<AddRowRequest>,
) -> Response {
    let database_name = resolve_database(database.as_ref(), request.database);

    let result = database
        .add_row(&database_name, &table_name, &request.record)
        .await;
    if let Err(error) = &result {
        tracing::warn!(database = %database_name, table = %table_name, %error, "insert rejected");
    }

    mutation_response(result)
}

/// Handler for PUT /api/tables/{name}/update/{id}
///
/// Request body:
/// ```json
/// { "database": "main", "record": { "id": 3, "name": "Carol" }, "id_column": "id" }
/// ```
pub async fn update_row_handler<DB: DatabaseProvider>(
    State(database): State<Arc<DB>>,
    Path((table_name, id)): Path<(String, String)>,
    Json(request): Json<UpdateRowRequest>,
) -> Response {
    let database_name = resolve_database(database.as_ref(), request.database);

    let result = database
        .update_row(
            &database_name,
            &table_name,
            &id,
            &request.record,
            &request.id_column,
        )
        .await;
    if let Err(error) = &result {
        tracing::warn!(
            database = %database_name,
            table = %table_name,
            %id,
            %error,
            "update rejected"
        );
    }

    mutation_response(result)
}

/// Handler for DELETE /api/tables/{name}/delete/{id}?database=D&id_column=C
pub async fn delete_row_handler<DB: DatabaseProvider>(
    State(database): State<Arc<DB>>,
    Path((table_name, id)): Path<(String, String)>,
    Query(query): Query<DeleteQuery>,
) -> Response {
    let database_name = resolve_database(database.as_ref(), query.database);

    let result = database
        .delete_row(&database_name, &table_name, &id, &query.id_column)
        .await;
    if let Err(error) = &result {
        tracing::warn!(
            database = %database_name,
            table = %table_name,
            %id,
            %error,
            "delete rejected"
        );
    }

    mutation_response(result)
}
