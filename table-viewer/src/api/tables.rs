//! Database, table, schema and relation listing endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::{error_response, resolve_database};
use crate::database::traits::DatabaseProvider;
use crate::schema::{
    DatabaseQuery, DatabasesResponse, RelationsResponse, SchemaResponse, TablesResponse,
};

/// Handler for GET /api/databases
///
/// Returns the names of all databases the provider can see.
pub async fn list_databases_handler<DB: DatabaseProvider>(
    State(database): State<Arc<DB>>,
) -> Response {
    match database.list_databases().await {
        Ok(databases) => (StatusCode::OK, Json(DatabasesResponse { databases })).into_response(),
        Err(error) => {
            tracing::error!(%error, "failed to list databases");
            error_response(&error)
        }
    }
}

/// Handler for GET /api/tables?database=D
///
/// Returns the table names of one database.
///
/// # Arguments
///
/// * `database` - Database provider from state
/// * `query` - Target database (defaults to the provider's default database)
pub async fn list_tables_handler<DB: DatabaseProvider>(
    State(database): State<Arc<DB>>,
    Query(query): Query<DatabaseQuery>,
) -> Response {
    let database_name = resolve_database(database.as_ref(), query.database);

    match database.list_tables(&database_name).await {
        Ok(tables) => (StatusCode::OK, Json(TablesResponse { tables })).into_response(),
        Err(error) => {
            tracing::error!(database = %database_name, %error, "failed to list tables");
            error_response(&error)
        }
    }
}

/// Handler for GET /api/tables/{name}/schema-details?database=D
///
/// Returns one entry per column with its declared type, nullability,
/// primary-key and auto-increment flags.
pub async fn get_schema_details_handler<DB: DatabaseProvider>(
    State(database): State<Arc<DB>>,
    Path(table_name): Path<String>,
    Query(query): Query<DatabaseQuery>,
) -> Response {
    let database_name = resolve_database(database.as_ref(), query.database);

    match database.schema_details(&database_name, &table_name).await {
        Ok(schema) => (StatusCode::OK, Json(SchemaResponse { schema })).into_response(),
        Err(error) => {
            tracing::error!(
                database = %database_name,
                table = %table_name,
                %error,
                "failed to get schema details"
            );
            error_response(&error)
        }
    }
}

/// Handler for GET /api/relations?database=D
///
/// Returns every foreign key relation between the tables of a database.
pub async fn list_relations_handler<DB: DatabaseProvider>(
    State(database): State<Arc<DB>>,
    Query(query): Query<DatabaseQuery>,
) -> Response {
    let database_name = resolve_database(database.as_ref(), query.database);

    match database.list_relations(&database_name).await {
        Ok(relations) => (StatusCode::OK, Json(RelationsResponse { relations })).into_response(),
        Err(error) => {
            tracing::error!(database = %database_name, %error, "failed to list relations");
            error_response(&error)
        }
    }
}
