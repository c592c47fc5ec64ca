//! Database provider trait
//!
//! This trait defines the interface the gateway handlers need from a backing database.

use crate::schema::{ColumnSchema, Relation, Row, TableData};
use async_trait::async_trait;
use axum::http::StatusCode;
use thiserror::Error;

/// Database provider trait for listing, reading and mutating tables
///
/// Every method takes the database name explicitly; callers resolve a missing
/// name through [`DatabaseProvider::default_database`].
#[async_trait]
pub trait DatabaseProvider: Send + Sync + 'static {
    /// Database used when a request does not name one
    fn default_database(&self) -> &str;

    /// Verify that the database answers queries
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// List all databases visible through this provider
    async fn list_databases(&self) -> Result<Vec<String>, DatabaseError>;

    /// List the user tables of a database
    async fn list_tables(&self, database: &str) -> Result<Vec<String>, DatabaseError>;

    /// Fetch the rows of a table together with its column names
    ///
    /// # Arguments
    ///
    /// * `database` - Name of the database
    /// * `table` - Name of the table
    async fn fetch_rows(&self, database: &str, table: &str) -> Result<TableData, DatabaseError>;

    /// Describe the columns of a table
    async fn schema_details(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<ColumnSchema>, DatabaseError>;

    /// List the foreign key relations between the tables of a database
    async fn list_relations(&self, database: &str) -> Result<Vec<Relation>, DatabaseError>;

    /// Insert a single row
    async fn add_row(&self, database: &str, table: &str, record: &Row) -> Result<(), DatabaseError>;

    /// Update the row whose `id_column` equals `id`
    async fn update_row(
        &self,
        database: &str,
        table: &str,
        id: &str,
        record: &Row,
        id_column: &str,
    ) -> Result<(), DatabaseError>;

    /// Delete the row whose `id_column` equals `id`
    async fn delete_row(
        &self,
        database: &str,
        table: &str,
        id: &str,
        id_column: &str,
    ) -> Result<(), DatabaseError>;
}

/// Database error type
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Generic database error
    #[error("Database error: {0}")]
    Query(String),

    /// Database not found
    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    /// Table not found
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Invalid column name
    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    /// No row matched the identifier
    #[error("No row with {column} = {id}")]
    RowNotFound { column: String, id: String },

    /// Value that cannot be stored in a column
    #[error("Unsupported value for column {0}")]
    UnsupportedValue(String),

    /// Update without any column to set
    #[error("Record has no columns to write")]
    EmptyRecord,

    /// Statement timeout
    #[error("Query timeout exceeded")]
    Timeout,
}

impl DatabaseError {
    /// HTTP status used when this error is returned from a handler
    pub fn status_code(&self) -> StatusCode {
        match self {
            DatabaseError::DatabaseNotFound(_)
            | DatabaseError::TableNotFound(_)
            | DatabaseError::RowNotFound { .. } => StatusCode::NOT_FOUND,
            DatabaseError::InvalidColumn(_)
            | DatabaseError::UnsupportedValue(_)
            | DatabaseError::EmptyRecord => StatusCode::BAD_REQUEST,
            DatabaseError::Timeout => StatusCode::REQUEST_TIMEOUT,
            DatabaseError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::Query(error.to_string())
    }
}
