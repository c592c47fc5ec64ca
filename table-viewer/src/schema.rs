//! Wire types for the table gateway
//!
//! These types are shared by the gateway server (`api`, `database`) and the
//! client side (`gateway`, `controller`), so both ends agree on the JSON shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// One record of a table, keyed by column name
pub type Row = serde_json::Map<String, Value>;

/// Primary key column used when the schema does not declare one
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Structural metadata for a single column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    /// Column name
    pub field: String,

    /// Declared SQL type (e.g., "INTEGER", "TEXT", "VARCHAR(255)")
    #[serde(rename = "type")]
    pub data_type: String,

    /// Whether the column accepts NULL
    pub nullable: bool,

    /// Whether the column is part of the primary key
    pub is_primary: bool,

    /// Whether the database assigns the value on insert
    pub is_auto_increment: bool,
}

/// Find the primary key column of a schema, falling back to `"id"`
pub fn primary_key_of(schema: &[ColumnSchema]) -> &str {
    schema
        .iter()
        .find(|column| column.is_primary)
        .map(|column| column.field.as_str())
        .unwrap_or(DEFAULT_PRIMARY_KEY)
}

/// Render a value the way it is searched and displayed
///
/// Returns `None` for null so callers can decide how to show it.
pub fn value_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        Value::Bool(flag) => Some(Cow::Borrowed(if *flag { "true" } else { "false" })),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// Foreign key relation between two tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Table holding the foreign key
    pub table: String,

    /// Foreign key column
    pub column: String,

    /// Referenced table
    pub referenced_table: String,

    /// Referenced column
    pub referenced_column: String,
}

/// Response for `GET /status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response for `GET /databases`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabasesResponse {
    #[serde(default)]
    pub databases: Vec<String>,
}

/// Response for `GET /tables`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesResponse {
    #[serde(default)]
    pub tables: Vec<String>,
}

/// Response for `GET /tables/{table}/data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    /// Rows in storage order
    #[serde(default)]
    pub data: Vec<Row>,

    /// Column names in declaration order
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Response for `GET /tables/{table}/schema-details`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    #[serde(default)]
    pub schema: Vec<ColumnSchema>,
}

/// Response for `GET /relations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationsResponse {
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// Query string carrying the target database
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseQuery {
    pub database: Option<String>,
}

/// Query string for `DELETE /tables/{table}/delete/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteQuery {
    pub database: Option<String>,

    #[serde(default = "default_id_column")]
    pub id_column: String,
}

/// Body of `POST /tables/{table}/add`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRowRequest {
    pub database: Option<String>,
    pub record: Row,
}

/// Body of `PUT /tables/{table}/update/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRowRequest {
    pub database: Option<String>,
    pub record: Row,

    #[serde(default = "default_id_column")]
    pub id_column: String,
}

fn default_id_column() -> String {
    DEFAULT_PRIMARY_KEY.to_string()
}

/// Outcome of add/update/delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationResponse {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Error body returned by the read endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}
