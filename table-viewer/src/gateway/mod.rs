//! Client side of the table gateway
//!
//! [`Gateway`] is the seam between the view controller and the backend;
//! [`HttpGateway`] speaks the REST surface served by [`crate::GatewayLayer`].

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::schema::{ColumnSchema, Relation, Row, TableData};

pub mod http;

pub use http::HttpGateway;

/// Backend operations the view controller depends on
#[async_trait]
pub trait Gateway: Send + Sync + 'static {
    /// Health check; succeeds only when the gateway reports `ok`
    async fn status(&self) -> Result<(), GatewayError>;

    async fn list_databases(&self) -> Result<Vec<String>, GatewayError>;

    async fn list_tables(&self, database: &str) -> Result<Vec<String>, GatewayError>;

    /// Rows and column names of a table
    async fn fetch_rows(&self, database: &str, table: &str) -> Result<TableData, GatewayError>;

    async fn fetch_schema(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<ColumnSchema>, GatewayError>;

    async fn list_relations(&self, database: &str) -> Result<Vec<Relation>, GatewayError>;

    async fn add_row(&self, database: &str, table: &str, record: &Row) -> Result<(), GatewayError>;

    /// Update the row addressed by `id` in `id_column`
    async fn update_row(
        &self,
        database: &str,
        table: &str,
        id: &Value,
        record: &Row,
        id_column: &str,
    ) -> Result<(), GatewayError>;

    /// Delete the row addressed by `id` in `id_column`
    async fn delete_row(
        &self,
        database: &str,
        table: &str,
        id: &Value,
        id_column: &str,
    ) -> Result<(), GatewayError>;
}

/// Failure talking to the gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a response (connection, timeout, decoding)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status, with the server's message when it sent one
    #[error("server responded with {status}: {message}")]
    Status {
        status: u16,
        message: String,
        reported: bool,
    },

    /// The gateway answered `success: false`
    #[error("{0}")]
    Rejected(String),

    /// The configured base URL cannot carry endpoint paths
    #[error("invalid gateway url: {0}")]
    InvalidUrl(String),

    /// The status endpoint answered something other than `ok`
    #[error("gateway reported status '{0}'")]
    Unhealthy(String),
}

impl GatewayError {
    /// Reason reported by the gateway itself, if any
    pub fn reported_reason(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected(reason) => Some(reason),
            GatewayError::Status {
                message,
                reported: true,
                ..
            } => Some(message),
            _ => None,
        }
    }
}
