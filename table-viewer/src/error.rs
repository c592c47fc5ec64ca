//! Errors surfaced to the person using the viewer

use std::fmt;
use thiserror::Error;

use crate::gateway::GatewayError;

/// What was being fetched when a read failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchScope {
    Databases,
    Tables { database: String },
    Rows { database: String, table: String },
    Schema { database: String, table: String },
    Relations { database: String },
}

impl fmt::Display for FetchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchScope::Databases => write!(f, "the database list"),
            FetchScope::Tables { database } => write!(f, "tables of database {}", database),
            FetchScope::Rows { database, table } => {
                write!(f, "rows of table {} in {}", table, database)
            }
            FetchScope::Schema { database, table } => {
                write!(f, "schema of table {} in {}", table, database)
            }
            FetchScope::Relations { database } => {
                write!(f, "relations of database {}", database)
            }
        }
    }
}

/// Single-row mutation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Add,
    Update,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutationKind::Add => "add",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        })
    }
}

/// Which form an operation expected to be open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Add,
    Edit,
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormKind::Add => "add",
            FormKind::Edit => "edit",
        })
    }
}

/// Viewer error
///
/// Every variant is recoverable: the triggering action can simply be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    /// Gateway unreachable or unhealthy
    #[error("Cannot reach the server: {0}")]
    Connectivity(String),

    /// A listing or table read failed
    #[error("Failed to fetch {scope}: {message}")]
    Fetch { scope: FetchScope, message: String },

    /// The gateway refused or failed a change
    #[error("Failed to {operation} record: {reason}")]
    Mutation {
        operation: MutationKind,
        reason: String,
    },

    /// Operation needs a selected database and table
    #[error("No table selected")]
    NoTableSelected,

    /// Submit without the matching form open
    #[error("The {0} form is not open")]
    FormNotOpen(FormKind),
}

impl ViewerError {
    pub(crate) fn fetch(scope: FetchScope, error: &GatewayError) -> Self {
        ViewerError::Fetch {
            scope,
            message: error.to_string(),
        }
    }

    /// Prefer the gateway's own reason, otherwise describe the failure
    pub(crate) fn mutation(operation: MutationKind, error: &GatewayError) -> Self {
        ViewerError::Mutation {
            operation,
            reason: error
                .reported_reason()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
        }
    }
}
