//! # table-viewer
//!
//! Table browsing engine for a database admin viewer: a REST gateway over a
//! SQL database and a client that searches, sorts, pages and edits the rows
//! it fetches from that gateway.
//!
//! ## Features
//!
//! - Database, table, row, schema and relation listings over HTTP
//! - Case-insensitive search and stable single-column sort, computed client-side
//! - Fixed-size pagination over the filtered and sorted rows
//! - Add, edit and delete of single rows addressed by primary key
//! - Late responses for an abandoned table selection are discarded
//!
//! ## Security Warning
//!
//! **This is a development tool only!**
//!
//! - No authentication/authorization built-in
//! - Exposes full database schema and data, and allows row changes
//! - Should never be exposed in production or public networks
//!
//! ## Example Usage
//!
//! Serving the gateway:
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use table_viewer::GatewayLayer;
//! use sqlx::SqlitePool;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = SqlitePool::connect("sqlite::memory:")
//!         .await
//!         .unwrap();
//!
//!     let app = Router::new()
//!         .route("/", get(|| async { "Hello, World!" }))
//!         .merge(GatewayLayer::sqlite("/api", pool).into_router());
//!
//!     // Serve the application...
//! }
//! ```
//!
//! Browsing a table through it:
//!
//! ```rust,no_run
//! use table_viewer::{GatewayConfig, HttpGateway, ViewerConfig, ViewerController};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = HttpGateway::new(&GatewayConfig::new("http://localhost:5000/api"))?;
//! let mut viewer = ViewerController::new(gateway, ViewerConfig::default());
//!
//! viewer.start().await?;
//! viewer.select_database(Some("main".into())).await?;
//! viewer.select_table(Some("employees".into())).await?;
//! viewer.set_search("smith");
//! viewer.toggle_sort("name");
//!
//! for row in viewer.visible_page().rows {
//!     println!("{:?}", row);
//! }
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod api;
pub mod config;
pub mod controller;
pub mod database;
pub mod error;
pub mod form;
pub mod gateway;
pub mod layer;
pub mod schema;
pub mod store;
pub mod view;

// Public exports
pub use config::{GatewayConfig, ViewerConfig};
pub use controller::{Confirm, Modal, Phase, ViewerController, VisiblePage};
pub use error::{FetchScope, FormKind, MutationKind, ViewerError};
pub use form::{FormField, InputKind, PendingRecord};
pub use gateway::{Gateway, GatewayError, HttpGateway};
pub use layer::GatewayLayer;
pub use schema::{ColumnSchema, Relation, Row, TableData};
pub use store::{FetchTicket, Selection, TableStore};
pub use view::{NullOrdering, SortDirection, SortState};

// Re-export database providers
pub use database::{DatabaseError, DatabaseProvider};

#[cfg(feature = "sqlite")]
pub use database::sqlite::SqliteProvider;
