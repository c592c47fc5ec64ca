//! View controller
//!
//! [`ViewerController`] owns all state of one table view and is the only
//! place it changes: selection, search, sort, paging, the add/edit form and
//! the CRUD calls against a [`Gateway`]. Successful mutations are never
//! applied locally; the table is fetched again so the view always shows what
//! the gateway stored.

use serde_json::Value;
use std::sync::Arc;

use crate::config::ViewerConfig;
use crate::error::{FetchScope, FormKind, MutationKind, ViewerError};
use crate::form::{form_fields, FormField, PendingRecord};
use crate::gateway::{Gateway, GatewayError};
use crate::schema::{ColumnSchema, Relation, Row, TableData};
use crate::store::{FetchTicket, TableStore};
use crate::view::{compute, slice, SortState};

/// Prompt shown before a row is deleted
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this record?";

/// Request lifecycle of the view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Failed(ViewerError),
}

/// Which form is open, with its draft
///
/// Being a single enum, at most one form can be open.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Modal {
    #[default]
    Closed,
    Adding(PendingRecord),
    Editing(PendingRecord),
}

impl Modal {
    pub fn kind(&self) -> Option<FormKind> {
        match self {
            Modal::Closed => None,
            Modal::Adding(_) => Some(FormKind::Add),
            Modal::Editing(_) => Some(FormKind::Edit),
        }
    }
}

/// Yes/no gate in front of destructive actions
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Rows of the current page
#[derive(Debug, Clone, PartialEq)]
pub struct VisiblePage<'a> {
    pub rows: Vec<&'a Row>,
    pub page: usize,
    pub page_count: usize,
    /// Rows left after searching, across all pages
    pub matching: usize,
}

pub struct ViewerController<G: Gateway> {
    gateway: Arc<G>,
    config: ViewerConfig,
    store: TableStore,
    query: String,
    sort: SortState,
    page: usize,
    phase: Phase,
    modal: Modal,
    connectivity: Option<ViewerError>,
    notice: Option<String>,
}

impl<G: Gateway> ViewerController<G> {
    pub fn new(gateway: G, config: ViewerConfig) -> Self {
        Self::with_shared(Arc::new(gateway), config)
    }

    /// Build on a gateway that is also used elsewhere
    pub fn with_shared(gateway: Arc<G>, config: ViewerConfig) -> Self {
        Self {
            gateway,
            config,
            store: TableStore::new(),
            query: String::new(),
            sort: SortState::default(),
            page: 1,
            phase: Phase::Idle,
            modal: Modal::Closed,
            connectivity: None,
            notice: None,
        }
    }

    /// Gateway handle for running the fetch half of a two-phase load elsewhere
    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Error of the last operation, if it failed
    pub fn error(&self) -> Option<&ViewerError> {
        match &self.phase {
            Phase::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Banner for an unreachable gateway; cleared by the next successful status check
    pub fn connectivity(&self) -> Option<&ViewerError> {
        self.connectivity.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    // === View ===

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    /// Header click on `column`
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort.toggle(column);
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
        self.page = 1;
    }

    /// Jump to a 1-based page; pages past the end show no rows
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.config.page_size = page_size;
        self.page = 1;
    }

    /// All rows that pass the search, in display order
    pub fn ordered_rows(&self) -> Vec<&Row> {
        compute(
            self.store.rows(),
            &self.query,
            &self.sort,
            self.config.null_ordering,
        )
    }

    pub fn visible_page(&self) -> VisiblePage<'_> {
        let ordered = self.ordered_rows();
        let window = slice(&ordered, self.config.page_size, self.page);
        VisiblePage {
            rows: window.visible.to_vec(),
            page: self.page,
            page_count: window.page_count,
            matching: ordered.len(),
        }
    }

    /// Placeholder text when a selected table shows no rows
    pub fn empty_message(&self) -> Option<&'static str> {
        if self.store.selection().table.is_none() || self.is_loading() {
            return None;
        }
        if !self.ordered_rows().is_empty() {
            return None;
        }
        Some(if self.query.is_empty() {
            "The table has no rows"
        } else {
            "No rows match the search"
        })
    }

    // === Selection ===

    /// Forget everything derived from the previous table
    ///
    /// Fetches still in flight target the old selection and will be dropped,
    /// so nothing is loading anymore.
    fn reset_view(&mut self) {
        if self.phase == Phase::Loading {
            self.phase = Phase::Idle;
        }
        self.modal = Modal::Closed;
        self.query.clear();
        self.sort = SortState::default();
        self.page = 1;
    }

    /// Switch database without fetching; late responses for the old one are dropped
    pub fn change_database(&mut self, database: Option<String>) {
        self.reset_view();
        self.store.select_database(database);
    }

    /// Switch table without fetching; late responses for the old one are dropped
    pub fn change_table(&mut self, table: Option<String>) {
        self.reset_view();
        self.store.select_table(table);
    }

    /// Switch database and load its tables
    pub async fn select_database(&mut self, database: Option<String>) -> Result<(), ViewerError> {
        self.change_database(database);
        if self.store.selection().database.is_none() {
            return Ok(());
        }
        self.load_tables().await
    }

    /// Switch table and load its rows and schema
    pub async fn select_table(&mut self, table: Option<String>) -> Result<(), ViewerError> {
        self.change_table(table);
        if self.store.selection().table.is_none() {
            return Ok(());
        }
        self.refresh_table().await
    }

    // === Fetching ===

    /// Status check followed by the database list
    pub async fn start(&mut self) -> Result<(), ViewerError> {
        // An unreachable gateway is already reported through the banner
        let _ = self.check_status().await;
        self.load_databases().await
    }

    pub async fn check_status(&mut self) -> Result<(), ViewerError> {
        match self.gateway.status().await {
            Ok(()) => {
                self.connectivity = None;
                self.notice = Some("Connected to server".to_string());
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "gateway status check failed");
                let error = ViewerError::Connectivity(error.to_string());
                self.connectivity = Some(error.clone());
                Err(error)
            }
        }
    }

    pub async fn load_databases(&mut self) -> Result<(), ViewerError> {
        self.phase = Phase::Loading;
        let result = self.gateway.list_databases().await;

        match result {
            Ok(databases) => {
                self.store.set_databases(databases);
                self.finish(Ok(()))
            }
            Err(error) => {
                tracing::warn!(%error, "failed to list databases");
                self.store.set_databases(Vec::new());
                self.finish(Err(ViewerError::fetch(FetchScope::Databases, &error)))
            }
        }
    }

    /// Start a table listing for the selected database
    pub fn begin_tables_fetch(&mut self) -> Option<FetchTicket> {
        let ticket = self.store.database_ticket()?;
        self.phase = Phase::Loading;
        Some(ticket)
    }

    /// Apply a table listing started with [`Self::begin_tables_fetch`]
    pub fn complete_tables_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<String>, GatewayError>,
    ) -> Result<(), ViewerError> {
        if !self.store.is_current(ticket) {
            tracing::debug!(database = ticket.database(), "discarding stale table list");
            return Ok(());
        }

        match result {
            Ok(tables) => {
                self.store.apply_tables(ticket, tables);
                self.finish(Ok(()))
            }
            Err(error) => {
                tracing::warn!(database = ticket.database(), %error, "failed to list tables");
                self.store.apply_tables(ticket, Vec::new());
                let scope = FetchScope::Tables {
                    database: ticket.database().to_string(),
                };
                self.finish(Err(ViewerError::fetch(scope, &error)))
            }
        }
    }

    pub async fn load_tables(&mut self) -> Result<(), ViewerError> {
        let ticket = self.begin_tables_fetch().ok_or(ViewerError::NoTableSelected)?;
        let result = self.gateway.list_tables(ticket.database()).await;
        self.complete_tables_fetch(&ticket, result)
    }

    /// Start a rows/schema fetch for the selected table
    pub fn begin_table_fetch(&mut self) -> Option<FetchTicket> {
        let ticket = self.store.table_ticket()?;
        self.phase = Phase::Loading;
        Some(ticket)
    }

    /// Apply rows started with [`Self::begin_table_fetch`]
    pub fn complete_rows_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<TableData, GatewayError>,
    ) -> Result<(), ViewerError> {
        if !self.store.is_current(ticket) {
            tracing::debug!(
                database = ticket.database(),
                table = ticket.table(),
                "discarding stale rows"
            );
            return Ok(());
        }

        match result {
            Ok(table) => {
                self.store.apply_rows(ticket, table);
                self.finish(Ok(()))
            }
            Err(error) => {
                tracing::warn!(
                    database = ticket.database(),
                    table = ticket.table(),
                    %error,
                    "failed to fetch rows"
                );
                self.store.apply_rows(ticket, TableData::default());
                let scope = FetchScope::Rows {
                    database: ticket.database().to_string(),
                    table: ticket.table().unwrap_or_default().to_string(),
                };
                self.finish(Err(ViewerError::fetch(scope, &error)))
            }
        }
    }

    /// Apply a schema started with [`Self::begin_table_fetch`]
    pub fn complete_schema_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<ColumnSchema>, GatewayError>,
    ) -> Result<(), ViewerError> {
        if !self.store.is_current(ticket) {
            tracing::debug!(
                database = ticket.database(),
                table = ticket.table(),
                "discarding stale schema"
            );
            return Ok(());
        }

        match result {
            Ok(schema) => {
                self.store.apply_schema(ticket, schema);
                self.finish(Ok(()))
            }
            Err(error) => {
                tracing::warn!(
                    database = ticket.database(),
                    table = ticket.table(),
                    %error,
                    "failed to fetch schema"
                );
                self.store.apply_schema(ticket, Vec::new());
                let scope = FetchScope::Schema {
                    database: ticket.database().to_string(),
                    table: ticket.table().unwrap_or_default().to_string(),
                };
                self.finish(Err(ViewerError::fetch(scope, &error)))
            }
        }
    }

    /// Fetch rows and schema of the selected table concurrently
    pub async fn refresh_table(&mut self) -> Result<(), ViewerError> {
        let ticket = self.begin_table_fetch().ok_or(ViewerError::NoTableSelected)?;
        let table = ticket.table().unwrap_or_default();

        let (rows, schema) = tokio::join!(
            self.gateway.fetch_rows(ticket.database(), table),
            self.gateway.fetch_schema(ticket.database(), table),
        );

        let rows = self.complete_rows_fetch(&ticket, rows);
        let schema = self.complete_schema_fetch(&ticket, schema);
        rows.and(schema)
    }

    /// Fetch the rows of the selected table again
    pub async fn refresh_rows(&mut self) -> Result<(), ViewerError> {
        let ticket = self.begin_table_fetch().ok_or(ViewerError::NoTableSelected)?;
        let result = self
            .gateway
            .fetch_rows(ticket.database(), ticket.table().unwrap_or_default())
            .await;
        self.complete_rows_fetch(&ticket, result)
    }

    /// Load foreign key relations of the selected database
    pub async fn load_relations(&mut self) -> Result<(), ViewerError> {
        let ticket = self.begin_tables_fetch().ok_or(ViewerError::NoTableSelected)?;
        let result = self.gateway.list_relations(ticket.database()).await;

        if !self.store.is_current(&ticket) {
            return Ok(());
        }
        match result {
            Ok(relations) => {
                self.store.apply_relations(&ticket, relations);
                self.finish(Ok(()))
            }
            Err(error) => {
                tracing::warn!(database = ticket.database(), %error, "failed to list relations");
                self.store.apply_relations(&ticket, Vec::<Relation>::new());
                let scope = FetchScope::Relations {
                    database: ticket.database().to_string(),
                };
                self.finish(Err(ViewerError::fetch(scope, &error)))
            }
        }
    }

    /// Settle the phase after a step; an earlier failure stays visible
    fn finish(&mut self, result: Result<(), ViewerError>) -> Result<(), ViewerError> {
        match &result {
            Ok(()) => {
                if self.phase == Phase::Loading {
                    self.phase = Phase::Idle;
                }
            }
            Err(error) => self.phase = Phase::Failed(error.clone()),
        }
        result
    }

    // === Forms ===

    /// Open the add form with a blank draft built from the schema
    pub fn open_add(&mut self) {
        self.modal = Modal::Adding(PendingRecord::template(self.store.schema()));
    }

    /// Open the edit form with a copy of `row`
    pub fn open_edit(&mut self, row: &Row) {
        self.modal = Modal::Editing(PendingRecord::from_row(row));
    }

    pub fn close_form(&mut self) {
        self.modal = Modal::Closed;
    }

    /// Draft of the open form
    pub fn pending_mut(&mut self) -> Option<&mut PendingRecord> {
        match &mut self.modal {
            Modal::Closed => None,
            Modal::Adding(record) | Modal::Editing(record) => Some(record),
        }
    }

    /// Inputs to render for the open form
    pub fn form_fields(&self) -> Vec<FormField> {
        match self.modal.kind() {
            Some(kind) => form_fields(self.store.schema(), kind),
            None => Vec::new(),
        }
    }

    // === Mutations ===

    /// Submit the add form
    ///
    /// On success the form closes and the rows are fetched again. On failure
    /// the form stays open with its draft so the user can retry.
    pub async fn submit_add(&mut self) -> Result<(), ViewerError> {
        let Modal::Adding(record) = &self.modal else {
            return Err(ViewerError::FormNotOpen(FormKind::Add));
        };
        let ticket = self
            .store
            .table_ticket()
            .ok_or(ViewerError::NoTableSelected)?;

        self.phase = Phase::Loading;
        let result = self
            .gateway
            .add_row(
                ticket.database(),
                ticket.table().unwrap_or_default(),
                record.values(),
            )
            .await;

        self.after_mutation(MutationKind::Add, result).await
    }

    /// Submit the edit form, addressing the row by its primary key
    pub async fn submit_update(&mut self) -> Result<(), ViewerError> {
        let Modal::Editing(record) = &self.modal else {
            return Err(ViewerError::FormNotOpen(FormKind::Edit));
        };
        let ticket = self
            .store
            .table_ticket()
            .ok_or(ViewerError::NoTableSelected)?;

        let primary_key = self.store.primary_key();
        let id = record.get(primary_key).cloned().unwrap_or(Value::Null);

        self.phase = Phase::Loading;
        let result = self
            .gateway
            .update_row(
                ticket.database(),
                ticket.table().unwrap_or_default(),
                &id,
                record.values(),
                primary_key,
            )
            .await;

        self.after_mutation(MutationKind::Update, result).await
    }

    /// Delete `row` once `confirm` agrees
    ///
    /// Returns `Ok(false)` without touching any state when the user declines.
    pub async fn delete(&mut self, row: &Row, confirm: &impl Confirm) -> Result<bool, ViewerError> {
        let ticket = self
            .store
            .table_ticket()
            .ok_or(ViewerError::NoTableSelected)?;
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(false);
        }

        let primary_key = self.store.primary_key();
        let id = row.get(primary_key).cloned().unwrap_or(Value::Null);

        self.phase = Phase::Loading;
        let result = self
            .gateway
            .delete_row(
                ticket.database(),
                ticket.table().unwrap_or_default(),
                &id,
                primary_key,
            )
            .await;

        self.after_mutation(MutationKind::Delete, result).await?;
        Ok(true)
    }

    /// Shared success/failure handling of add, update and delete
    ///
    /// A failed re-fetch after a successful change is reported through the
    /// phase, not as a failure of the change itself.
    async fn after_mutation(
        &mut self,
        operation: MutationKind,
        result: Result<(), GatewayError>,
    ) -> Result<(), ViewerError> {
        if let Err(error) = result {
            tracing::warn!(%operation, %error, "mutation failed");
            return self.finish(Err(ViewerError::mutation(operation, &error)));
        }

        if operation != MutationKind::Delete {
            self.modal = Modal::Closed;
        }
        self.notice = Some(
            match operation {
                MutationKind::Add => "Record added",
                MutationKind::Update => "Record updated",
                MutationKind::Delete => "Record deleted",
            }
            .to_string(),
        );
        self.phase = Phase::Idle;

        if let Err(error) = self.refresh_rows().await {
            tracing::warn!(%operation, %error, "re-fetch after mutation failed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// In-memory gateway with one database and one table
    struct MockGateway {
        rows: Mutex<Vec<Row>>,
        schema: Vec<ColumnSchema>,
        calls: Mutex<Vec<String>>,
        rejection: Mutex<Option<String>>,
        offline: Mutex<bool>,
    }

    impl MockGateway {
        fn new() -> Self {
            let rows = json!([
                { "user_id": 1, "name": "Bob" },
                { "user_id": 2, "name": "Alice" },
                { "user_id": 3, "name": null }
            ]);
            Self {
                rows: Mutex::new(
                    rows.as_array()
                        .unwrap()
                        .iter()
                        .map(|row| row.as_object().unwrap().clone())
                        .collect(),
                ),
                schema: vec![
                    ColumnSchema {
                        field: "user_id".into(),
                        data_type: "INTEGER".into(),
                        nullable: false,
                        is_primary: true,
                        is_auto_increment: true,
                    },
                    ColumnSchema {
                        field: "name".into(),
                        data_type: "TEXT".into(),
                        nullable: true,
                        is_primary: false,
                        is_auto_increment: false,
                    },
                ],
                calls: Mutex::new(Vec::new()),
                rejection: Mutex::new(None),
                offline: Mutex::new(false),
            }
        }

        fn record(&self, call: String) -> Result<(), GatewayError> {
            self.calls.lock().unwrap().push(call);
            if *self.offline.lock().unwrap() {
                return Err(GatewayError::Status {
                    status: 503,
                    message: "503 Service Unavailable".into(),
                    reported: false,
                });
            }
            Ok(())
        }

        fn rejected(&self) -> Result<(), GatewayError> {
            match self.rejection.lock().unwrap().clone() {
                Some(reason) => Err(GatewayError::Rejected(reason)),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Gateway for MockGateway {
        async fn status(&self) -> Result<(), GatewayError> {
            self.record("status".into())
        }

        async fn list_databases(&self) -> Result<Vec<String>, GatewayError> {
            self.record("databases".into())?;
            Ok(vec!["shop".into()])
        }

        async fn list_tables(&self, database: &str) -> Result<Vec<String>, GatewayError> {
            self.record(format!("tables {}", database))?;
            Ok(vec!["users".into()])
        }

        async fn fetch_rows(&self, database: &str, table: &str) -> Result<TableData, GatewayError> {
            self.record(format!("rows {}.{}", database, table))?;
            Ok(TableData {
                data: self.rows.lock().unwrap().clone(),
                columns: vec!["user_id".into(), "name".into()],
            })
        }

        async fn fetch_schema(
            &self,
            database: &str,
            table: &str,
        ) -> Result<Vec<ColumnSchema>, GatewayError> {
            self.record(format!("schema {}.{}", database, table))?;
            Ok(self.schema.clone())
        }

        async fn list_relations(&self, database: &str) -> Result<Vec<Relation>, GatewayError> {
            self.record(format!("relations {}", database))?;
            Ok(Vec::new())
        }

        async fn add_row(&self, database: &str, table: &str, record: &Row) -> Result<(), GatewayError> {
            self.record(format!("add {}.{}", database, table))?;
            self.rejected()?;
            let mut rows = self.rows.lock().unwrap();
            let mut row = record.clone();
            row.insert("user_id".into(), json!(rows.len() + 1));
            rows.push(row);
            Ok(())
        }

        async fn update_row(
            &self,
            database: &str,
            table: &str,
            id: &Value,
            record: &Row,
            id_column: &str,
        ) -> Result<(), GatewayError> {
            self.record(format!("update {}.{} {}={}", database, table, id_column, id))?;
            self.rejected()?;
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|row| row.get(id_column) == Some(id)) {
                *row = record.clone();
            }
            Ok(())
        }

        async fn delete_row(
            &self,
            database: &str,
            table: &str,
            id: &Value,
            id_column: &str,
        ) -> Result<(), GatewayError> {
            self.record(format!("delete {}.{} {}={}", database, table, id_column, id))?;
            self.rejected()?;
            self.rows
                .lock()
                .unwrap()
                .retain(|row| row.get(id_column) != Some(id));
            Ok(())
        }
    }

    async fn loaded() -> ViewerController<MockGateway> {
        let mut controller = ViewerController::new(MockGateway::new(), ViewerConfig::default());
        controller.start().await.unwrap();
        controller.select_database(Some("shop".into())).await.unwrap();
        controller.select_table(Some("users".into())).await.unwrap();
        controller
    }

    fn names(controller: &ViewerController<MockGateway>) -> Vec<Value> {
        controller
            .ordered_rows()
            .iter()
            .map(|row| row["name"].clone())
            .collect()
    }

    #[tokio::test]
    async fn test_load_sequence() {
        let controller = loaded().await;

        assert_eq!(controller.store().databases(), ["shop"]);
        assert_eq!(controller.store().tables(), ["users"]);
        assert_eq!(controller.store().rows().len(), 3);
        assert_eq!(controller.store().primary_key(), "user_id");
        assert_eq!(controller.phase(), &Phase::Idle);
        assert_eq!(controller.notice(), Some("Connected to server"));
    }

    #[tokio::test]
    async fn test_search_sort_and_page() {
        let mut controller = loaded().await;

        controller.toggle_sort("name");
        assert_eq!(names(&controller), vec![json!("Alice"), json!("Bob"), Value::Null]);
        controller.toggle_sort("name");
        assert_eq!(names(&controller), vec![Value::Null, json!("Bob"), json!("Alice")]);

        controller.set_page_size(2);
        controller.set_page(2);
        let page = controller.visible_page();
        assert_eq!(page.page_count, 2);
        assert_eq!(page.rows.len(), 1);

        controller.set_search("bo");
        assert_eq!(controller.page(), 1);
        assert_eq!(names(&controller), vec![json!("Bob")]);

        controller.set_search("zzz");
        assert_eq!(controller.empty_message(), Some("No rows match the search"));
    }

    #[tokio::test]
    async fn test_table_switch_resets_view_state() {
        let mut controller = loaded().await;
        controller.set_search("bob");
        controller.toggle_sort("name");
        controller.set_page(3);
        controller.open_add();

        controller.change_table(Some("orders".into()));

        assert_eq!(controller.query(), "");
        assert_eq!(controller.sort(), &SortState::default());
        assert_eq!(controller.page(), 1);
        assert_eq!(controller.modal(), &Modal::Closed);
        assert!(controller.store().rows().is_empty());
        assert!(controller.store().columns().is_empty());
        assert!(controller.store().schema().is_empty());
    }

    #[tokio::test]
    async fn test_late_rows_for_previous_database_are_ignored() {
        let mut controller = loaded().await;
        let ticket = controller.begin_table_fetch().unwrap();
        let gateway = Arc::clone(controller.gateway());

        controller.change_database(Some("archive".into()));
        let late = gateway.fetch_rows("shop", "users").await;
        controller.complete_rows_fetch(&ticket, late).unwrap();

        assert!(controller.store().rows().is_empty());
        assert_eq!(
            controller.store().selection().database.as_deref(),
            Some("archive")
        );
        assert_eq!(controller.phase(), &Phase::Idle);
    }

    #[tokio::test]
    async fn test_clearing_selection_mid_fetch_stops_loading() {
        let mut controller = loaded().await;
        let ticket = controller.begin_table_fetch().unwrap();
        assert!(controller.is_loading());

        controller.change_database(None);
        let late = controller.gateway().fetch_rows("shop", "users").await;
        controller.complete_rows_fetch(&ticket, late).unwrap();

        assert!(!controller.is_loading());
        assert_eq!(controller.phase(), &Phase::Idle);
    }

    #[tokio::test]
    async fn test_newer_fetch_stays_loading_after_stale_discard() {
        let mut controller = loaded().await;
        let stale = controller.begin_table_fetch().unwrap();

        controller.change_table(Some("users".into()));
        let current = controller.begin_table_fetch().unwrap();
        let late = controller.gateway().fetch_rows("shop", "users").await;
        controller.complete_rows_fetch(&stale, late).unwrap();
        assert!(controller.is_loading());

        let rows = controller.gateway().fetch_rows("shop", "users").await;
        controller.complete_rows_fetch(&current, rows).unwrap();
        assert_eq!(controller.phase(), &Phase::Idle);
        assert_eq!(controller.store().rows().len(), 3);
    }

    #[tokio::test]
    async fn test_forms_are_exclusive() {
        let mut controller = loaded().await;

        controller.open_add();
        assert_eq!(
            controller.modal(),
            &Modal::Adding(PendingRecord::template(controller.store().schema()))
        );
        assert_eq!(controller.form_fields().len(), 1);

        let row = controller.store().rows()[0].clone();
        controller.open_edit(&row);
        assert_eq!(controller.modal().kind(), Some(FormKind::Edit));
        assert_eq!(controller.form_fields().len(), 2);

        assert_eq!(
            controller.submit_add().await,
            Err(ViewerError::FormNotOpen(FormKind::Add))
        );
    }

    #[tokio::test]
    async fn test_add_success_refetches() {
        let mut controller = loaded().await;
        controller.open_add();
        controller
            .pending_mut()
            .unwrap()
            .set("name", json!("Carol"));

        controller.submit_add().await.unwrap();

        assert_eq!(controller.modal(), &Modal::Closed);
        assert_eq!(controller.store().rows().len(), 4);
        assert_eq!(controller.notice(), Some("Record added"));
        assert_eq!(
            controller.gateway().calls().last().map(String::as_str),
            Some("rows shop.users")
        );
    }

    #[tokio::test]
    async fn test_add_rejection_keeps_form_open() {
        let mut controller = loaded().await;
        *controller.gateway().rejection.lock().unwrap() = Some("Duplicate entry".into());
        controller.open_add();
        controller.pending_mut().unwrap().set("name", json!("Bob"));
        let rows_before = controller.store().rows().to_vec();

        let error = controller.submit_add().await.unwrap_err();

        assert_eq!(error.to_string(), "Failed to add record: Duplicate entry");
        assert_eq!(controller.error(), Some(&error));
        assert_eq!(controller.modal().kind(), Some(FormKind::Add));
        assert_eq!(
            controller.modal(),
            &Modal::Adding({
                let mut draft = PendingRecord::template(controller.store().schema());
                draft.set("name", json!("Bob"));
                draft
            })
        );
        assert_eq!(controller.store().rows(), rows_before.as_slice());
    }

    #[tokio::test]
    async fn test_update_addresses_primary_key() {
        let mut controller = loaded().await;
        let mut row = controller.store().rows()[1].clone();
        controller.open_edit(&row);
        controller
            .pending_mut()
            .unwrap()
            .set("name", json!("Alicia"));

        controller.submit_update().await.unwrap();

        assert!(controller
            .gateway()
            .calls()
            .contains(&"update shop.users user_id=2".to_string()));
        row.insert("name".into(), json!("Alicia"));
        assert_eq!(controller.store().rows()[1], row);
        assert_eq!(controller.modal(), &Modal::Closed);
    }

    #[tokio::test]
    async fn test_update_rejection_keeps_edit_form() {
        let mut controller = loaded().await;
        *controller.gateway().rejection.lock().unwrap() = Some("Duplicate entry".into());
        let row = controller.store().rows()[1].clone();
        controller.open_edit(&row);
        controller.pending_mut().unwrap().set("name", json!("Bob"));
        let rows_before = controller.store().rows().to_vec();

        let error = controller.submit_update().await.unwrap_err();

        assert_eq!(
            error,
            ViewerError::Mutation {
                operation: MutationKind::Update,
                reason: "Duplicate entry".into(),
            }
        );
        assert_eq!(controller.phase(), &Phase::Failed(error));
        let mut draft = PendingRecord::from_row(&row);
        draft.set("name", json!("Bob"));
        assert_eq!(controller.modal(), &Modal::Editing(draft));
        assert_eq!(controller.store().rows(), rows_before.as_slice());
        assert_eq!(controller.notice(), Some("Connected to server"));
    }

    #[tokio::test]
    async fn test_delete_rejection() {
        let mut controller = loaded().await;
        *controller.gateway().rejection.lock().unwrap() = Some("FOREIGN KEY constraint failed".into());
        let row = controller.store().rows()[0].clone();

        let error = controller.delete(&row, &|_: &str| true).await.unwrap_err();

        assert_eq!(
            error.to_string(),
            "Failed to delete record: FOREIGN KEY constraint failed"
        );
        assert_eq!(controller.error(), Some(&error));
        assert_eq!(controller.modal(), &Modal::Closed);
        assert_eq!(controller.store().rows().len(), 3);
        assert!(controller
            .gateway()
            .calls()
            .contains(&"delete shop.users user_id=1".to_string()));
    }

    #[tokio::test]
    async fn test_declined_delete_does_nothing() {
        let mut controller = loaded().await;
        let calls_before = controller.gateway().calls();
        let row = controller.store().rows()[0].clone();

        let deleted = controller.delete(&row, &|_: &str| false).await.unwrap();

        assert!(!deleted);
        assert_eq!(controller.gateway().calls(), calls_before);
        assert_eq!(controller.store().rows().len(), 3);
        assert_eq!(controller.phase(), &Phase::Idle);
    }

    #[tokio::test]
    async fn test_confirmed_delete() {
        let mut controller = loaded().await;
        let row = controller.store().rows()[0].clone();

        let deleted = controller
            .delete(&row, &|prompt: &str| prompt == DELETE_PROMPT)
            .await
            .unwrap();

        assert!(deleted);
        assert_eq!(controller.store().rows().len(), 2);
        assert_eq!(controller.notice(), Some("Record deleted"));
    }

    #[tokio::test]
    async fn test_fetch_failure_clears_rows() {
        let mut controller = loaded().await;
        *controller.gateway().offline.lock().unwrap() = true;

        let error = controller.refresh_rows().await.unwrap_err();

        assert!(controller.store().rows().is_empty());
        assert!(matches!(
            &error,
            ViewerError::Fetch { scope: FetchScope::Rows { table, .. }, .. } if table == "users"
        ));
        assert_eq!(controller.phase(), &Phase::Failed(error));
    }

    #[tokio::test]
    async fn test_connectivity_banner_clears_on_recovery() {
        let mut controller = ViewerController::new(MockGateway::new(), ViewerConfig::default());
        *controller.gateway().offline.lock().unwrap() = true;

        assert!(controller.check_status().await.is_err());
        assert!(matches!(
            controller.connectivity(),
            Some(ViewerError::Connectivity(_))
        ));

        *controller.gateway().offline.lock().unwrap() = false;
        controller.check_status().await.unwrap();
        assert_eq!(controller.connectivity(), None);
    }

    #[tokio::test]
    async fn test_mutations_need_a_table() {
        let mut controller = ViewerController::new(MockGateway::new(), ViewerConfig::default());
        controller.open_add();
        assert_eq!(
            controller.submit_add().await,
            Err(ViewerError::NoTableSelected)
        );
        assert!(controller.gateway().calls().is_empty());
    }
}
