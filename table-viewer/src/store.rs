//! Table state store
//!
//! Holds the current database/table selection and everything fetched for it.
//! Each selection change bumps an epoch; fetch results carry the epoch they
//! were started under and are dropped when it no longer matches, so a late
//! response for an old selection cannot overwrite the new one.

use crate::schema::{primary_key_of, ColumnSchema, Relation, Row, TableData};

/// Current database and table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub database: Option<String>,
    pub table: Option<String>,
}

/// Identity of an outstanding fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    epoch: u64,
    database: String,
    table: Option<String>,
}

impl FetchTicket {
    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }
}

#[derive(Debug, Default)]
pub struct TableStore {
    databases: Vec<String>,
    tables: Vec<String>,
    relations: Vec<Relation>,
    selection: Selection,
    rows: Vec<Row>,
    columns: Vec<String>,
    schema: Vec<ColumnSchema>,
    epoch: u64,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn databases(&self) -> &[String] {
        &self.databases
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn schema(&self) -> &[ColumnSchema] {
        &self.schema
    }

    /// Column addressing rows for update and delete
    pub fn primary_key(&self) -> &str {
        primary_key_of(&self.schema)
    }

    pub fn set_databases(&mut self, databases: Vec<String>) {
        self.databases = databases;
    }

    /// Switch database; clears the table list, table selection and table data
    pub fn select_database(&mut self, database: Option<String>) {
        self.selection = Selection {
            database: database.filter(|name| !name.is_empty()),
            table: None,
        };
        self.tables.clear();
        self.relations.clear();
        self.clear_table_data();
        self.epoch += 1;
    }

    /// Switch table within the selected database; clears rows, columns and schema
    pub fn select_table(&mut self, table: Option<String>) {
        self.selection.table = table.filter(|name| !name.is_empty());
        self.clear_table_data();
        self.epoch += 1;
    }

    fn clear_table_data(&mut self) {
        self.rows.clear();
        self.columns.clear();
        self.schema.clear();
    }

    /// Ticket for a fetch scoped to the selected database
    pub fn database_ticket(&self) -> Option<FetchTicket> {
        Some(FetchTicket {
            epoch: self.epoch,
            database: self.selection.database.clone()?,
            table: None,
        })
    }

    /// Ticket for a fetch scoped to the selected table
    pub fn table_ticket(&self) -> Option<FetchTicket> {
        Some(FetchTicket {
            epoch: self.epoch,
            database: self.selection.database.clone()?,
            table: Some(self.selection.table.clone()?),
        })
    }

    /// Whether a fetch started under `ticket` still targets the current selection
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.epoch == self.epoch
    }

    /// Store a table listing; returns `false` when the ticket is stale
    pub fn apply_tables(&mut self, ticket: &FetchTicket, tables: Vec<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.tables = tables;
        true
    }

    /// Replace rows and columns wholesale; returns `false` when the ticket is stale
    pub fn apply_rows(&mut self, ticket: &FetchTicket, table: TableData) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.rows = table.data;
        self.columns = table.columns;
        true
    }

    /// Replace the column schema; returns `false` when the ticket is stale
    pub fn apply_schema(&mut self, ticket: &FetchTicket, schema: Vec<ColumnSchema>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.schema = schema;
        true
    }

    /// Store relations; returns `false` when the ticket is stale
    pub fn apply_relations(&mut self, ticket: &FetchTicket, relations: Vec<Relation>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.relations = relations;
        true
    }
}
