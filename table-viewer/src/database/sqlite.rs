//! SQLite database provider implementation
//!
//! SQLite has no server-level database catalogue, so the schemas reported by
//! `PRAGMA database_list` (`main`, `temp` and attached files) act as databases.

use crate::database::traits::{DatabaseError, DatabaseProvider};
use crate::schema::{ColumnSchema, Relation, Row, TableData, DEFAULT_PRIMARY_KEY};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Column, Row as _, SqlitePool, TypeInfo, ValueRef};
use std::future::Future;
use std::time::Duration;

/// Maximum number of rows returned by a table fetch
const MAX_FETCH_ROWS: i64 = 1000;

/// Time limit for a single mutation statement
const MUTATION_TIMEOUT: Duration = Duration::from_secs(30);

/// SQLite database provider
pub struct SqliteProvider {
    pool: SqlitePool,
}

impl SqliteProvider {
    /// Create a new SQLite provider
    ///
    /// # Arguments
    ///
    /// * `pool` - SQLite connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Quote an identifier (schema, table or column name) to prevent SQL injection
    ///
    /// SQLite uses double quotes for identifiers. This function escapes any
    /// double quotes in the identifier by doubling them.
    fn quote_identifier(identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    /// Schema-qualified, quoted table name
    fn qualified_table(database: &str, table: &str) -> String {
        format!(
            "{}.{}",
            Self::quote_identifier(database),
            Self::quote_identifier(table)
        )
    }

    /// Fail with `DatabaseNotFound` unless the schema is attached
    async fn ensure_database(&self, database: &str) -> Result<(), DatabaseError> {
        if self.list_databases().await?.iter().any(|name| name == database) {
            Ok(())
        } else {
            Err(DatabaseError::DatabaseNotFound(database.to_string()))
        }
    }

    /// Read column metadata through `PRAGMA table_info`
    ///
    /// An empty result means the table does not exist.
    async fn table_columns(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<ColumnSchema>, DatabaseError> {
        self.ensure_database(database).await?;

        let table_info_query = format!(
            "PRAGMA {}.table_info({})",
            Self::quote_identifier(database),
            Self::quote_identifier(table)
        );
        let column_rows = sqlx::query(&table_info_query)
            .fetch_all(&self.pool)
            .await?;

        if column_rows.is_empty() {
            return Err(DatabaseError::TableNotFound(table.to_string()));
        }

        // PRAGMA table_info returns: cid, name, type, notnull, dflt_value, pk
        let mut columns = Vec::with_capacity(column_rows.len());
        for row in &column_rows {
            let field: String = row.try_get("name")?;
            let data_type: String = row.try_get("type")?;
            let not_null: i32 = row.try_get("notnull")?;
            let primary_key: i32 = row.try_get("pk")?;

            columns.push(ColumnSchema {
                field,
                data_type,
                nullable: not_null == 0,
                is_primary: primary_key > 0,
                is_auto_increment: false,
            });
        }

        // A lone INTEGER PRIMARY KEY aliases the rowid and is assigned on insert
        let primary_count = columns.iter().filter(|column| column.is_primary).count();
        if primary_count == 1 {
            for column in columns.iter_mut().filter(|column| column.is_primary) {
                column.is_auto_increment = column.data_type.eq_ignore_ascii_case("INTEGER");
            }
        }

        Ok(columns)
    }

    /// Reject any name that is not a column of the table
    fn check_columns<'a>(
        columns: &[ColumnSchema],
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), DatabaseError> {
        for name in names {
            if !columns.iter().any(|column| column.field == name) {
                return Err(DatabaseError::InvalidColumn(name.to_string()));
            }
        }
        Ok(())
    }

    /// Bind a JSON value as a statement parameter
    fn bind_value<'q>(
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
        column: &str,
        value: &Value,
    ) -> Result<Query<'q, Sqlite, SqliteArguments<'q>>, DatabaseError> {
        let query = match value {
            Value::Null => query.bind(Option::<String>::None),
            Value::Bool(flag) => query.bind(*flag),
            Value::Number(number) => {
                if let Some(integer) = number.as_i64() {
                    query.bind(integer)
                } else if number.is_f64() {
                    match number.as_f64() {
                        Some(real) => query.bind(real),
                        None => return Err(DatabaseError::UnsupportedValue(column.to_string())),
                    }
                } else {
                    // u64 beyond i64::MAX cannot be stored without losing precision
                    return Err(DatabaseError::UnsupportedValue(column.to_string()));
                }
            }
            Value::String(text) => query.bind(text.clone()),
            Value::Array(_) | Value::Object(_) => query.bind(value.to_string()),
        };
        Ok(query)
    }

    /// Run a mutation future under [`MUTATION_TIMEOUT`]
    async fn with_timeout<T>(
        future: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, DatabaseError> {
        match tokio::time::timeout(MUTATION_TIMEOUT, future).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(DatabaseError::Timeout),
        }
    }

    /// Convert a SQLite row to a JSON object
    fn row_to_json(row: &SqliteRow) -> Result<Row, DatabaseError> {
        let mut map = Row::new();

        for column in row.columns() {
            let value = Self::extract_column_value(row, column)?;
            map.insert(column.name().to_string(), value);
        }

        Ok(map)
    }

    /// Extract a column value from a SQLite row and convert to JSON
    fn extract_column_value(
        row: &SqliteRow,
        column: &sqlx::sqlite::SqliteColumn,
    ) -> Result<Value, DatabaseError> {
        let index = column.ordinal();

        if row
            .try_get_raw(index)
            .map_err(|error| DatabaseError::Query(error.to_string()))?
            .is_null()
        {
            return Ok(Value::Null);
        }

        // SQLite reports affinities (INTEGER, REAL, TEXT, BLOB) plus a few declared names
        match column.type_info().name() {
            "INTEGER" | "BIGINT" => {
                if let Ok(value) = row.try_get::<i64, _>(index) {
                    return Ok(Value::from(value));
                }
            }
            "REAL" | "FLOAT" | "DOUBLE" => {
                if let Ok(value) = row.try_get::<f64, _>(index) {
                    if let Some(number) = serde_json::Number::from_f64(value) {
                        return Ok(Value::Number(number));
                    }
                }
            }
            "BOOLEAN" | "BOOL" => {
                if let Ok(value) = row.try_get::<bool, _>(index) {
                    return Ok(Value::Bool(value));
                }
            }
            "BLOB" => {
                if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
                    return Ok(Value::String(describe_blob(&value)));
                }
            }
            _ => {
                if let Ok(value) = row.try_get::<String, _>(index) {
                    return Ok(Value::String(value));
                }
            }
        }

        // Dynamic typing lets any cell hold any storage class
        if let Ok(value) = row.try_get::<i64, _>(index) {
            return Ok(Value::from(value));
        }
        if let Ok(value) = row.try_get::<f64, _>(index) {
            if let Some(number) = serde_json::Number::from_f64(value) {
                return Ok(Value::Number(number));
            }
        }
        if let Ok(value) = row.try_get::<String, _>(index) {
            return Ok(Value::String(value));
        }
        if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
            return Ok(Value::String(describe_blob(&value)));
        }

        Ok(Value::Null)
    }
}

#[async_trait]
impl DatabaseProvider for SqliteProvider {
    fn default_database(&self) -> &str {
        "main"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn list_databases(&self) -> Result<Vec<String>, DatabaseError> {
        // PRAGMA database_list returns: seq, name, file
        let rows = sqlx::query("PRAGMA database_list")
            .fetch_all(&self.pool)
            .await?;

        let mut databases = Vec::with_capacity(rows.len());
        for row in rows {
            databases.push(row.try_get::<String, _>("name")?);
        }
        Ok(databases)
    }

    async fn list_tables(&self, database: &str) -> Result<Vec<String>, DatabaseError> {
        self.ensure_database(database).await?;

        let query = format!(
            "SELECT name FROM {}.sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            Self::quote_identifier(database)
        );
        let tables = sqlx::query_scalar::<_, String>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(tables)
    }

    async fn fetch_rows(&self, database: &str, table: &str) -> Result<TableData, DatabaseError> {
        let schema = self.table_columns(database, table).await?;

        let select_query = format!(
            "SELECT * FROM {} LIMIT ?",
            Self::qualified_table(database, table)
        );
        let rows = sqlx::query(&select_query)
            .bind(MAX_FETCH_ROWS)
            .fetch_all(&self.pool)
            .await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in &rows {
            data.push(Self::row_to_json(row)?);
        }

        Ok(TableData {
            data,
            columns: schema.into_iter().map(|column| column.field).collect(),
        })
    }

    async fn schema_details(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<ColumnSchema>, DatabaseError> {
        self.table_columns(database, table).await
    }

    async fn list_relations(&self, database: &str) -> Result<Vec<Relation>, DatabaseError> {
        let mut relations = Vec::new();

        for table in self.list_tables(database).await? {
            let foreign_key_query = format!(
                "PRAGMA {}.foreign_key_list({})",
                Self::quote_identifier(database),
                Self::quote_identifier(&table)
            );
            let foreign_key_rows = sqlx::query(&foreign_key_query)
                .fetch_all(&self.pool)
                .await?;

            // PRAGMA foreign_key_list returns: id, seq, table, from, to, on_update, on_delete, match
            for row in foreign_key_rows {
                let column: String = row.try_get("from")?;
                let referenced_table: String = row.try_get("table")?;
                // `to` is NULL when the key references the parent's primary key implicitly
                let referenced_column: Option<String> = row.try_get("to")?;

                relations.push(Relation {
                    table: table.clone(),
                    column,
                    referenced_table,
                    referenced_column: referenced_column
                        .unwrap_or_else(|| DEFAULT_PRIMARY_KEY.to_string()),
                });
            }
        }

        Ok(relations)
    }

    async fn add_row(&self, database: &str, table: &str, record: &Row) -> Result<(), DatabaseError> {
        let columns = self.table_columns(database, table).await?;
        Self::check_columns(&columns, record.keys().map(String::as_str))?;

        let insert_query = if record.is_empty() {
            format!(
                "INSERT INTO {} DEFAULT VALUES",
                Self::qualified_table(database, table)
            )
        } else {
            let names: Vec<String> = record.keys().map(|name| Self::quote_identifier(name)).collect();
            let placeholders = vec!["?"; record.len()].join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                Self::qualified_table(database, table),
                names.join(", "),
                placeholders
            )
        };

        let mut query = sqlx::query(&insert_query);
        for (column, value) in record {
            query = Self::bind_value(query, column, value)?;
        }

        Self::with_timeout(query.execute(&self.pool)).await?;
        Ok(())
    }

    async fn update_row(
        &self,
        database: &str,
        table: &str,
        id: &str,
        record: &Row,
        id_column: &str,
    ) -> Result<(), DatabaseError> {
        if record.is_empty() {
            return Err(DatabaseError::EmptyRecord);
        }

        let columns = self.table_columns(database, table).await?;
        Self::check_columns(
            &columns,
            record.keys().map(String::as_str).chain([id_column]),
        )?;

        let assignments: Vec<String> = record
            .keys()
            .map(|name| format!("{} = ?", Self::quote_identifier(name)))
            .collect();
        let update_query = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            Self::qualified_table(database, table),
            assignments.join(", "),
            Self::quote_identifier(id_column)
        );

        let mut query = sqlx::query(&update_query);
        for (column, value) in record {
            query = Self::bind_value(query, column, value)?;
        }
        query = query.bind(id.to_string());

        let result = Self::with_timeout(query.execute(&self.pool)).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::RowNotFound {
                column: id_column.to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }

    async fn delete_row(
        &self,
        database: &str,
        table: &str,
        id: &str,
        id_column: &str,
    ) -> Result<(), DatabaseError> {
        let columns = self.table_columns(database, table).await?;
        Self::check_columns(&columns, [id_column])?;

        let delete_query = format!(
            "DELETE FROM {} WHERE {} = ?",
            Self::qualified_table(database, table),
            Self::quote_identifier(id_column)
        );

        let result = Self::with_timeout(
            sqlx::query(&delete_query)
                .bind(id.to_string())
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::RowNotFound {
                column: id_column.to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}

/// Describe BLOB data as text, showing at most 64 bytes as hex
fn describe_blob(data: &[u8]) -> String {
    let shown = &data[..data.len().min(64)];
    let mut hex: String = shown.iter().map(|byte| format!("{:02x}", byte)).collect();
    if data.len() > shown.len() {
        hex.push_str("...");
    }
    format!("[BLOB: {} bytes, hex: {}]", data.len(), hex)
}
