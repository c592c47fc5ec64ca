//! Draft records for the add and edit forms

use serde_json::Value;

use crate::error::FormKind;
use crate::schema::{ColumnSchema, Row};

/// Input control hint derived from a column's declared type
///
/// This is the only client-side typing; constraint checks belong to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Number,
    Date,
    Text,
}

impl InputKind {
    pub fn for_type(data_type: &str) -> Self {
        let lowered = data_type.to_lowercase();
        if lowered.contains("int") {
            InputKind::Number
        } else if lowered.contains("date") {
            InputKind::Date
        } else {
            InputKind::Text
        }
    }
}

/// One input of the add or edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub field: String,
    pub data_type: String,
    pub input: InputKind,
    pub placeholder: String,
    pub disabled: bool,
}

/// Inputs to render for a form
///
/// The add form omits auto-increment columns; the edit form shows every column
/// and locks an auto-increment primary key.
pub fn form_fields(schema: &[ColumnSchema], kind: FormKind) -> Vec<FormField> {
    schema
        .iter()
        .filter(|column| kind == FormKind::Edit || !column.is_auto_increment)
        .map(|column| FormField {
            field: column.field.clone(),
            data_type: column.data_type.clone(),
            input: InputKind::for_type(&column.data_type),
            placeholder: match kind {
                FormKind::Add if column.nullable => format!("{} (optional)", column.data_type),
                FormKind::Add => format!("{} (required)", column.data_type),
                FormKind::Edit => column.data_type.clone(),
            },
            disabled: kind == FormKind::Edit && column.is_primary && column.is_auto_increment,
        })
        .collect()
}

/// Record being drafted in a form, not yet committed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingRecord {
    values: Row,
}

impl PendingRecord {
    /// Empty draft for the add form: every non-auto-increment column set to null
    pub fn template(schema: &[ColumnSchema]) -> Self {
        let values = schema
            .iter()
            .filter(|column| !column.is_auto_increment)
            .map(|column| (column.field.clone(), Value::Null))
            .collect();
        Self { values }
    }

    /// Draft for the edit form, copied from an existing row
    pub fn from_row(row: &Row) -> Self {
        Self {
            values: row.clone(),
        }
    }

    pub fn values(&self) -> &Row {
        &self.values
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.values.insert(field.into(), value);
    }

    /// Store raw input text for a column
    ///
    /// Empty input becomes null; integer text in a number input becomes a number.
    pub fn set_input(&mut self, column: &ColumnSchema, raw: &str) {
        let value = if raw.is_empty() {
            Value::Null
        } else if InputKind::for_type(&column.data_type) == InputKind::Number {
            raw.trim()
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(raw.to_string()))
        } else {
            Value::String(raw.to_string())
        };
        self.set(column.field.clone(), value);
    }

    /// Text to show in the input, empty for null
    pub fn input_text(&self, field: &str) -> String {
        match self.values.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Vec<ColumnSchema> {
        vec![
            ColumnSchema {
                field: "id".into(),
                data_type: "INTEGER".into(),
                nullable: false,
                is_primary: true,
                is_auto_increment: true,
            },
            ColumnSchema {
                field: "name".into(),
                data_type: "VARCHAR(50)".into(),
                nullable: false,
                is_primary: false,
                is_auto_increment: false,
            },
            ColumnSchema {
                field: "hired".into(),
                data_type: "DATE".into(),
                nullable: true,
                is_primary: false,
                is_auto_increment: false,
            },
        ]
    }

    #[test]
    fn test_input_kind() {
        assert_eq!(InputKind::for_type("INTEGER"), InputKind::Number);
        assert_eq!(InputKind::for_type("bigint(20)"), InputKind::Number);
        assert_eq!(InputKind::for_type("DATETIME"), InputKind::Date);
        assert_eq!(InputKind::for_type("TEXT"), InputKind::Text);
    }

    #[test]
    fn test_template_skips_auto_increment() {
        let template = PendingRecord::template(&schema());
        assert_eq!(
            template.values(),
            json!({ "name": null, "hired": null }).as_object().unwrap()
        );
    }

    #[test]
    fn test_add_form_fields() {
        let fields = form_fields(&schema(), FormKind::Add);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].placeholder, "VARCHAR(50) (required)");
        assert_eq!(fields[1].placeholder, "DATE (optional)");
        assert_eq!(fields[1].input, InputKind::Date);
        assert!(fields.iter().all(|field| !field.disabled));
    }

    #[test]
    fn test_edit_form_locks_auto_increment_key() {
        let fields = form_fields(&schema(), FormKind::Edit);
        assert_eq!(fields.len(), 3);
        assert!(fields[0].disabled);
        assert_eq!(fields[0].placeholder, "INTEGER");
        assert!(!fields[1].disabled);
    }

    #[test]
    fn test_set_input() {
        let schema = schema();
        let mut record = PendingRecord::template(&schema);

        record.set_input(&schema[1], "Alice");
        assert_eq!(record.get("name"), Some(&json!("Alice")));
        record.set_input(&schema[1], "");
        assert_eq!(record.get("name"), Some(&Value::Null));

        record.set_input(&schema[0], "42");
        assert_eq!(record.get("id"), Some(&json!(42)));
        record.set_input(&schema[0], "4x");
        assert_eq!(record.get("id"), Some(&json!("4x")));
        assert_eq!(record.input_text("id"), "4x");
        assert_eq!(record.input_text("hired"), "");
    }
}
