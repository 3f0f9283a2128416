//! First-record schema inference
//!
//! Column names and types are fixed from the keys of the first record, in
//! insertion order. Later records never change the column list.

use crate::error::SchemaError;
use crate::naming::sanitize_identifier;
use crate::types::{kind_name, Column, IdentifierPolicy, SqlType, SCALAR_COLUMN, SURROGATE_KEY};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Statement emitted in place of CREATE TABLE when there are no records
pub const NO_DATA_COMMENT: &str = "-- No data to insert";

/// Inferred table layout: the surrogate key followed by one column per key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    /// Schema with no columns, produced for an empty record sequence
    pub fn empty(table: impl Into<String>) -> Self {
        TableSchema {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// Surrogate key plus a single `value TEXT` column, used when the input has no keyed records
    pub fn scalar(table: impl Into<String>) -> Self {
        TableSchema {
            table: table.into(),
            columns: vec![
                Column::surrogate_key(),
                Column::new(SCALAR_COLUMN, SqlType::Text),
            ],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns that receive values from the input (everything but the surrogate key)
    pub fn data_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.primary_key)
    }

    /// The idempotent CREATE TABLE statement for this schema
    pub fn create_statement(&self) -> String {
        if self.is_empty() {
            return NO_DATA_COMMENT.to_string();
        }

        let definitions: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.definition()))
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            self.table,
            definitions.join(",\n")
        )
    }
}

/// Infers a [`TableSchema`] from the first record of a sequence
#[derive(Debug, Clone)]
pub struct SchemaGenerator {
    table: String,
    policy: IdentifierPolicy,
}

impl SchemaGenerator {
    pub fn new(table: impl Into<String>, policy: IdentifierPolicy) -> Self {
        SchemaGenerator {
            table: table.into(),
            policy,
        }
    }

    /// Infer columns from `records[0]`
    ///
    /// An empty sequence yields an empty schema. A first record that is not an
    /// object fails with [`SchemaError::NonObjectRecord`]; no partial schema is built.
    pub fn infer(&self, records: &[Value]) -> Result<TableSchema, SchemaError> {
        let Some(first) = records.first() else {
            tracing::debug!(table = %self.table, "no records, emitting empty schema");
            return Ok(TableSchema::empty(&self.table));
        };

        let Value::Object(fields) = first else {
            return Err(SchemaError::NonObjectRecord {
                found: kind_name(first),
            });
        };

        let mut columns = Vec::with_capacity(fields.len() + 1);
        columns.push(Column::surrogate_key());

        let mut taken: HashSet<String> = HashSet::from([SURROGATE_KEY.to_string()]);
        for (key, sample) in fields {
            let sql_type = SqlType::from_value(sample);
            let base = match self.policy {
                IdentifierPolicy::Legacy => key.clone(),
                IdentifierPolicy::Strict => sanitize_identifier(key, "column"),
            };
            // Column names stay unique under either policy; a data key `id`
            // becomes `id_2` next to the surrogate key.
            let name = unique_name(base, &mut taken);
            let column = if &name == key {
                Column::new(name, sql_type)
            } else {
                Column::renamed(name, key.clone(), sql_type)
            };
            columns.push(column);
        }

        tracing::debug!(
            table = %self.table,
            columns = columns.len(),
            "inferred schema from first record"
        );

        Ok(TableSchema {
            table: self.table.clone(),
            columns,
        })
    }
}

/// Infer a schema with the legacy identifier policy
pub fn infer_schema(table: &str, records: &[Value]) -> Result<TableSchema, SchemaError> {
    SchemaGenerator::new(table, IdentifierPolicy::Legacy).infer(records)
}

/// Suffix `_2`, `_3`, ... until the name is not taken, then reserve it.
/// SQLite column names are case-insensitive, so `taken` holds lowercased names.
fn unique_name(base: String, taken: &mut HashSet<String>) -> String {
    let mut name = base.clone();
    let mut suffix = 2;
    while taken.contains(&name.to_lowercase()) {
        name = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    taken.insert(name.to_lowercase());
    name
}
