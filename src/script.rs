//! Script assembly
//!
//! Composes schema inference and INSERT emission into a complete [`SqlScript`].

use crate::emit::{scalar_insert, StatementEmitter};
use crate::error::SchemaError;
use crate::schema::{SchemaGenerator, TableSchema, NO_DATA_COMMENT};
use crate::types::{RecordSequence, SqlConfig};
use serde_json::Value;
use std::fmt;

const SCALAR_COMMENT: &str = "-- Simple value detected";

/// One line of output SQL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Comment(String),
    CreateTable(String),
    Insert(String),
}

impl Statement {
    pub fn as_str(&self) -> &str {
        match self {
            Statement::Comment(s) | Statement::CreateTable(s) | Statement::Insert(s) => s,
        }
    }
}

/// A generated script: optional header comment, then schema and data statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlScript {
    header: Vec<String>,
    schema: TableSchema,
    statements: Vec<Statement>,
}

impl SqlScript {
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn create_table(&self) -> Option<&str> {
        self.statements.iter().find_map(|s| match s {
            Statement::CreateTable(sql) => Some(sql.as_str()),
            _ => None,
        })
    }

    pub fn inserts(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Insert(sql) => Some(sql.as_str()),
            _ => None,
        })
    }

    /// Render to text. Every statement ends with a newline; the header and
    /// the CREATE TABLE statement are each followed by a blank line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.header {
            out.push_str(line);
            out.push('\n');
        }
        if !self.header.is_empty() {
            out.push('\n');
        }
        for statement in &self.statements {
            out.push_str(statement.as_str());
            out.push('\n');
            if matches!(statement, Statement::CreateTable(_)) {
                out.push('\n');
            }
        }
        out
    }
}

impl fmt::Display for SqlScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Builds a [`SqlScript`] for one table
pub struct ScriptBuilder {
    table: String,
    config: SqlConfig,
}

impl ScriptBuilder {
    pub fn new(table: impl Into<String>, config: SqlConfig) -> Self {
        ScriptBuilder {
            table: table.into(),
            config,
        }
    }

    /// Normalize a decoded value and build its script
    pub fn build(&self, value: &Value) -> SqlScript {
        self.build_records(RecordSequence::from_value(value))
    }

    pub fn build_records(&self, records: RecordSequence<'_>) -> SqlScript {
        match records {
            RecordSequence::Scalar(value) => self.primitive_script(value),
            RecordSequence::Records(records) => {
                let generator = SchemaGenerator::new(&self.table, self.config.identifiers);
                match generator.infer(records) {
                    Ok(schema) if schema.is_empty() => SqlScript {
                        header: Vec::new(),
                        schema,
                        statements: vec![Statement::Comment(NO_DATA_COMMENT.to_string())],
                    },
                    Ok(schema) => self.table_script(schema, records),
                    Err(SchemaError::NonObjectRecord { found }) => {
                        tracing::warn!(
                            table = %self.table,
                            found,
                            "first record is not an object; storing each record in a single `value` column"
                        );
                        self.value_column_script(records)
                    }
                }
            }
        }
    }

    fn table_script(&self, schema: TableSchema, records: &[Value]) -> SqlScript {
        let mut statements = Vec::with_capacity(records.len() + 1);
        statements.push(Statement::CreateTable(schema.create_statement()));
        statements.extend(
            StatementEmitter::for_schema(&schema)
                .emit(records)
                .into_iter()
                .map(Statement::Insert),
        );

        tracing::debug!(table = %self.table, inserts = records.len(), "generated script");

        SqlScript {
            header: self.header(),
            schema,
            statements,
        }
    }

    /// A bare primitive: the comment and a single INSERT, nothing else
    fn primitive_script(&self, value: &Value) -> SqlScript {
        SqlScript {
            header: Vec::new(),
            schema: TableSchema::scalar(&self.table),
            statements: vec![
                Statement::Comment(SCALAR_COMMENT.to_string()),
                Statement::Insert(scalar_insert(&self.table, value)),
            ],
        }
    }

    /// Records without keys: a `value` table holding one row per record
    fn value_column_script(&self, values: &[Value]) -> SqlScript {
        let schema = TableSchema::scalar(&self.table);

        let mut statements = Vec::with_capacity(values.len() + 1);
        statements.push(Statement::CreateTable(schema.create_statement()));
        statements.extend(
            values
                .iter()
                .map(|value| Statement::Insert(scalar_insert(&self.table, value))),
        );

        SqlScript {
            header: self.header(),
            schema,
            statements,
        }
    }

    fn header(&self) -> Vec<String> {
        if !self.config.include_header {
            return Vec::new();
        }

        let mut lines = vec![
            "-- SQL generated from JSON API".to_string(),
            format!("-- Table: {}", self.table),
        ];
        if let Some(source) = &self.config.source {
            lines.push(format!("-- Source: {}", source));
        }
        if let Some(at) = &self.config.generated_at {
            lines.push(format!("-- Generated: {}", at.to_rfc3339()));
        }
        lines
    }
}
