//! # json2sql - JSON to SQL Converter
//!
//! Turns a JSON document (an object, an array of objects, or a bare
//! primitive) into a SQLite script: one `CREATE TABLE IF NOT EXISTS`
//! statement followed by one `INSERT` per record.
//!
//! ## Modules
//!
//! - **naming**: Derive table names from source URLs
//! - **schema**: Infer column names and types from the first record
//! - **emit**: Encode values and emit INSERT statements
//! - **script**: Compose schema and inserts into a complete script
//! - **fetch**: Retrieve and decode JSON over HTTP or from local files
//! - **output**: Persist scripts without overwriting existing files
//!
//! ## Quick Start
//!
//! ```rust
//! use json2sql::{derive_table_name, json_to_sql};
//! use serde_json::json;
//!
//! let data = json!([
//!     {"name": "O'Brien", "active": true},
//!     {"name": "Alice", "active": false, "extra": "dropped"}
//! ]);
//!
//! let table = derive_table_name("https://api.example.com/v1/users.json");
//! let script = json_to_sql(&data, &table);
//!
//! assert_eq!(
//!     script.inserts().next(),
//!     Some("INSERT INTO users (name, active) VALUES ('O''Brien', 1);")
//! );
//! ```
//!
//! Column types come from the first record only. Later records that omit a
//! key get `NULL`; keys the first record lacked are dropped.

use serde_json::Value;
use std::io::Read;

pub mod emit;
pub mod error;
pub mod fetch;
pub mod naming;
pub mod output;
pub mod schema;
pub mod script;
pub mod types;

// Re-export commonly used types for convenience
pub use emit::{emit_inserts, StatementEmitter};
pub use error::{DecodeError, Error, FetchError, PersistenceError, Result, SchemaError};
pub use fetch::Fetcher;
pub use naming::{derive_table_name, table_name_for};
pub use output::ScriptWriter;
pub use schema::{infer_schema, SchemaGenerator, TableSchema};
pub use script::{ScriptBuilder, SqlScript, Statement};
pub use types::{Column, IdentifierPolicy, RecordSequence, SqlConfig, SqlType};

/// Main entry point: convert a decoded JSON value into a script for `table`
///
/// Uses the default configuration (legacy identifiers, header without timestamp).
pub fn json_to_sql(value: &Value, table: &str) -> SqlScript {
    ScriptBuilder::new(table, SqlConfig::default()).build(value)
}

/// Read one JSON document from `reader` and convert it
pub fn convert_reader<R: Read>(mut reader: R, table: &str, config: SqlConfig) -> Result<SqlScript> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let value = fetch::decode_json(&bytes)?;
    Ok(ScriptBuilder::new(table, config).build(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basic_conversion() {
        let input = json!([
            {"id": 1, "name": "Alice", "tags": ["a", "b"]},
            {"id": 2, "name": "Bob"}
        ]);

        let script = json_to_sql(&input, "people");

        assert_eq!(script.schema().columns.len(), 4);
        assert_eq!(script.inserts().count(), 2);
        assert!(script
            .render()
            .contains("INSERT INTO people (id_2, name, tags) VALUES (2, 'Bob', NULL);"));
    }

    #[test]
    fn test_convert_reader() {
        let input = br#"{"value": 3.14}"#;
        let config = SqlConfig {
            include_header: false,
            ..SqlConfig::default()
        };
        let script = convert_reader(&input[..], "pi", config).unwrap();
        assert_eq!(
            script.render(),
            "CREATE TABLE IF NOT EXISTS pi (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n    value REAL\n);\n\n\
             INSERT INTO pi (value) VALUES (3.14);\n"
        );
    }

    #[test]
    fn test_convert_reader_malformed() {
        let err = convert_reader(&b"[{\"a\": 1,]"[..], "t", SqlConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
