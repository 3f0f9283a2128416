//! INSERT statement generation
//!
//! Each record becomes one self-contained INSERT. Values are encoded per
//! column in the order fixed by the schema:
//!
//! | value            | SQL literal                           |
//! |------------------|---------------------------------------|
//! | missing or null  | `NULL`                                |
//! | object / array   | compact JSON text, single-quoted      |
//! | boolean          | `1` / `0`                             |
//! | string           | single-quoted, `'` doubled            |
//! | number           | decimal, unquoted                     |

use crate::schema::TableSchema;
use crate::types::{Column, SCALAR_COLUMN};
use serde_json::Value;

/// Wrap text in single quotes, doubling any embedded quote
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Encode a record's value for one column. `None` means the key was absent.
pub fn encode_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "NULL".to_string(),
        Some(nested @ (Value::Object(_) | Value::Array(_))) => quote_literal(&nested.to_string()),
        Some(Value::Bool(b)) => u8::from(*b).to_string(),
        Some(Value::String(s)) => quote_literal(s),
        Some(Value::Number(n)) => n.to_string(),
    }
}

/// Stringified form of a bare primitive for the single-column path
pub fn encode_scalar(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => quote_literal(s),
        Value::Bool(b) => quote_literal(&b.to_string()),
        Value::Number(n) => quote_literal(&n.to_string()),
        nested => quote_literal(&nested.to_string()),
    }
}

/// The single INSERT for a primitive value under the synthetic `value` column
pub fn scalar_insert(table: &str, value: &Value) -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        table,
        SCALAR_COLUMN,
        encode_scalar(value)
    )
}

/// Emits INSERT statements against a fixed column list
pub struct StatementEmitter<'a> {
    table: &'a str,
    columns: Vec<&'a Column>,
    column_list: String,
}

impl<'a> StatementEmitter<'a> {
    /// The surrogate key is skipped; it is filled in by the database.
    pub fn new(table: &'a str, columns: &'a [Column]) -> Self {
        let columns: Vec<&Column> = columns.iter().filter(|c| !c.primary_key).collect();
        let column_list = columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        StatementEmitter {
            table,
            columns,
            column_list,
        }
    }

    pub fn for_schema(schema: &'a TableSchema) -> Self {
        Self::new(&schema.table, &schema.columns)
    }

    /// One INSERT for one record. Keys outside the column list are dropped;
    /// a record that is not an object encodes every column as NULL.
    pub fn insert(&self, record: &Value) -> String {
        let fields = record.as_object();
        let values: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                let value = match (fields, column.key.as_deref()) {
                    (Some(fields), Some(key)) => fields.get(key),
                    _ => None,
                };
                encode_value(value)
            })
            .collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({});",
            self.table,
            self.column_list,
            values.join(", ")
        )
    }

    /// Keys of `record` that no column reads from
    pub fn dropped_keys<'r>(&self, record: &'r Value) -> Vec<&'r str> {
        let Some(fields) = record.as_object() else {
            return Vec::new();
        };
        fields
            .keys()
            .map(String::as_str)
            .filter(|key| !self.columns.iter().any(|c| c.key.as_deref() == Some(*key)))
            .collect()
    }

    /// One INSERT per record, in input order
    pub fn emit(&self, records: &[Value]) -> Vec<String> {
        for (idx, record) in records.iter().enumerate() {
            if !record.is_object() {
                tracing::warn!(
                    table = self.table,
                    record = idx,
                    "record is not an object; all columns will be NULL"
                );
                continue;
            }
            let dropped = self.dropped_keys(record);
            if !dropped.is_empty() {
                tracing::debug!(
                    table = self.table,
                    record = idx,
                    dropped = ?dropped,
                    "keys outside the schema dropped"
                );
            }
        }

        records.iter().map(|record| self.insert(record)).collect()
    }
}

/// Emit one INSERT per record using the given column order
pub fn emit_inserts(table: &str, columns: &[Column], records: &[Value]) -> Vec<String> {
    StatementEmitter::new(table, columns).emit(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::infer_schema;
    use serde_json::json;

    /// Minimal SQL string literal reader: strips the outer quotes and collapses `''`
    fn parse_sql_literal(literal: &str) -> Option<String> {
        let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
        let mut out = String::new();
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.next() != Some('\'') {
                    return None;
                }
            }
            out.push(c);
        }
        Some(out)
    }

    #[test]
    fn test_encode_values() {
        assert_eq!(encode_value(None), "NULL");
        assert_eq!(encode_value(Some(&json!(null))), "NULL");
        assert_eq!(encode_value(Some(&json!(true))), "1");
        assert_eq!(encode_value(Some(&json!(false))), "0");
        assert_eq!(encode_value(Some(&json!(42))), "42");
        assert_eq!(encode_value(Some(&json!(-3.5))), "-3.5");
        assert_eq!(encode_value(Some(&json!("plain"))), "'plain'");
        assert_eq!(encode_value(Some(&json!("O'Brien"))), "'O''Brien'");
    }

    #[test]
    fn test_encode_nested_as_compact_json() {
        assert_eq!(
            encode_value(Some(&json!({"b": 1, "a": [1, 2]}))),
            r#"'{"b":1,"a":[1,2]}'"#
        );
        assert_eq!(
            encode_value(Some(&json!(["it's", null]))),
            r#"'["it''s",null]'"#
        );
    }

    #[test]
    fn test_string_literals_round_trip() {
        for original in ["O'Brien", "''", "'", "no quotes", "a'b'c''d", "", "tab\tand\nnewline"] {
            let literal = encode_value(Some(&json!(original)));
            assert_eq!(parse_sql_literal(&literal).as_deref(), Some(original));
        }
    }

    #[test]
    fn test_insert_uses_schema_order() {
        let records = vec![json!({"name": "O'Brien", "active": true})];
        let schema = infer_schema("users", &records).unwrap();
        let inserts = emit_inserts(&schema.table, &schema.columns, &records);
        assert_eq!(
            inserts,
            vec!["INSERT INTO users (name, active) VALUES ('O''Brien', 1);"]
        );
    }

    #[test]
    fn test_missing_and_extra_keys() {
        let records = vec![
            json!({"a": 1, "b": "x"}),
            json!({"b": "y", "c": 99}),
            json!({"b": "z", "a": 2}),
        ];
        let schema = infer_schema("t", &records).unwrap();
        let inserts = StatementEmitter::for_schema(&schema).emit(&records);
        assert_eq!(
            inserts,
            vec![
                "INSERT INTO t (a, b) VALUES (1, 'x');",
                "INSERT INTO t (a, b) VALUES (NULL, 'y');",
                "INSERT INTO t (a, b) VALUES (2, 'z');",
            ]
        );
    }

    #[test]
    fn test_dropped_keys_detected_without_extra_count() {
        let records = vec![json!({"a": 1, "b": 2}), json!({"b": 3, "c": 4})];
        let schema = infer_schema("t", &records).unwrap();
        let emitter = StatementEmitter::for_schema(&schema);

        assert!(emitter.dropped_keys(&records[0]).is_empty());
        assert_eq!(emitter.dropped_keys(&records[1]), vec!["c"]);
        assert!(emitter.dropped_keys(&json!("stray")).is_empty());
    }

    #[test]
    fn test_dropped_keys_follow_renamed_columns() {
        let records = vec![json!({"id": 1}), json!({"id": 2, "id_2": 3})];
        let schema = infer_schema("t", &records).unwrap();
        let emitter = StatementEmitter::for_schema(&schema);

        assert_eq!(emitter.dropped_keys(&records[1]), vec!["id_2"]);
        assert_eq!(emitter.insert(&records[1]), "INSERT INTO t (id_2) VALUES (2);");
    }

    #[test]
    fn test_non_object_record_is_all_null() {
        let records = vec![json!({"a": 1, "b": 2}), json!("stray")];
        let schema = infer_schema("t", &records).unwrap();
        let inserts = StatementEmitter::for_schema(&schema).emit(&records);
        assert_eq!(inserts[1], "INSERT INTO t (a, b) VALUES (NULL, NULL);");
    }

    #[test]
    fn test_type_mismatch_is_not_reconciled() {
        let records = vec![json!({"n": 1}), json!({"n": "one"})];
        let schema = infer_schema("t", &records).unwrap();
        let inserts = StatementEmitter::for_schema(&schema).emit(&records);
        assert_eq!(inserts[1], "INSERT INTO t (n) VALUES ('one');");
    }

    #[test]
    fn test_scalar_insert() {
        assert_eq!(scalar_insert("t", &json!(42)), "INSERT INTO t (value) VALUES ('42');");
        assert_eq!(scalar_insert("t", &json!(true)), "INSERT INTO t (value) VALUES ('true');");
        assert_eq!(scalar_insert("t", &json!("it's")), "INSERT INTO t (value) VALUES ('it''s');");
        assert_eq!(scalar_insert("t", &json!(null)), "INSERT INTO t (value) VALUES (NULL);");
    }
}
