use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Name of the surrogate primary key prepended to every generated table
pub const SURROGATE_KEY: &str = "id";

/// Column name used when the input is a bare primitive
pub const SCALAR_COLUMN: &str = "value";

/// Storage class of a generated column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlType {
    Integer,
    Real,
    Text,
}

impl SqlType {
    /// Classify a sample value. Booleans are stored as 0/1 and nested
    /// structures as serialized JSON text.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(_) => SqlType::Integer,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    SqlType::Integer
                } else {
                    SqlType::Real
                }
            }
            Value::Object(_) | Value::Array(_) => SqlType::Text,
            Value::String(_) | Value::Null => SqlType::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed slot in the generated table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column name as written in the SQL output
    pub name: String,

    pub sql_type: SqlType,

    /// Whether this is the auto-incrementing surrogate key
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub primary_key: bool,

    /// JSON key the column reads its values from (None for the surrogate key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Column {
    /// A data column whose name matches its JSON key
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        let name = name.into();
        Column {
            key: Some(name.clone()),
            name,
            sql_type,
            primary_key: false,
        }
    }

    /// A data column renamed away from its JSON key
    pub fn renamed(name: impl Into<String>, key: impl Into<String>, sql_type: SqlType) -> Self {
        Column {
            name: name.into(),
            sql_type,
            primary_key: false,
            key: Some(key.into()),
        }
    }

    /// The synthetic `id` column, not derived from input data
    pub fn surrogate_key() -> Self {
        Column {
            name: SURROGATE_KEY.to_string(),
            sql_type: SqlType::Integer,
            primary_key: true,
            key: None,
        }
    }

    /// Column definition as it appears inside CREATE TABLE
    pub fn definition(&self) -> String {
        if self.primary_key {
            format!("{} {} PRIMARY KEY AUTOINCREMENT", self.name, self.sql_type)
        } else {
            format!("{} {}", self.name, self.sql_type)
        }
    }
}

/// The decoded input, normalized into rows
///
/// A single object becomes a one-element sequence and an array is used as-is.
/// Anything else takes the single-column `value` path.
#[derive(Debug, Clone, Copy)]
pub enum RecordSequence<'a> {
    Records(&'a [Value]),
    Scalar(&'a Value),
}

impl<'a> RecordSequence<'a> {
    pub fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Object(_) => RecordSequence::Records(std::slice::from_ref(value)),
            Value::Array(items) => RecordSequence::Records(items.as_slice()),
            other => RecordSequence::Scalar(other),
        }
    }

    /// Number of rows this sequence will produce
    pub fn len(&self) -> usize {
        match self {
            RecordSequence::Records(records) => records.len(),
            RecordSequence::Scalar(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Human-readable name of a JSON value's kind, for diagnostics
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// How table and column identifiers are sanitized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierPolicy {
    /// Only `-` and `.` in table names are normalized; column names are kept verbatim
    #[default]
    Legacy,
    /// Everything outside `[A-Za-z0-9_]` is replaced and duplicate columns are suffixed
    Strict,
}

/// Configuration for script generation
#[derive(Debug, Clone)]
pub struct SqlConfig {
    /// Identifier sanitization applied to table and column names
    pub identifiers: IdentifierPolicy,

    /// Emit the provenance comment block at the top of the script
    pub include_header: bool,

    /// Locator recorded in the header
    pub source: Option<String>,

    /// Timestamp recorded in the header. Left to the caller so generation stays deterministic.
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for SqlConfig {
    fn default() -> Self {
        SqlConfig {
            identifiers: IdentifierPolicy::Legacy,
            include_header: true,
            source: None,
            generated_at: None,
        }
    }
}
