//! SQL schema inference
//!
//! Derives a CREATE TABLE statement from the first record of a JSON record sequence.

pub mod inference;

pub use inference::{infer_schema, SchemaGenerator, TableSchema, NO_DATA_COMMENT};
