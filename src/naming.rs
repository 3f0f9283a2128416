//! Table and column identifiers
//!
//! Table names come from the last path segment of the source locator, so
//! `https://api.example.com/v1/user-profiles.json` becomes `user_profiles`.

use crate::types::IdentifierPolicy;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Table name used when the locator has no path
pub const DEFAULT_TABLE: &str = "api_data";

static UNSAFE_IDENT_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());

/// Derive a table name from a locator using the legacy policy
///
/// Only `-` and `.` are normalized. Any other character in the leaf segment
/// is passed through, so the result is not guaranteed to be a legal identifier.
pub fn derive_table_name(locator: &str) -> String {
    let path = locator_path(locator);
    let path = path.trim_matches('/');

    let leaf = if path.is_empty() {
        DEFAULT_TABLE
    } else {
        let segment = path.rsplit('/').next().unwrap_or(path);
        segment.split('.').next().unwrap_or(segment)
    };

    leaf.replace(['-', '.'], "_")
}

/// Derive a table name under the given identifier policy
pub fn table_name_for(locator: &str, policy: IdentifierPolicy) -> String {
    let name = derive_table_name(locator);
    match policy {
        IdentifierPolicy::Legacy => name,
        IdentifierPolicy::Strict => sanitize_identifier(&name, DEFAULT_TABLE),
    }
}

/// Reduce a name to `[A-Za-z0-9_]`, prefixing `_` when it starts with a digit
pub fn sanitize_identifier(name: &str, fallback: &str) -> String {
    let cleaned = UNSAFE_IDENT_CHARS.replace_all(name, "_");
    if cleaned.is_empty() {
        return fallback.to_string();
    }
    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", cleaned)
    } else {
        cleaned.into_owned()
    }
}

/// The path component of a locator. Inputs that are not absolute URLs
/// (relative paths, file names) are used as the path with any query or
/// fragment removed.
fn locator_path(locator: &str) -> String {
    match Url::parse(locator) {
        Ok(url) => url.path().to_string(),
        Err(_) => locator
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}
