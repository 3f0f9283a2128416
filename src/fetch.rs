//! JSON retrieval
//!
//! Fetches a JSON document over HTTP(S), or reads one from a local file or stdin,
//! and decodes it into a `serde_json::Value`.

use crate::error::{DecodeError, FetchError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::io::Read;

static HEADER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([^:\s][^:]*?)\s*:\s*(.*?)\s*$").unwrap());

/// Split a `"Key: Value"` header argument into its name and value
pub fn parse_header(raw: &str) -> std::result::Result<(String, String), FetchError> {
    let caps = HEADER_LINE
        .captures(raw)
        .ok_or_else(|| FetchError::InvalidHeader(raw.to_string()))?;
    Ok((caps[1].to_string(), caps[2].to_string()))
}

/// Reject locators that are not absolute http(s) URLs
pub fn validate_url(locator: &str) -> std::result::Result<(), FetchError> {
    if locator.starts_with("http://") || locator.starts_with("https://") {
        Ok(())
    } else {
        Err(FetchError::InvalidUrl(locator.to_string()))
    }
}

/// Decode JSON bytes, trying SIMD parsing first and falling back to
/// serde_json for inputs it rejects (and for its error positions)
pub fn decode_json(bytes: &[u8]) -> std::result::Result<Value, DecodeError> {
    let mut scratch = bytes.to_vec();
    match simd_json::serde::from_slice::<Value>(&mut scratch) {
        Ok(value) => Ok(value),
        Err(_) => Ok(serde_json::from_slice(bytes)?),
    }
}

/// Read and decode JSON from a file path, or stdin when `path` is `-`
pub fn read_local(path: &str) -> Result<Value> {
    let bytes = if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin().lock().read_to_end(&mut buf)?;
        buf
    } else {
        std::fs::read(path)?
    };
    tracing::debug!(path, bytes = bytes.len(), "read local input");
    Ok(decode_json(&bytes)?)
}

/// HTTP client carrying the user's request headers
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a client that sends `headers` with every request
    pub fn new(headers: &[(String, String)]) -> std::result::Result<Self, FetchError> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let invalid = || FetchError::InvalidHeader(format!("{}: {}", name, value));
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            map.insert(name, value);
        }

        let client = Client::builder()
            .user_agent(concat!("json2sql/", env!("CARGO_PKG_VERSION")))
            .default_headers(map)
            .build()?;

        Ok(Fetcher { client })
    }

    /// GET `url` and decode the body. Non-2xx responses are errors; nothing is retried.
    pub fn fetch(&self, url: &str) -> Result<Value> {
        validate_url(url)?;

        tracing::info!(url, "fetching JSON");
        let response = self.client.get(url).send().map_err(FetchError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            }
            .into());
        }

        let body = response.bytes().map_err(FetchError::from)?;
        tracing::debug!(url, %status, bytes = body.len(), "received response");

        Ok(decode_json(&body)?)
    }
}
