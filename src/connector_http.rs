//! HTTP connector for the upstream paginated service.
//!
//! Issues `GET {base_url}/{collection}?limit={limit}&skip={skip}` and reads
//! the array stored under the collection's name in the JSON response body:
//!
//! ```json
//! { "users": [ { "id": 1, ... }, ... ], "total": 208, "skip": 0, "limit": 10 }
//! ```
//!
//! A missing, null, or empty array is an empty page. Transport errors,
//! non-2xx statuses and non-JSON bodies are errors; nothing is retried.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use shopsync_core::source::{Batch, PageSource};

use crate::config::SourceConfig;

pub struct HttpPageSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPageSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, collection: &str, limit: usize, skip: usize) -> Result<Batch> {
        let url = self.url(collection);
        tracing::debug!(%url, limit, skip, "requesting page");

        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit), ("skip", skip)])
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()?;

        let body: serde_json::Value = response
            .json()
            .await
            .with_context(|| format!("GET {} returned invalid JSON", url))?;

        extract_records(body, collection)
    }
}

/// Take the collection's array out of a page body.
pub fn extract_records(body: serde_json::Value, collection: &str) -> Result<Batch> {
    let serde_json::Value::Object(mut fields) = body else {
        bail!("expected a JSON object for {}", collection);
    };

    match fields.remove(collection) {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(serde_json::Value::Array(records)) => Ok(records),
        Some(other) => bail!(
            "expected `{}` to be an array, got {}",
            collection,
            json_type(&other)
        ),
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_named_array() {
        let body = json!({ "carts": [{ "id": 1 }, { "id": 2 }], "total": 2 });
        assert_eq!(extract_records(body, "carts").unwrap().len(), 2);
    }

    #[test]
    fn test_missing_or_null_is_empty() {
        assert!(extract_records(json!({ "total": 0 }), "users").unwrap().is_empty());
        assert!(extract_records(json!({ "users": null }), "users").unwrap().is_empty());
        assert!(extract_records(json!({ "users": [] }), "users").unwrap().is_empty());
    }

    #[test]
    fn test_wrong_shapes_are_errors() {
        assert!(extract_records(json!([1, 2]), "users").is_err());
        let err = extract_records(json!({ "users": "nope" }), "users").unwrap_err();
        assert!(err.to_string().contains("a string"));
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let source = HttpPageSource::new(&SourceConfig {
            base_url: "http://localhost:1/".to_string(),
            ..SourceConfig::default()
        })
        .unwrap();
        assert_eq!(source.url("products"), "http://localhost:1/products");
    }
}
