//! Elasticsearch document store adapter.
//!
//! Talks to the document REST API directly:
//!
//! - `GET {base}/{index}/_doc/{id}` returns `_source`, `_seq_no`, `_primary_term`
//! - `POST {base}/{index}/_update/{id}` with `{"doc": ...}` merges top-level keys
//!
//! Conditional updates pass `if_seq_no` / `if_primary_term`; the server
//! answers 409 when the document moved on.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::DocumentStoreConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{DocumentStore, DocumentVersion, StoredDocument};

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source", default)]
    source: Option<Value>,
    #[serde(rename = "_seq_no", default)]
    seq_no: Option<u64>,
    #[serde(rename = "_primary_term", default)]
    primary_term: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    #[serde(default)]
    get: Option<UpdateGet>,
}

#[derive(Debug, Deserialize)]
struct UpdateGet {
    #[serde(rename = "_source")]
    source: Value,
}

/// `DocumentStore` backed by an Elasticsearch cluster.
pub struct ElasticsearchDocumentStore {
    base_url: String,
    api_key: Option<SecretString>,
    http_client: Client,
}

impl ElasticsearchDocumentStore {
    pub fn new(config: &DocumentStoreConfig) -> Result<Self, DomainError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| store_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http_client,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(
                reqwest::header::AUTHORIZATION,
                format!("ApiKey {}", key.expose_secret()),
            ),
            None => request,
        }
    }
}

fn store_error(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::DocumentStoreError, message)
}

#[async_trait]
impl DocumentStore for ElasticsearchDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, DomainError> {
        let url = format!("{}/{}/_doc/{}", self.base_url, collection, id);

        let response = self
            .authorize(self.http_client.get(&url))
            .send()
            .await
            .map_err(|e| store_error(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(store_error(format!("GET {} failed with {}: {}", url, status, body)));
        }

        let body: GetResponse = response
            .json()
            .await
            .map_err(|e| store_error(format!("Failed to parse get response: {}", e)))?;

        let (true, Some(source)) = (body.found, body.source) else {
            return Ok(None);
        };
        let version = match (body.seq_no, body.primary_term) {
            (Some(seq_no), Some(primary_term)) => Some(DocumentVersion::new(seq_no, primary_term)),
            _ => None,
        };

        debug!(index = collection, id = %body.id, ?version, "Fetched document");

        Ok(Some(StoredDocument {
            id: body.id,
            source,
            version,
        }))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        doc: Value,
        expected: Option<DocumentVersion>,
    ) -> Result<Value, DomainError> {
        let url = format!("{}/{}/_update/{}", self.base_url, collection, id);

        let mut query = vec![("_source".to_string(), "true".to_string())];
        if let Some(version) = expected {
            query.push(("if_seq_no".to_string(), version.seq_no.to_string()));
            query.push(("if_primary_term".to_string(), version.primary_term.to_string()));
        }

        let response = self
            .authorize(self.http_client.post(&url))
            .query(&query)
            .json(&json!({ "doc": doc }))
            .send()
            .await
            .map_err(|e| store_error(e.to_string()))?;

        match response.status() {
            StatusCode::CONFLICT => {
                return Err(DomainError::new(
                    ErrorCode::VersionConflict,
                    "Document changed since it was read",
                )
                .with_detail("index", collection)
                .with_detail("id", id));
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(store_error(format!(
                    "POST {} failed with {}: {}",
                    url, status, body
                )));
            }
            _ => {}
        }

        let body: UpdateResponse = response
            .json()
            .await
            .map_err(|e| store_error(format!("Failed to parse update response: {}", e)))?;

        Ok(body.get.map(|g| g.source).unwrap_or(Value::Null))
    }
}
