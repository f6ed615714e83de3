//! The external structured-database API the todos live in.
//!
//! [`TodoStore`] is the seam the service talks to; [`NotionClient`] is the
//! HTTP implementation. Each call is one request/response exchange bounded by
//! the configured timeout. Failures are classified, never retried here.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::{TodoError, TodoResult};
use crate::property::Properties;
use crate::query::QueryBody;

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Query a collection and return the raw records of the first page.
    async fn query(&self, collection_id: &str, body: &QueryBody) -> TodoResult<Vec<Value>>;

    /// Create a record in a collection and return it.
    async fn create(&self, collection_id: &str, properties: Properties) -> TodoResult<Value>;

    /// Patch the given properties of a record and return it.
    async fn update(&self, record_id: &str, properties: Properties) -> TodoResult<Value>;
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

#[derive(Debug, Clone)]
pub struct NotionClient {
    http: Client,
    base_url: Url,
    api_key: String,
    notion_version: String,
}

impl NotionClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("notion-todo/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        let base_url = Url::parse(config.base_url())
            .with_context(|| format!("invalid API base URL '{}'", config.base_url()))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("API base URL '{}' cannot carry a path", base_url));
        }

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key().to_string(),
            notion_version: config.notion_version().to_string(),
        })
    }

    /// Each segment is percent-encoded, so ids can never reach another endpoint.
    fn request(&self, method: Method, segments: &[&str]) -> TodoResult<RequestBuilder> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TodoError::validation("API base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.notion_version))
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> TodoResult<Value> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let message = error_message(&body);
            warn!(operation, status = status.as_u16(), %message, "store request failed");
            return Err(TodoError::from_status(status.as_u16(), message));
        }

        serde_json::from_str(&body).map_err(|err| {
            TodoError::Transient(format!("unreadable {} response: {}", operation, err))
        })
    }
}

#[async_trait]
impl TodoStore for NotionClient {
    async fn query(&self, collection_id: &str, body: &QueryBody) -> TodoResult<Vec<Value>> {
        debug!(collection_id, "querying collection");
        let request = self
            .request(Method::POST, &["databases", collection_id, "query"])?
            .json(body);
        let raw = self.send(request, "query").await?;
        let page: QueryResponse = serde_json::from_value(raw)
            .map_err(|err| TodoError::Transient(format!("unreadable query response: {}", err)))?;
        if page.has_more {
            debug!(
                returned = page.results.len(),
                "collection has more results than the first page"
            );
        }
        Ok(page.results)
    }

    async fn create(&self, collection_id: &str, properties: Properties) -> TodoResult<Value> {
        debug!(collection_id, "creating record");
        let request = self.request(Method::POST, &["pages"])?.json(&json!({
            "parent": { "database_id": collection_id },
            "properties": properties,
        }));
        self.send(request, "create").await
    }

    async fn update(&self, record_id: &str, properties: Properties) -> TodoResult<Value> {
        debug!(record_id, "updating record");
        let request = self
            .request(Method::PATCH, &["pages", record_id])?
            .json(&json!({ "properties": properties }));
        self.send(request, "update").await
    }
}

fn transport_error(err: reqwest::Error) -> TodoError {
    if err.is_timeout() {
        TodoError::Transient("request timed out".to_string())
    } else {
        TodoError::Transient(err.to_string())
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            code: Some(code),
            message,
        }) => format!("{} ({})", message, code),
        Ok(ErrorBody { code: None, message }) => message,
        Err(_) if body.trim().is_empty() => "empty response".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
