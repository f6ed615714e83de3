use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::TodoResult;
use crate::model::{FilterCriteria, NewTodo, Todo, TodoStatus, When};
use crate::projector::{self, today_utc};
use crate::property::{encode, encode_status, parse_page_id};
use crate::query::build_query;
use crate::store::{NotionClient, TodoStore};

/// Fetch, create and complete todos against the configured collection.
///
/// Holds only read-only configuration and the store handle, so one instance
/// can serve concurrent tool calls.
#[derive(Clone)]
pub struct TodoService {
    config: Arc<AppConfig>,
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = NotionClient::new(&config)?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn TodoStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn list(&self, criteria: &FilterCriteria) -> TodoResult<Vec<Todo>> {
        let names = self.config.properties();
        let body = build_query(criteria, names);
        let records = self.store.query(self.config.database_id(), &body).await?;
        let todos = projector::project_batch(&records, names);
        info!(
            fetched = records.len(),
            projected = todos.len(),
            "listed todos"
        );
        Ok(todos)
    }

    pub async fn list_due_today(&self) -> TodoResult<Vec<Todo>> {
        let todos = self.list(&FilterCriteria::default()).await?;
        Ok(todos.into_iter().filter(projector::is_due_today).collect())
    }

    /// List every todo and keep the ones due on `date`. The store has no cheap
    /// native filter for this, so it happens after projection.
    pub async fn list_due_on(&self, date: NaiveDate) -> TodoResult<Vec<Todo>> {
        let todos = self.list(&FilterCriteria::default()).await?;
        Ok(todos
            .into_iter()
            .filter(|todo| projector::is_due_on(todo, date))
            .collect())
    }

    /// Validate and create a todo. Nothing is sent when validation fails.
    ///
    /// Returns `None` when the store accepted the record but its response
    /// could not be read back.
    pub async fn create(&self, input: NewTodo) -> TodoResult<Option<Todo>> {
        let properties = encode(&input, self.config.properties())?;
        let record = self
            .store
            .create(self.config.database_id(), properties)
            .await?;
        let todo = self.read_back(&record, "create");
        info!(id = todo.as_ref().map(|todo| todo.id.as_str()), "created todo");
        Ok(todo)
    }

    /// Create a todo, resolving the `when` hint against today's UTC date.
    pub async fn schedule(&self, input: NewTodo, when: When) -> TodoResult<Option<Todo>> {
        self.create(apply_when(input, when, today_utc())).await
    }

    /// Mark a todo as done. The id must look like a page id; anything else
    /// fails before a request is made.
    pub async fn complete(&self, id: &str) -> TodoResult<Option<Todo>> {
        let id = parse_page_id(id)?;
        let properties = encode_status(TodoStatus::Done, self.config.properties())?;
        let record = self.store.update(id, properties).await?;
        info!(id, "completed todo");
        Ok(self.read_back(&record, "complete"))
    }

    fn read_back(&self, record: &Value, operation: &str) -> Option<Todo> {
        match projector::project(record, self.config.properties()) {
            Ok(todo) => Some(todo),
            Err(err) => {
                warn!(operation, error = %err, "write succeeded but the returned record is unreadable");
                None
            }
        }
    }
}

/// `today` fills in the due date unless one was given explicitly; `later`
/// leaves the input alone.
pub fn apply_when(mut input: NewTodo, when: When, today: NaiveDate) -> NewTodo {
    let has_due = input
        .due
        .as_deref()
        .map(|due| !due.trim().is_empty())
        .unwrap_or(false);
    if when == When::Today && !has_due {
        input.due = Some(today.format("%Y-%m-%d").to_string());
    }
    input
}
