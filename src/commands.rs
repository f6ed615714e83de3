use std::io::Write;

use anyhow::{anyhow, Result};
use serde_json::json;

use crate::cli::CliCommand;
use crate::model::{FilterCriteria, NewTodo, Todo};
use crate::services::TodoService;

/// Run a one-shot command against the collection and print JSON to `writer`.
pub async fn execute<W: Write>(
    service: &TodoService,
    command: CliCommand,
    mut writer: W,
) -> Result<()> {
    match command {
        CliCommand::List(args) => {
            let todos = service.list(&FilterCriteria::from(&args)).await?;
            write_todos(&mut writer, &todos)
        }
        CliCommand::Today => {
            let todos = service.list_due_today().await?;
            write_todos(&mut writer, &todos)
        }
        CliCommand::Add(args) => {
            let when = args.when;
            let input = NewTodo::from(args);
            let task = input.task.trim().to_string();
            let todo = service.schedule(input, when).await?;
            writeln!(writer, "Added todo: {} (scheduled for {})", task, when.as_str())?;
            if let Some(todo) = todo {
                writeln!(writer, "{}", serde_json::to_string_pretty(&todo)?)?;
            }
            Ok(())
        }
        CliCommand::Complete(args) => {
            let id = args.id.trim();
            service.complete(id).await?;
            writeln!(writer, "Marked todo as complete (ID: {})", id)?;
            Ok(())
        }
        CliCommand::Mcp(_) => Err(anyhow!("launch the MCP server directly")),
    }
}

fn write_todos<W: Write>(mut writer: W, todos: &[Todo]) -> Result<()> {
    let rendered = json!({ "count": todos.len(), "todos": todos });
    writeln!(writer, "{}", serde_json::to_string_pretty(&rendered)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{AddArgs, CompleteArgs};
    use crate::config::AppConfig;
    use crate::core::property::Properties;
    use crate::core::query::QueryBody;
    use crate::core::{TodoError, TodoResult, TodoStore};
    use crate::model::When;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingStore {
        created: Mutex<Vec<Properties>>,
    }

    #[async_trait]
    impl TodoStore for RecordingStore {
        async fn query(&self, _collection_id: &str, _body: &QueryBody) -> TodoResult<Vec<Value>> {
            Ok(Vec::new())
        }

        async fn create(&self, _collection_id: &str, properties: Properties) -> TodoResult<Value> {
            self.created.lock().unwrap().push(properties.clone());
            Ok(json!({
                "id": "page-1",
                "created_time": "2025-02-20T09:30:00.000Z",
                "properties": properties
            }))
        }

        async fn update(&self, record_id: &str, _properties: Properties) -> TodoResult<Value> {
            Err(TodoError::NotFound(record_id.to_string()))
        }
    }

    fn add_args(task: &str) -> AddArgs {
        AddArgs {
            task: task.split_whitespace().map(str::to_string).collect(),
            when: When::Later,
            due: None,
            priority: None,
            status: None,
            assignee: None,
            tag: vec![],
            sprint: None,
            project: None,
            link: None,
        }
    }

    fn service(store: Arc<RecordingStore>) -> TodoService {
        TodoService::with_store(AppConfig::new("secret", "db-1").unwrap(), store)
    }

    #[tokio::test]
    async fn add_prints_confirmation() {
        let store = Arc::new(RecordingStore::default());
        let mut out = Vec::new();
        execute(
            &service(store.clone()),
            CliCommand::Add(add_args("Write report")),
            &mut out,
        )
        .await
        .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("Added todo: Write report (scheduled for later)"));
        assert_eq!(store.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_add_fails_without_store_call() {
        let store = Arc::new(RecordingStore::default());
        let mut out = Vec::new();
        let result = execute(&service(store.clone()), CliCommand::Add(add_args("")), &mut out).await;

        assert!(result.is_err());
        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn complete_surfaces_not_found() {
        let store = Arc::new(RecordingStore::default());
        let err = execute(
            &service(store),
            CliCommand::Complete(CompleteArgs {
                id: "59833787-2cf9-4fdf-8782-e53db20768a5".into(),
            }),
            Vec::new(),
        )
        .await
        .unwrap_err();

        assert!(err
            .to_string()
            .contains("todo not found: 59833787-2cf9-4fdf-8782-e53db20768a5"));
    }

    #[tokio::test]
    async fn complete_rejects_malformed_id() {
        let store = Arc::new(RecordingStore::default());
        let err = execute(
            &service(store),
            CliCommand::Complete(CompleteArgs { id: "ghost".into() }),
            Vec::new(),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Invalid task ID"));
    }

    #[tokio::test]
    async fn today_prints_empty_list() {
        let store = Arc::new(RecordingStore::default());
        let mut out = Vec::new();
        execute(&service(store), CliCommand::Today, &mut out)
            .await
            .unwrap();

        let printed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["count"], 0);
    }
}
