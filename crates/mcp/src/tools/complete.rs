use std::sync::Arc;

use async_trait::async_trait;
use notion_todo_core::services::TodoService;
use pmcp::{RequestHandlerExtra, Result as McpResult, ToolHandler};
use serde::Deserialize;
use serde_json::{json, Value};

use super::util::{internal_error, non_blank, todo_error, validation_error};

pub struct CompleteTodoTool {
    service: Arc<TodoService>,
}

impl CompleteTodoTool {
    pub fn new(service: Arc<TodoService>) -> Self {
        Self { service }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteTodoArgs {
    #[serde(alias = "task_id")]
    task_id: Option<String>,
}

#[async_trait]
impl ToolHandler for CompleteTodoTool {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> McpResult<Value> {
        let parsed: CompleteTodoArgs =
            serde_json::from_value(args).map_err(|err| validation_error(err))?;
        let Some(id) = non_blank(parsed.task_id) else {
            return Err(validation_error("Task ID is required"));
        };

        let todo = self
            .service
            .complete(&id)
            .await
            .map_err(|err| todo_error("completing todo", err))?;

        Ok(json!({
            "message": format!("Marked todo as complete (ID: {})", id),
            "todo": serde_json::to_value(&todo).map_err(internal_error)?,
        }))
    }

    fn metadata(&self) -> Option<pmcp::types::ToolInfo> {
        Some(pmcp::types::ToolInfo::new(
            "complete_todo",
            Some("Mark a todo item as complete".to_string()),
            json!({
                "type": "object",
                "required": ["taskId"],
                "properties": {
                    "taskId": {
                        "type": "string",
                        "description": "The ID of the todo task to mark as complete"
                    }
                }
            }),
        ))
    }
}
