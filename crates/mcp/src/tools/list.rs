use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use notion_todo_core::model::{FilterCriteria, Priority, SortDirection, SortField, TodoStatus};
use notion_todo_core::services::TodoService;
use notion_todo_core::TodoResult;
use pmcp::{RequestHandlerExtra, Result as McpResult, ToolHandler};
use serde::Deserialize;
use serde_json::{json, Value};

use super::util::{internal_error, non_blank, object_or_empty, todo_error, validation_error};

pub struct ShowAllTodosTool {
    service: Arc<TodoService>,
}

impl ShowAllTodosTool {
    pub fn new(service: Arc<TodoService>) -> Self {
        Self { service }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShowAllTodosArgs {
    status: Option<String>,
    assignee: Option<String>,
    priority: Option<String>,
    project: Option<String>,
    sprint: Option<String>,
    sort_by: Option<String>,
    sort_direction: Option<String>,
}

impl ShowAllTodosArgs {
    fn to_criteria(&self) -> TodoResult<FilterCriteria> {
        let mut criteria = FilterCriteria::default();

        if let Some(status) = non_blank(self.status.clone()) {
            criteria.status = Some(TodoStatus::from_str(&status)?);
        }

        if let Some(priority) = non_blank(self.priority.clone()) {
            criteria.priority = Some(Priority::from_str(&priority)?);
        }

        criteria.assignee = non_blank(self.assignee.clone());
        criteria.project = non_blank(self.project.clone());
        criteria.sprint = non_blank(self.sprint.clone());

        if let Some(sort) = non_blank(self.sort_by.clone()) {
            criteria.sort = SortField::from_str(&sort)?;
        }

        if let Some(direction) = non_blank(self.sort_direction.clone()) {
            criteria.direction = SortDirection::from_str(&direction)?;
        }

        Ok(criteria)
    }
}

#[async_trait]
impl ToolHandler for ShowAllTodosTool {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> McpResult<Value> {
        let parsed: ShowAllTodosArgs =
            serde_json::from_value(object_or_empty(args)).map_err(|err| validation_error(err))?;
        let criteria = parsed.to_criteria().map_err(validation_error)?;

        let todos = self
            .service
            .list(&criteria)
            .await
            .map_err(|err| todo_error("fetching todos", err))?;

        Ok(json!({
            "count": todos.len(),
            "todos": serde_json::to_value(&todos).map_err(internal_error)?,
        }))
    }

    fn metadata(&self) -> Option<pmcp::types::ToolInfo> {
        Some(pmcp::types::ToolInfo::new(
            "show_all_todos",
            Some("Show all todo items from Notion".to_string()),
            json!({
                "type": "object",
                "properties": {
                    "status": {
                        "type": "string",
                        "enum": ["Not started", "In progress", "Done"]
                    },
                    "assignee": {
                        "type": "string",
                        "description": "Notion user id; matches todos that include this person"
                    },
                    "priority": {
                        "type": "string",
                        "enum": ["High", "Medium", "Low"]
                    },
                    "project": {
                        "type": "string",
                        "description": "Page id of a related project"
                    },
                    "sprint": {
                        "type": "string",
                        "description": "Page id of a related sprint"
                    },
                    "sortBy": {
                        "type": "string",
                        "enum": ["due", "priority", "task", "created"],
                        "description": "Defaults to due"
                    },
                    "sortDirection": {
                        "type": "string",
                        "enum": ["ascending", "descending"],
                        "description": "Defaults to ascending"
                    }
                }
            }),
        ))
    }
}
