use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use notion_todo_core::model::{NewTodo, When};
use notion_todo_core::services::TodoService;
use notion_todo_core::TodoResult;
use pmcp::{RequestHandlerExtra, Result as McpResult, ToolHandler};
use serde::Deserialize;
use serde_json::{json, Value};

use super::util::{internal_error, non_blank, todo_error, validation_error};

pub struct AddTodoTool {
    service: Arc<TodoService>,
}

impl AddTodoTool {
    pub fn new(service: Arc<TodoService>) -> Self {
        Self { service }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddTodoArgs {
    task: String,
    when: Option<String>,
    due: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    assignee: Option<String>,
    tags: Option<Vec<String>>,
    sprint: Option<String>,
    project: Option<String>,
    link: Option<String>,
}

impl AddTodoArgs {
    fn into_input(self) -> TodoResult<(NewTodo, When)> {
        let when = match non_blank(self.when) {
            Some(raw) => When::from_str(&raw)?,
            None => When::default(),
        };

        let input = NewTodo {
            task: self.task,
            assignee: non_blank(self.assignee),
            due: non_blank(self.due),
            priority: non_blank(self.priority),
            status: non_blank(self.status),
            tags: self.tags.unwrap_or_default(),
            sprint: non_blank(self.sprint),
            project: non_blank(self.project),
            link: non_blank(self.link),
        };
        input.require_task()?;
        Ok((input, when))
    }
}

#[async_trait]
impl ToolHandler for AddTodoTool {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> McpResult<Value> {
        let parsed: AddTodoArgs =
            serde_json::from_value(args).map_err(|err| validation_error(err))?;
        let (input, when) = parsed.into_input().map_err(validation_error)?;
        let task = input.task.trim().to_string();

        let todo = self
            .service
            .schedule(input, when)
            .await
            .map_err(|err| todo_error("adding todo", err))?;

        Ok(json!({
            "message": format!("Added todo: {} (scheduled for {})", task, when.as_str()),
            "todo": serde_json::to_value(&todo).map_err(internal_error)?,
        }))
    }

    fn metadata(&self) -> Option<pmcp::types::ToolInfo> {
        Some(pmcp::types::ToolInfo::new(
            "add_todo",
            Some("Add a new todo item".to_string()),
            json!({
                "type": "object",
                "required": ["task"],
                "properties": {
                    "task": {
                        "type": "string",
                        "description": "The todo task description"
                    },
                    "when": {
                        "type": "string",
                        "enum": ["today", "later"],
                        "description": "When the task should be done; 'today' sets the due date to today unless 'due' is given"
                    },
                    "due": {
                        "type": "string",
                        "format": "date",
                        "description": "Due date in YYYY-MM-DD format"
                    },
                    "priority": {
                        "type": "string",
                        "enum": ["High", "Medium", "Low"],
                        "description": "Defaults to Medium"
                    },
                    "status": {
                        "type": "string",
                        "enum": ["Not started", "In progress", "Done"],
                        "description": "Defaults to Not started"
                    },
                    "assignee": {
                        "type": "string",
                        "description": "Notion user id of the assignee"
                    },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" }
                    },
                    "sprint": {
                        "type": "string",
                        "description": "Page id of the related sprint"
                    },
                    "project": {
                        "type": "string",
                        "description": "Page id of the related project"
                    },
                    "link": {
                        "type": "string",
                        "format": "uri"
                    }
                }
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::tools::util::{page, test_extra, test_service};

    #[tokio::test]
    async fn add_creates_todo() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pages"))
            .and(body_partial_json(json!({
                "parent": { "database_id": "db-1" },
                "properties": {
                    "Task name": { "type": "title", "title": [{ "type": "text", "text": { "content": "Write report" } }] },
                    "Priority": { "type": "select", "select": { "name": "High" } },
                    "Due": { "type": "date", "date": { "start": "2025-03-01" } }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(
                "page-1",
                json!({
                    "Task name": { "type": "title", "title": [{ "plain_text": "Write report" }] },
                    "Status": { "type": "select", "select": { "name": "Not started" } },
                    "Priority": { "type": "select", "select": { "name": "High" } },
                    "Due": { "type": "date", "date": { "start": "2025-03-01" } }
                }),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let tool = AddTodoTool::new(test_service(&server));
        let response = tool
            .handle(
                json!({
                    "task": "Write report",
                    "due": "2025-03-01",
                    "priority": "High",
                    "when": "later"
                }),
                test_extra(),
            )
            .await
            .expect("add result");

        assert_eq!(
            response["message"].as_str(),
            Some("Added todo: Write report (scheduled for later)")
        );
        assert_eq!(response["todo"]["id"].as_str(), Some("page-1"));
        assert_eq!(response["todo"]["priority"].as_str(), Some("High"));
        assert_eq!(response["todo"]["due"].as_str(), Some("2025-03-01"));
    }

    #[tokio::test]
    async fn empty_task_never_reaches_the_store() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tool = AddTodoTool::new(test_service(&server));
        let result = tool.handle(json!({ "task": "   " }), test_extra()).await;
        assert!(result.is_err());

        let missing = tool.handle(json!({ "when": "today" }), test_extra()).await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn rejects_unknown_when_and_bad_dates() {
        let server = MockServer::start().await;
        let tool = AddTodoTool::new(test_service(&server));

        let bad_when = tool
            .handle(json!({ "task": "x", "when": "someday" }), test_extra())
            .await;
        assert!(bad_when.is_err());

        let bad_due = tool
            .handle(json!({ "task": "x", "due": "next week" }), test_extra())
            .await;
        assert!(bad_due.is_err());
    }

    #[tokio::test]
    async fn unreadable_response_still_reports_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pages"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "object": "page", "id": "page-9" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tool = AddTodoTool::new(test_service(&server));
        let response = tool
            .handle(json!({ "task": " Call back " }), test_extra())
            .await
            .expect("add result");

        assert_eq!(
            response["message"].as_str(),
            Some("Added todo: Call back (scheduled for later)")
        );
        assert!(response["todo"].is_null());
    }
}
