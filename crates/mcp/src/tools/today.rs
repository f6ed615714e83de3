use std::sync::Arc;

use async_trait::async_trait;
use notion_todo_core::projector::today_utc;
use notion_todo_core::services::TodoService;
use pmcp::{RequestHandlerExtra, Result as McpResult, ToolHandler};
use serde_json::{json, Value};

use super::util::{internal_error, todo_error};

pub struct ShowTodayTodosTool {
    service: Arc<TodoService>,
}

impl ShowTodayTodosTool {
    pub fn new(service: Arc<TodoService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ToolHandler for ShowTodayTodosTool {
    async fn handle(&self, _args: Value, _extra: RequestHandlerExtra) -> McpResult<Value> {
        let today = today_utc();
        let todos = self
            .service
            .list_due_on(today)
            .await
            .map_err(|err| todo_error("fetching todos", err))?;

        Ok(json!({
            "date": today.to_string(),
            "count": todos.len(),
            "todos": serde_json::to_value(&todos).map_err(internal_error)?,
        }))
    }

    fn metadata(&self) -> Option<pmcp::types::ToolInfo> {
        Some(pmcp::types::ToolInfo::new(
            "show_today_todos",
            Some("Show today's todo items from Notion (due today, UTC)".to_string()),
            json!({
                "type": "object",
                "properties": {}
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::tools::util::{page, test_extra, test_service};

    fn due(id: &str, date: String) -> Value {
        page(
            id,
            json!({ "Due": { "type": "date", "date": { "start": date } } }),
        )
    }

    #[tokio::test]
    async fn keeps_only_todos_due_today() {
        let today = today_utc();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/databases/db-1/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    due("yesterday", (today - Duration::days(1)).to_string()),
                    due("today", today.to_string()),
                    due("tomorrow", (today + Duration::days(1)).to_string()),
                    due("garbled", "not a date".to_string()),
                    page("undated", json!({}))
                ]
            })))
            .mount(&server)
            .await;

        let tool = ShowTodayTodosTool::new(test_service(&server));
        let response = tool.handle(json!({}), test_extra()).await.expect("today");

        assert_eq!(response["date"].as_str(), Some(today.to_string().as_str()));
        let todos = response["todos"].as_array().expect("todos array");
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0]["id"].as_str(), Some("today"));
    }
}
