mod add;
mod complete;
mod list;
mod today;
mod util;

use std::sync::Arc;

use notion_todo_core::services::TodoService;
use pmcp::ServerBuilder;

pub const TOOL_NAMES: [&str; 4] = [
    "add_todo",
    "show_all_todos",
    "show_today_todos",
    "complete_todo",
];

pub fn register(builder: ServerBuilder, service: Arc<TodoService>) -> ServerBuilder {
    builder
        .tool("add_todo", add::AddTodoTool::new(service.clone()))
        .tool("show_all_todos", list::ShowAllTodosTool::new(service.clone()))
        .tool(
            "show_today_todos",
            today::ShowTodayTodosTool::new(service.clone()),
        )
        .tool("complete_todo", complete::CompleteTodoTool::new(service))
}
