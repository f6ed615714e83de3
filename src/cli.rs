use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::model::{
    FilterCriteria, NewTodo, Priority, SortDirection, SortField, TodoStatus, When,
};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "notion-todo",
    version,
    about = "A todo list that lives in a Notion database.",
    after_help = "Examples:\n  notion-todo             Run the MCP server over stdio (same as `notion-todo mcp`)\n  notion-todo mcp --log debug\n  notion-todo add Write report --due 2025-03-01 --priority high\n  notion-todo today\n  notion-todo complete <ID>"
)]
pub struct Cli {
    /// Load settings from this dotenv file instead of the nearest .env
    #[arg(long, value_name = "PATH", global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Run the Model Context Protocol server over stdio (default command)
    Mcp(McpArgs),
    /// List todos, optionally filtered and sorted
    List(ListArgs),
    /// List todos due today (UTC)
    Today,
    /// Add a todo
    Add(AddArgs),
    /// Mark a todo as done
    Complete(CompleteArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct McpArgs {
    /// Override the tracing filter for the MCP server (e.g. "info", "debug")
    #[arg(long = "log", value_name = "DIRECTIVE")]
    pub log_filter: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, value_enum)]
    pub status: Option<TodoStatus>,

    /// Notion user id of the assignee
    #[arg(long)]
    pub assignee: Option<String>,

    #[arg(long, value_enum)]
    pub priority: Option<Priority>,

    /// Page id of a related project
    #[arg(long)]
    pub project: Option<String>,

    /// Page id of a related sprint
    #[arg(long)]
    pub sprint: Option<String>,

    #[arg(long, value_enum, default_value = "due")]
    pub sort: SortField,

    #[arg(long, value_enum, default_value = "ascending")]
    pub direction: SortDirection,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Task name
    #[arg(value_name = "TASK", required = true)]
    pub task: Vec<String>,

    /// `today` sets the due date to today unless --due is given
    #[arg(long, value_enum, default_value = "later")]
    pub when: When,

    /// Due date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub due: Option<String>,

    /// Defaults to medium
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,

    /// Defaults to not-started
    #[arg(long, value_enum)]
    pub status: Option<TodoStatus>,

    /// Notion user id of the assignee
    #[arg(long)]
    pub assignee: Option<String>,

    /// Add tags (comma-separated or repeated flag)
    #[arg(long, value_delimiter = ',', action = ArgAction::Append)]
    pub tag: Vec<String>,

    /// Page id of the related sprint
    #[arg(long)]
    pub sprint: Option<String>,

    /// Page id of the related project
    #[arg(long)]
    pub project: Option<String>,

    /// External link for the todo
    #[arg(long)]
    pub link: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CompleteArgs {
    /// Id of the todo to mark as done
    #[arg(value_name = "ID")]
    pub id: String,
}

impl From<&ListArgs> for FilterCriteria {
    fn from(args: &ListArgs) -> Self {
        FilterCriteria {
            status: args.status,
            assignee: args.assignee.clone(),
            priority: args.priority,
            project: args.project.clone(),
            sprint: args.sprint.clone(),
            sort: args.sort,
            direction: args.direction,
        }
    }
}

impl From<AddArgs> for NewTodo {
    fn from(args: AddArgs) -> Self {
        NewTodo {
            task: args.task.join(" "),
            assignee: args.assignee,
            due: args.due,
            priority: args.priority.map(|priority| priority.as_str().to_string()),
            status: args.status.map(|status| status.as_str().to_string()),
            tags: args.tag,
            sprint: args.sprint,
            project: args.project,
            link: args.link,
        }
    }
}
