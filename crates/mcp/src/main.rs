use std::path::PathBuf;

use clap::Parser;
use notion_todo_mcp::{run_server, ServerConfig};

#[derive(Parser, Debug)]
#[command(
    name = "notion-todo-mcp",
    version,
    about = "Model Context Protocol server for a Notion-backed todo list"
)]
struct Args {
    /// Load settings from this dotenv file instead of the nearest .env
    #[arg(long = "env-file", value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Override the tracing filter (e.g. "info", "debug", or full directives)
    #[arg(long = "log", value_name = "DIRECTIVE")]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = ServerConfig {
        env_file: args.env_file,
        log_filter: args.log_filter,
    };

    run_server(config).await
}
