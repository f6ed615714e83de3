mod tools;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use notion_todo_core::config::AppConfig;
use notion_todo_core::services::TodoService;
use pmcp::types::capabilities::ServerCapabilities;
use pmcp::Server;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Runtime configuration for the todo MCP server.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub env_file: Option<PathBuf>,
    pub log_filter: Option<String>,
}

/// Launch the MCP server using the provided configuration.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    init_tracing(config.log_filter.clone())?;

    let app_config =
        AppConfig::discover(config.env_file.clone()).context("failed to load configuration")?;
    let database_id = app_config.database_id().to_string();
    let service =
        Arc::new(TodoService::new(app_config).context("failed to initialize todo service")?);

    let server = build_server(service).context("failed to build MCP server")?;

    eprintln!(
        "Starting notion-todo-mcp v{} (database: {}) with tools: {}",
        env!("CARGO_PKG_VERSION"),
        database_id,
        tools::TOOL_NAMES.join(", ")
    );

    server
        .run_stdio()
        .await
        .map_err(|err| anyhow::anyhow!("MCP server error: {}", err))
}

/// Run the MCP server by creating an internal Tokio runtime.
pub fn run_server_blocking(config: ServerConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(run_server(config))
}

/// Install the stderr subscriber; stdout carries the protocol.
pub fn init_tracing(filter: Option<String>) -> Result<()> {
    let filter = filter.unwrap_or_else(|| "info".to_string());
    let directive: Directive = filter.parse()?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
    Ok(())
}

fn build_server(service: Arc<TodoService>) -> Result<Server> {
    let builder = Server::builder()
        .name("notion-todo")
        .version(env!("CARGO_PKG_VERSION"))
        .capabilities(ServerCapabilities::tools_only());

    let builder = tools::register(builder, service);
    builder
        .build()
        .map_err(|err| anyhow::anyhow!(err.to_string()))
}
