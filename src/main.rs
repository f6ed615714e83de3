use anyhow::{Context, Result};
use clap::Parser;

fn main() -> Result<()> {
    let cli = notion_todo::cli::Cli::parse();

    match cli.command.clone() {
        Some(notion_todo::cli::CliCommand::Mcp(args)) => run_mcp(&cli, args.log_filter),
        None => run_mcp(&cli, None),
        Some(command) => {
            notion_todo::mcp::init_tracing(Some("warn".to_string()))?;
            let config = notion_todo::AppConfig::discover(cli.env_file.clone())
                .context("failed to load configuration")?;
            let service = notion_todo::TodoService::new(config)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to build tokio runtime")?;
            let stdout = std::io::stdout();
            let handle = stdout.lock();
            runtime.block_on(notion_todo::commands::execute(&service, command, handle))
        }
    }
}

fn run_mcp(cli: &notion_todo::cli::Cli, log_filter: Option<String>) -> Result<()> {
    let config = notion_todo::mcp::ServerConfig {
        env_file: cli.env_file.clone(),
        log_filter,
    };
    notion_todo::mcp::run_server_blocking(config)
}
