pub mod cli;
pub mod commands;

pub use notion_todo_core as core;
pub use notion_todo_core::config;
pub use notion_todo_core::model;
pub use notion_todo_core::services;
pub use notion_todo_core::{AppConfig, TodoService};

pub use notion_todo_mcp as mcp;
