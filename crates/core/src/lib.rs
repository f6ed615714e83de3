pub mod config;
pub mod error;
pub mod model;
pub mod projector;
pub mod property;
pub mod query;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{TodoError, TodoResult};
pub use model::*;
pub use property::PropertyNames;
pub use services::TodoService;
pub use store::{NotionClient, TodoStore};
