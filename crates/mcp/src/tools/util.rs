use notion_todo_core::TodoError;
use serde_json::{json, Value};
use tracing::error;

const ACCESS_HINT: &str =
    "Please make sure your Notion integration is properly set up and has access to the database.";

pub fn validation_error(err: impl std::fmt::Display) -> pmcp::Error {
    pmcp::Error::validation(err.to_string())
}

pub fn internal_error(err: impl Into<anyhow::Error>) -> pmcp::Error {
    pmcp::Error::internal(err.into().to_string())
}

/// Turn a core failure into a message fit for the agent. Validation errors
/// are reported verbatim; store failures get context and a setup hint.
pub fn todo_error(action: &str, err: TodoError) -> pmcp::Error {
    match err {
        TodoError::Validation(message) => validation_error(message),
        other => {
            error!(
                action,
                retryable = other.is_retryable(),
                error = %other,
                "todo operation failed"
            );
            let retry = if other.is_retryable() {
                " The request can be retried."
            } else {
                ""
            };
            pmcp::Error::internal(format!(
                "Error {}: {}.{}\n{}",
                action, other, retry, ACCESS_HINT
            ))
        }
    }
}

/// Tools without required arguments may be called with no argument object.
pub fn object_or_empty(args: Value) -> Value {
    if args.is_null() {
        json!({})
    } else {
        args
    }
}

pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
pub(crate) fn test_service(
    server: &wiremock::MockServer,
) -> std::sync::Arc<notion_todo_core::TodoService> {
    use notion_todo_core::config::AppConfig;
    use notion_todo_core::TodoService;

    let config = AppConfig::new("secret", "db-1")
        .expect("config")
        .with_base_url(server.uri())
        .with_timeout(std::time::Duration::from_secs(2));
    std::sync::Arc::new(TodoService::new(config).expect("service"))
}

#[cfg(test)]
pub(crate) fn test_extra() -> pmcp::RequestHandlerExtra {
    pmcp::RequestHandlerExtra::new(
        "test-request".to_string(),
        tokio_util::sync::CancellationToken::new(),
    )
}

#[cfg(test)]
pub(crate) fn page(id: &str, properties: Value) -> Value {
    json!({
        "object": "page",
        "id": id,
        "created_time": "2025-02-20T09:30:00.000Z",
        "archived": false,
        "properties": properties
    })
}
