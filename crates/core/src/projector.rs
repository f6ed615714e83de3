use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{TodoError, TodoResult};
use crate::model::{Todo, TodoStatus};
use crate::property::{
    decode, decode_list, decode_text, parse_calendar_date, PlainValue, Properties, PropertyNames,
};

/// The parts of a store record the projector reads.
#[derive(Debug, Clone, Deserialize)]
struct PageRecord {
    id: String,
    created_time: DateTime<Utc>,
    #[serde(default)]
    properties: Properties,
}

/// Project one raw record into a [`Todo`].
///
/// Only a record without an id or creation timestamp is an error; any single
/// property that is missing or malformed just comes back empty.
pub fn project(raw: &Value, names: &PropertyNames) -> TodoResult<Todo> {
    let record =
        PageRecord::deserialize(raw).map_err(|err| TodoError::Projection(err.to_string()))?;
    if record.id.trim().is_empty() {
        return Err(TodoError::Projection("record has an empty id".to_string()));
    }

    let properties = &record.properties;
    Ok(Todo {
        id: record.id.clone(),
        task: decode_text(properties, &names.task).unwrap_or_default(),
        status: project_status(properties, &names.status),
        assignee: first(decode_list(properties, &names.assignee)),
        due: decode_text(properties, &names.due).and_then(|raw| parse_due(&raw)),
        priority: decode_text(properties, &names.priority).and_then(|raw| literal(&raw)),
        tags: decode_list(properties, &names.tags).unwrap_or_default(),
        sprint: first(decode_list(properties, &names.sprint)),
        project: first(decode_list(properties, &names.project)),
        link: decode_text(properties, &names.link),
        created_at: record.created_time,
    })
}

/// Project a page of records, dropping the ones that cannot be projected.
pub fn project_batch(records: &[Value], names: &PropertyNames) -> Vec<Todo> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| match project(raw, names) {
            Ok(todo) => Some(todo),
            Err(err) => {
                warn!(index, error = %err, "skipping record");
                None
            }
        })
        .collect()
}

/// Parse a due value as stored: a bare date, or a date-time whose calendar
/// date is taken in its own offset.
pub fn parse_due(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = parse_calendar_date(raw) {
        return Some(date);
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(timestamp) => Some(timestamp.date_naive()),
        Err(_) => {
            debug!(value = raw, "ignoring unparseable due date");
            None
        }
    }
}

pub fn is_due_on(todo: &Todo, date: NaiveDate) -> bool {
    todo.is_due_on(date)
}

pub fn is_due_today(todo: &Todo) -> bool {
    is_due_on(todo, today_utc())
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

fn project_status(properties: &Properties, key: &str) -> Option<TodoStatus> {
    match decode(properties, key)? {
        PlainValue::Text(raw) => literal(&raw),
        PlainValue::Flag(true) => Some(TodoStatus::Done),
        PlainValue::Flag(false) => Some(TodoStatus::NotStarted),
        PlainValue::List(_) => None,
    }
}

fn literal<T>(raw: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let parsed = raw.parse::<T>().ok();
    if parsed.is_none() {
        debug!(value = raw, "ignoring unrecognized literal");
    }
    parsed
}

fn first(values: Option<Vec<String>>) -> Option<String> {
    values.and_then(|values| values.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewTodo, Priority};
    use crate::property::encode;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn record(id: &str, properties: Value) -> Value {
        json!({
            "object": "page",
            "id": id,
            "created_time": "2025-02-20T09:30:00.000Z",
            "archived": false,
            "properties": properties
        })
    }

    fn dated(id: &str, due: NaiveDate) -> Todo {
        let raw = record(
            id,
            json!({ "Due": { "type": "date", "date": { "start": due.to_string() } } }),
        );
        project(&raw, &PropertyNames::default()).unwrap()
    }

    #[test]
    fn encoded_payload_projects_back() {
        let names = PropertyNames::default();
        let mut input = NewTodo::new("Write report");
        input.due = Some("2025-03-01".into());
        input.priority = Some("High".into());
        input.assignee = Some("user-1".into());
        input.tags = vec!["docs".into(), "q1".into()];
        input.sprint = Some("sprint-9".into());
        input.project = Some("proj-1".into());
        input.link = Some("https://example.com".into());

        let encoded = Value::Object(encode(&input, &names).unwrap());
        let todo = project(&record("page-1", encoded), &names).unwrap();

        assert_eq!(todo.id, "page-1");
        assert_eq!(todo.task, "Write report");
        assert_eq!(todo.status, Some(TodoStatus::NotStarted));
        assert_eq!(todo.priority, Some(Priority::High));
        assert_eq!(todo.due, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(todo.assignee.as_deref(), Some("user-1"));
        assert_eq!(todo.tags, vec!["docs".to_string(), "q1".to_string()]);
        assert_eq!(todo.sprint.as_deref(), Some("sprint-9"));
        assert_eq!(todo.project.as_deref(), Some("proj-1"));
        assert_eq!(todo.link.as_deref(), Some("https://example.com"));
    }

    #[rstest]
    #[case("Not started", TodoStatus::NotStarted, "Low", Priority::Low)]
    #[case("In progress", TodoStatus::InProgress, "Medium", Priority::Medium)]
    #[case("Done", TodoStatus::Done, "High", Priority::High)]
    fn explicit_literals_project_back(
        #[case] status: &str,
        #[case] expected_status: TodoStatus,
        #[case] priority: &str,
        #[case] expected_priority: Priority,
    ) {
        let names = PropertyNames::default();
        let mut input = NewTodo::new("Review PR");
        input.status = Some(status.into());
        input.priority = Some(priority.into());

        let encoded = Value::Object(encode(&input, &names).unwrap());
        let todo = project(&record("page-4", encoded), &names).unwrap();

        assert_eq!(todo.status, Some(expected_status));
        assert_eq!(todo.priority, Some(expected_priority));
        assert_eq!(todo.task, "Review PR");
    }

    #[test]
    fn minimal_payload_projects_required_fields_only() {
        let names = PropertyNames::default();
        let encoded = Value::Object(encode(&NewTodo::new("Call back"), &names).unwrap());
        let todo = project(&record("page-2", encoded), &names).unwrap();

        assert_eq!(todo.task, "Call back");
        assert_eq!(todo.priority, Some(Priority::Medium));
        assert_eq!(todo.due, None);
        assert!(todo.tags.is_empty());
        assert_eq!(todo.assignee, None);
        assert_eq!(todo.link, None);
    }

    #[rstest]
    #[case("tomorrow")]
    #[case("2025-13-01")]
    #[case("2025-02-30")]
    #[case("01/03/2025")]
    #[case("")]
    fn malformed_due_degrades_to_absent(#[case] due: &str) {
        let raw = record(
            "page-3",
            json!({ "Due": { "type": "date", "date": { "start": due } } }),
        );
        let todo = project(&raw, &PropertyNames::default()).unwrap();
        assert_eq!(todo.due, None);
    }

    #[test]
    fn date_time_due_keeps_its_own_calendar_date() {
        assert_eq!(
            parse_due("2025-03-01T23:30:00.000-05:00"),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
    }

    #[test]
    fn unknown_literals_project_as_absent() {
        let raw = record(
            "page-4",
            json!({
                "Status": { "type": "select", "select": { "name": "Blocked" } },
                "Priority": { "type": "select", "select": { "name": "P0" } }
            }),
        );
        let todo = project(&raw, &PropertyNames::default()).unwrap();
        assert_eq!(todo.status, None);
        assert_eq!(todo.priority, None);
        assert_eq!(todo.task, "");
    }

    #[test]
    fn checkbox_status_maps_to_done_or_not_started() {
        let names = PropertyNames::default();
        let checked = record("a", json!({ "Status": { "type": "checkbox", "checkbox": true } }));
        let unchecked = record("b", json!({ "Status": { "type": "checkbox", "checkbox": false } }));
        assert_eq!(project(&checked, &names).unwrap().status, Some(TodoStatus::Done));
        assert_eq!(
            project(&unchecked, &names).unwrap().status,
            Some(TodoStatus::NotStarted)
        );
    }

    #[test]
    fn batch_skips_malformed_records() {
        let names = PropertyNames::default();
        let records = vec![
            record("ok-1", json!({})),
            json!({ "id": "no-created-time", "properties": {} }),
            record("ok-2", json!({})),
            json!("garbage"),
            record("ok-3", json!({})),
        ];

        let todos = project_batch(&records, &names);
        let ids: Vec<&str> = todos.iter().map(|todo| todo.id.as_str()).collect();
        assert_eq!(ids, vec!["ok-1", "ok-2", "ok-3"]);
    }

    #[test]
    fn due_today_matches_exact_date_only() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(is_due_on(&dated("t", today), today));
        assert!(!is_due_on(&dated("y", today - Duration::days(1)), today));
        assert!(!is_due_on(&dated("f", today + Duration::days(1)), today));

        let undated = project(&record("u", json!({})), &PropertyNames::default()).unwrap();
        assert!(!is_due_on(&undated, today));
        assert!(!is_due_today(&undated));
    }
}
