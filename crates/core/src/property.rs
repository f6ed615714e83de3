//! Mapping between flat todo fields and the store's `type`-tagged properties.
//!
//! Decoding is best-effort: a missing key, a null payload or a shape the
//! codec does not understand all come back as `None`. Encoding validates its
//! input and only emits properties for fields that are actually set, so a
//! payload never clears a column by accident.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{TodoError, TodoResult};
use crate::model::{NewTodo, Priority, TodoStatus};

/// Property bag of a record, keyed by column name.
pub type Properties = Map<String, Value>;

static CALENDAR_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));
static PAGE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{12}$")
        .expect("valid regex")
});

/// Column names of the todo collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNames {
    pub task: String,
    pub status: String,
    pub assignee: String,
    pub due: String,
    pub priority: String,
    pub tags: String,
    pub sprint: String,
    pub project: String,
    pub link: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            task: "Task name".to_string(),
            status: "Status".to_string(),
            assignee: "Assignee".to_string(),
            due: "Due".to_string(),
            priority: "Priority".to_string(),
            tags: "Tags".to_string(),
            sprint: "Sprint".to_string(),
            project: "Project".to_string(),
            link: "Link".to_string(),
        }
    }
}

/// One property value in the store's wire shape, e.g.
/// `{"type": "select", "select": {"name": "High"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default, deserialize_with = "null_as_empty")]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default, deserialize_with = "null_as_empty")]
        rich_text: Vec<RichText>,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    Status {
        #[serde(default)]
        status: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default, deserialize_with = "null_as_empty")]
        multi_select: Vec<SelectOption>,
    },
    Date {
        #[serde(default)]
        date: Option<DateValue>,
    },
    People {
        #[serde(default, deserialize_with = "null_as_empty")]
        people: Vec<PersonRef>,
    },
    Relation {
        #[serde(default, deserialize_with = "null_as_empty")]
        relation: Vec<RelationRef>,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    Checkbox {
        #[serde(default, deserialize_with = "null_as_empty")]
        checkbox: bool,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(rename = "type", default = "text_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<String>,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            kind: text_kind(),
            text: Some(TextContent {
                content: content.into(),
            }),
            plain_text: None,
        }
    }

    fn content(&self) -> Option<&str> {
        self.text
            .as_ref()
            .map(|text| text.content.as_str())
            .filter(|content| !content.is_empty())
            .or(self.plain_text.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

impl SelectOption {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    #[serde(default)]
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRef {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRef {
    pub id: String,
}

/// Flattened form of a decoded property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlainValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
}

impl PlainValue {
    pub fn into_text(self) -> Option<String> {
        match self {
            PlainValue::Text(text) => Some(text),
            PlainValue::List(_) | PlainValue::Flag(_) => None,
        }
    }

    /// Lists pass through; a single text value becomes a one-element list.
    pub fn into_list(self) -> Option<Vec<String>> {
        match self {
            PlainValue::List(items) => Some(items),
            PlainValue::Text(text) => Some(vec![text]),
            PlainValue::Flag(_) => None,
        }
    }
}

impl PropertyValue {
    pub fn title(text: impl Into<String>) -> Self {
        PropertyValue::Title {
            title: vec![RichText::plain(text)],
        }
    }

    pub fn select(name: impl Into<String>) -> Self {
        PropertyValue::Select {
            select: Some(SelectOption::named(name)),
        }
    }

    pub fn multi_select<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PropertyValue::MultiSelect {
            multi_select: names.into_iter().map(SelectOption::named).collect(),
        }
    }

    pub fn date(start: impl Into<String>) -> Self {
        PropertyValue::Date {
            date: Some(DateValue {
                start: start.into(),
                end: None,
            }),
        }
    }

    pub fn person(id: impl Into<String>) -> Self {
        PropertyValue::People {
            people: vec![PersonRef {
                id: id.into(),
                name: None,
            }],
        }
    }

    pub fn relation(id: impl Into<String>) -> Self {
        PropertyValue::Relation {
            relation: vec![RelationRef { id: id.into() }],
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        PropertyValue::Url {
            url: Some(url.into()),
        }
    }

    /// Reduce to a plain value; empty payloads yield `None`.
    pub fn into_plain(self) -> Option<PlainValue> {
        match self {
            PropertyValue::Title { title: runs } | PropertyValue::RichText { rich_text: runs } => {
                first_run(&runs).map(PlainValue::Text)
            }
            PropertyValue::Select { select: option } | PropertyValue::Status { status: option } => {
                option
                    .map(|option| option.name)
                    .filter(|name| !name.is_empty())
                    .map(PlainValue::Text)
            }
            PropertyValue::MultiSelect { multi_select } => non_empty_list(
                multi_select.into_iter().map(|option| option.name).collect(),
            ),
            PropertyValue::Date { date } => date
                .map(|date| date.start)
                .filter(|start| !start.is_empty())
                .map(PlainValue::Text),
            PropertyValue::People { people } => non_empty_list(
                people
                    .into_iter()
                    .map(|person| person.name.filter(|name| !name.is_empty()).unwrap_or(person.id))
                    .collect(),
            ),
            PropertyValue::Relation { relation } => {
                non_empty_list(relation.into_iter().map(|related| related.id).collect())
            }
            PropertyValue::Url { url } => url.filter(|url| !url.is_empty()).map(PlainValue::Text),
            PropertyValue::Checkbox { checkbox } => Some(PlainValue::Flag(checkbox)),
            PropertyValue::Unsupported => None,
        }
    }
}

/// Look up `key` and reduce it to a plain value.
pub fn decode(properties: &Properties, key: &str) -> Option<PlainValue> {
    let raw = properties.get(key)?;
    match PropertyValue::deserialize(raw) {
        Ok(value) => value.into_plain(),
        Err(err) => {
            debug!(property = key, error = %err, "ignoring undecodable property");
            None
        }
    }
}

pub fn decode_text(properties: &Properties, key: &str) -> Option<String> {
    decode(properties, key).and_then(PlainValue::into_text)
}

pub fn decode_list(properties: &Properties, key: &str) -> Option<Vec<String>> {
    decode(properties, key).and_then(PlainValue::into_list)
}

/// Build a create payload. Status and priority fall back to their defaults;
/// every other optional field is omitted when unset or blank.
pub fn encode(input: &NewTodo, names: &PropertyNames) -> TodoResult<Properties> {
    input.require_task()?;

    let status = match non_blank(&input.status) {
        Some(raw) => raw.parse::<TodoStatus>()?,
        None => TodoStatus::default(),
    };
    let priority = match non_blank(&input.priority) {
        Some(raw) => raw.parse::<Priority>()?,
        None => Priority::default(),
    };
    let due = non_blank(&input.due).map(parse_calendar_date).transpose()?;

    let mut properties = Properties::new();
    insert(&mut properties, &names.task, PropertyValue::title(input.task.as_str()))?;
    insert(&mut properties, &names.status, PropertyValue::select(status.as_str()))?;
    insert(&mut properties, &names.priority, PropertyValue::select(priority.as_str()))?;

    if let Some(due) = due {
        let start = due.format("%Y-%m-%d").to_string();
        insert(&mut properties, &names.due, PropertyValue::date(start))?;
    }
    if let Some(assignee) = non_blank(&input.assignee) {
        insert(&mut properties, &names.assignee, PropertyValue::person(assignee))?;
    }
    let tags = normalize_tags(&input.tags);
    if !tags.is_empty() {
        insert(&mut properties, &names.tags, PropertyValue::multi_select(tags))?;
    }
    if let Some(sprint) = non_blank(&input.sprint) {
        insert(&mut properties, &names.sprint, PropertyValue::relation(sprint))?;
    }
    if let Some(project) = non_blank(&input.project) {
        insert(&mut properties, &names.project, PropertyValue::relation(project))?;
    }
    if let Some(link) = non_blank(&input.link) {
        insert(&mut properties, &names.link, PropertyValue::url(link))?;
    }

    Ok(properties)
}

/// Payload that moves a record to `status` and touches nothing else.
pub fn encode_status(status: TodoStatus, names: &PropertyNames) -> TodoResult<Properties> {
    let mut properties = Properties::new();
    insert(&mut properties, &names.status, PropertyValue::select(status.as_str()))?;
    Ok(properties)
}

/// Strict `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(raw: &str) -> TodoResult<NaiveDate> {
    let invalid = || {
        TodoError::validation(format!(
            "Invalid due date '{}': expected YYYY-MM-DD",
            raw
        ))
    };
    if !CALENDAR_DATE.is_match(raw) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())
}

/// A page id: 32 hex digits, with or without the 8-4-4-4-12 dashes.
pub fn parse_page_id(raw: &str) -> TodoResult<&str> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(TodoError::validation("Task ID is required"));
    }
    if !PAGE_ID.is_match(id) {
        return Err(TodoError::validation(format!(
            "Invalid task ID '{}': expected a Notion page id",
            id
        )));
    }
    Ok(id)
}

fn insert(properties: &mut Properties, key: &str, value: PropertyValue) -> TodoResult<()> {
    let encoded = serde_json::to_value(value)
        .map_err(|err| TodoError::validation(format!("cannot encode '{}': {}", key, err)))?;
    properties.insert(key.to_string(), encoded);
    Ok(())
}

fn first_run(runs: &[RichText]) -> Option<String> {
    runs.first()
        .and_then(RichText::content)
        .map(str::to_string)
        .filter(|content| !content.is_empty())
}

fn non_empty_list(items: Vec<String>) -> Option<PlainValue> {
    let items: Vec<String> = items.into_iter().filter(|item| !item.is_empty()).collect();
    if items.is_empty() {
        None
    } else {
        Some(PlainValue::List(items))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut result = Vec::new();
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            result.push(trimmed.to_string());
        }
    }
    result
}

fn text_kind() -> String {
    "text".to_string()
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
