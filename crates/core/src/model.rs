use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TodoError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TodoStatus {
    #[serde(rename = "Not started")]
    NotStarted,
    #[serde(rename = "In progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl TodoStatus {
    /// Option name as stored in the collection's select property.
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::NotStarted => "Not started",
            TodoStatus::InProgress => "In progress",
            TodoStatus::Done => "Done",
        }
    }

    fn cli_name(&self) -> &'static str {
        match self {
            TodoStatus::NotStarted => "not-started",
            TodoStatus::InProgress => "in-progress",
            TodoStatus::Done => "done",
        }
    }
}

impl Default for TodoStatus {
    fn default() -> Self {
        TodoStatus::NotStarted
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TodoStatus {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_literal(s).as_str() {
            "not started" => Ok(TodoStatus::NotStarted),
            "in progress" => Ok(TodoStatus::InProgress),
            "done" => Ok(TodoStatus::Done),
            _ => Err(TodoError::validation(format!(
                "Unknown status '{}': expected Not started|In progress|Done",
                s
            ))),
        }
    }
}

impl ValueEnum for TodoStatus {
    fn value_variants<'a>() -> &'a [Self] {
        const VARIANTS: [TodoStatus; 3] = [
            TodoStatus::NotStarted,
            TodoStatus::InProgress,
            TodoStatus::Done,
        ];
        &VARIANTS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.cli_name()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_literal(s).as_str() {
            "high" => Ok(Priority::High),
            "medium" | "med" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(TodoError::validation(format!(
                "Unknown priority '{}': expected High|Medium|Low",
                s
            ))),
        }
    }
}

/// Ordering key for listings. `Created` sorts on the record timestamp rather
/// than on a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "lowercase")]
pub enum SortField {
    Due,
    Priority,
    Task,
    Created,
}

impl FromStr for SortField {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_literal(s).as_str() {
            "due" | "due date" => Ok(SortField::Due),
            "priority" => Ok(SortField::Priority),
            "task" | "task name" | "name" => Ok(SortField::Task),
            "created" | "created at" | "created time" => Ok(SortField::Created),
            _ => Err(TodoError::validation(format!(
                "Unknown sort field '{}': expected due|priority|task|created",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_literal(s).as_str() {
            "ascending" | "asc" => Ok(SortDirection::Ascending),
            "descending" | "desc" => Ok(SortDirection::Descending),
            _ => Err(TodoError::validation(format!(
                "Unknown sort direction '{}': expected ascending|descending",
                s
            ))),
        }
    }
}

/// Coarse scheduling hint accepted by `add_todo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "lowercase")]
pub enum When {
    Today,
    Later,
}

impl When {
    pub fn as_str(&self) -> &'static str {
        match self {
            When::Today => "today",
            When::Later => "later",
        }
    }
}

impl Default for When {
    fn default() -> Self {
        When::Later
    }
}

impl FromStr for When {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_literal(s).as_str() {
            "today" => Ok(When::Today),
            "later" => Ok(When::Later),
            _ => Err(TodoError::validation("When must be 'today' or 'later'")),
        }
    }
}

/// A todo projected from one record of the collection.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Todo {
    pub id: String,
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TodoStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.due == Some(date)
    }
}

/// Raw creation input. Literal fields stay as strings until the property
/// codec validates them, so every client reports the same errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTodo {
    pub task: String,
    pub assignee: Option<String>,
    pub due: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub sprint: Option<String>,
    pub project: Option<String>,
    pub link: Option<String>,
}

impl NewTodo {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Self::default()
        }
    }

    pub fn require_task(&self) -> Result<(), TodoError> {
        if self.task.trim().is_empty() {
            return Err(TodoError::validation("Task name cannot be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub status: Option<TodoStatus>,
    pub assignee: Option<String>,
    pub priority: Option<Priority>,
    pub project: Option<String>,
    pub sprint: Option<String>,
    pub sort: SortField,
    pub direction: SortDirection,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            status: None,
            assignee: None,
            priority: None,
            project: None,
            sprint: None,
            sort: SortField::Due,
            direction: SortDirection::Ascending,
        }
    }
}

impl FilterCriteria {
    pub fn has_conditions(&self) -> bool {
        self.status.is_some()
            || self.assignee.is_some()
            || self.priority.is_some()
            || self.project.is_some()
            || self.sprint.is_some()
    }
}

fn normalize_literal(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['_', '-'], " ")
}
