use serde::Serialize;

use crate::model::{FilterCriteria, SortDirection, SortField};
use crate::property::PropertyNames;

/// Body of a collection query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryBody {
    /// Absent when no criteria are set. An empty `and` is not the same thing
    /// to the store as no filter at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<CompoundFilter>,
    pub sorts: Vec<SortKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompoundFilter {
    pub and: Vec<Condition>,
}

/// `{"property": "Status", "select": {"equals": "Done"}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub property: String,
    #[serde(flatten)]
    pub test: ConditionTest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionTest {
    Select { equals: String },
    People { contains: String },
    Relation { contains: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SortKey {
    Property {
        property: String,
        direction: SortDirection,
    },
    Timestamp {
        timestamp: &'static str,
        direction: SortDirection,
    },
}

pub fn build_query(criteria: &FilterCriteria, names: &PropertyNames) -> QueryBody {
    let mut conditions = Vec::new();

    if let Some(status) = criteria.status {
        conditions.push(Condition {
            property: names.status.clone(),
            test: ConditionTest::Select {
                equals: status.as_str().to_string(),
            },
        });
    }

    if let Some(assignee) = &criteria.assignee {
        conditions.push(Condition {
            property: names.assignee.clone(),
            test: ConditionTest::People {
                contains: assignee.clone(),
            },
        });
    }

    if let Some(priority) = criteria.priority {
        conditions.push(Condition {
            property: names.priority.clone(),
            test: ConditionTest::Select {
                equals: priority.as_str().to_string(),
            },
        });
    }

    if let Some(project) = &criteria.project {
        conditions.push(Condition {
            property: names.project.clone(),
            test: ConditionTest::Relation {
                contains: project.clone(),
            },
        });
    }

    if let Some(sprint) = &criteria.sprint {
        conditions.push(Condition {
            property: names.sprint.clone(),
            test: ConditionTest::Relation {
                contains: sprint.clone(),
            },
        });
    }

    let filter = if conditions.is_empty() {
        None
    } else {
        Some(CompoundFilter { and: conditions })
    };

    QueryBody {
        filter,
        sorts: vec![sort_key(criteria.sort, criteria.direction, names)],
    }
}

fn sort_key(field: SortField, direction: SortDirection, names: &PropertyNames) -> SortKey {
    let property = match field {
        SortField::Due => &names.due,
        SortField::Priority => &names.priority,
        SortField::Task => &names.task,
        SortField::Created => {
            return SortKey::Timestamp {
                timestamp: "created_time",
                direction,
            }
        }
    };
    SortKey::Property {
        property: property.clone(),
        direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, TodoStatus};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn render(criteria: &FilterCriteria) -> Value {
        serde_json::to_value(build_query(criteria, &PropertyNames::default())).unwrap()
    }

    #[test]
    fn no_criteria_omits_filter_and_sorts_by_due() {
        assert_eq!(
            render(&FilterCriteria::default()),
            json!({ "sorts": [{ "property": "Due", "direction": "ascending" }] })
        );
    }

    #[test]
    fn every_criterion_becomes_one_condition() {
        let criteria = FilterCriteria {
            status: Some(TodoStatus::InProgress),
            assignee: Some("user-1".into()),
            priority: Some(Priority::High),
            project: Some("proj-1".into()),
            sprint: Some("sprint-9".into()),
            sort: SortField::Priority,
            direction: SortDirection::Descending,
        };

        assert_eq!(
            render(&criteria),
            json!({
                "filter": {
                    "and": [
                        { "property": "Status", "select": { "equals": "In progress" } },
                        { "property": "Assignee", "people": { "contains": "user-1" } },
                        { "property": "Priority", "select": { "equals": "High" } },
                        { "property": "Project", "relation": { "contains": "proj-1" } },
                        { "property": "Sprint", "relation": { "contains": "sprint-9" } }
                    ]
                },
                "sorts": [{ "property": "Priority", "direction": "descending" }]
            })
        );
    }

    #[test]
    fn condition_count_tracks_set_criteria() {
        let subsets: Vec<FilterCriteria> = (0u8..32)
            .map(|mask| FilterCriteria {
                status: (mask & 1 != 0).then_some(TodoStatus::Done),
                assignee: (mask & 2 != 0).then(|| "u".to_string()),
                priority: (mask & 4 != 0).then_some(Priority::Low),
                project: (mask & 8 != 0).then(|| "p".to_string()),
                sprint: (mask & 16 != 0).then(|| "s".to_string()),
                ..FilterCriteria::default()
            })
            .collect();

        for criteria in subsets {
            let body = build_query(&criteria, &PropertyNames::default());
            let expected = [
                criteria.status.is_some(),
                criteria.assignee.is_some(),
                criteria.priority.is_some(),
                criteria.project.is_some(),
                criteria.sprint.is_some(),
            ]
            .iter()
            .filter(|set| **set)
            .count();

            match body.filter {
                None => assert_eq!(expected, 0),
                Some(filter) => {
                    assert!(criteria.has_conditions());
                    assert_eq!(filter.and.len(), expected);
                }
            }
            assert_eq!(body.sorts.len(), 1);
        }
    }

    #[test]
    fn created_sorts_on_record_timestamp() {
        let criteria = FilterCriteria {
            sort: SortField::Created,
            ..FilterCriteria::default()
        };
        assert_eq!(
            render(&criteria)["sorts"],
            json!([{ "timestamp": "created_time", "direction": "ascending" }])
        );
    }
}
