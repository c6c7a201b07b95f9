//! View-model types consumed by renderers.
//!
//! These are the in-memory shapes derived from the wire payloads in
//! `tasksync_api::wire`. The whole set is read-mostly: it is replaced
//! wholesale on every change notification, never patched in place.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Assignee ─────────────────────────────────────────────────────────

/// Who a task belongs to. Open to extension: unknown wire values land in
/// `Other` instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Assignee {
    Unassigned,
    Joe,
    Shannon,
    Other(String),
}

impl Assignee {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unassigned => "Unassigned",
            Self::Joe => "Joe",
            Self::Shannon => "Shannon",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for Assignee {
    fn from(raw: &str) -> Self {
        match raw {
            "Unassigned" => Self::Unassigned,
            "Joe" => Self::Joe,
            "Shannon" => Self::Shannon,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for Assignee {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<Assignee> for String {
    fn from(assignee: Assignee) -> Self {
        assignee.as_str().to_owned()
    }
}

impl fmt::Display for Assignee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Task ─────────────────────────────────────────────────────────────

/// One task as the renderer sees it.
///
/// `date` is the due date as an ISO calendar date string, with the empty
/// string as the unset marker -- never null. The id is server-assigned and
/// immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub assignee: Assignee,
    pub date: String,
    pub completed: bool,
}

impl Task {
    /// The due date parsed as a calendar date, `None` when unset or
    /// unparseable.
    pub fn due_date(&self) -> Option<NaiveDate> {
        if self.date.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

// ── GroupKey ─────────────────────────────────────────────────────────

/// Key of a due-date group: a calendar date, or the distinct "no date"
/// sentinel. The sentinel is its own key, not null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    Date(String),
    NoDueDate,
}

impl GroupKey {
    /// The sentinel the service uses for undated tasks.
    pub const NO_DUE_DATE: &'static str = "No Due Date";

    pub fn from_wire(raw: &str) -> Self {
        if raw == Self::NO_DUE_DATE {
            Self::NoDueDate
        } else {
            Self::Date(raw.to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Date(date) => date,
            Self::NoDueDate => Self::NO_DUE_DATE,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── DateGroup ────────────────────────────────────────────────────────

/// An ordered run of tasks sharing a due date.
///
/// Group order and task order are preserved from the data source; the
/// client never re-sorts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateGroup {
    pub key: GroupKey,
    pub tasks: Vec<Task>,
}

impl DateGroup {
    /// How many of the group's tasks are done, for `3/5`-style headers.
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn assignee_round_trips_known_and_unknown_values() {
        assert_eq!(Assignee::from("Joe"), Assignee::Joe);
        assert_eq!(Assignee::from("Grandma"), Assignee::Other("Grandma".into()));
        assert_eq!(Assignee::Other("Grandma".into()).as_str(), "Grandma");

        let json = serde_json::to_string(&Assignee::Shannon).expect("serialize");
        assert_eq!(json, r#""Shannon""#);
        let back: Assignee = serde_json::from_str(r#""Grandma""#).expect("deserialize");
        assert_eq!(back, Assignee::Other("Grandma".into()));
    }

    #[test]
    fn group_key_recognizes_the_sentinel() {
        assert_eq!(GroupKey::from_wire("No Due Date"), GroupKey::NoDueDate);
        assert_eq!(
            GroupKey::from_wire("2024-01-01"),
            GroupKey::Date("2024-01-01".into())
        );
        assert_eq!(GroupKey::NoDueDate.as_str(), "No Due Date");
    }

    #[test]
    fn task_due_date_parses_or_is_none() {
        let mut task = Task {
            id: 1,
            text: "Buy milk".into(),
            assignee: Assignee::Joe,
            date: "2024-01-01".into(),
            completed: false,
        };
        assert_eq!(
            task.due_date(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );

        task.date = String::new();
        assert_eq!(task.due_date(), None);

        task.date = "not-a-date".into();
        assert_eq!(task.due_date(), None);
    }

    #[test]
    fn completed_count_over_a_group() {
        let group = DateGroup {
            key: GroupKey::NoDueDate,
            tasks: vec![
                Task {
                    id: 1,
                    text: "a".into(),
                    assignee: Assignee::Unassigned,
                    date: String::new(),
                    completed: true,
                },
                Task {
                    id: 2,
                    text: "b".into(),
                    assignee: Assignee::Unassigned,
                    date: String::new(),
                    completed: false,
                },
            ],
        };
        assert_eq!(group.completed_count(), 1);
    }
}
