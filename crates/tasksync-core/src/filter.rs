//! Pure filter/group engine.
//!
//! Everything here is a function of `(groups, criteria)` with no state and
//! no side effects. Filtering never alters group keys or ordering; it only
//! thins task lists and drops groups that end up empty.

use chrono::NaiveDate;

use crate::model::{Assignee, DateGroup, Task};

// ── Criteria ─────────────────────────────────────────────────────────

/// Assignee criterion: everything, or one specific assignee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssigneeFilter {
    #[default]
    All,
    Only(Assignee),
}

/// Completion criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
        }
    }
}

/// The full filter state. A pure value: replaced wholesale on each filter
/// change, never partially mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub assignee: AssigneeFilter,
    pub status: StatusFilter,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

// ── Engine ───────────────────────────────────────────────────────────

/// Does `task` pass `criteria`?
///
/// A task with no due date matches only when both range bounds are unset;
/// against any non-empty range it never matches. Both bounds are inclusive.
pub fn matches(task: &Task, criteria: &FilterCriteria) -> bool {
    if let AssigneeFilter::Only(assignee) = &criteria.assignee {
        if task.assignee != *assignee {
            return false;
        }
    }

    match criteria.status {
        StatusFilter::All => {}
        StatusFilter::Completed => {
            if !task.completed {
                return false;
            }
        }
        StatusFilter::Pending => {
            if task.completed {
                return false;
            }
        }
    }

    if criteria.date_from.is_some() || criteria.date_to.is_some() {
        let Some(date) = task.due_date() else {
            return false;
        };
        if let Some(from) = criteria.date_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = criteria.date_to {
            if date > to {
                return false;
            }
        }
    }

    true
}

/// Filter every group's task list, then drop groups left empty.
///
/// Group order and keys come through untouched.
pub fn apply_filters(groups: &[DateGroup], criteria: &FilterCriteria) -> Vec<DateGroup> {
    groups
        .iter()
        .map(|group| DateGroup {
            key: group.key.clone(),
            tasks: group
                .tasks
                .iter()
                .filter(|task| matches(task, criteria))
                .cloned()
                .collect(),
        })
        .filter(|group| !group.tasks.is_empty())
        .collect()
}

/// Human-readable fragments for each non-default criterion, in fixed
/// order: assignee, status, date range.
pub fn describe_active(criteria: &FilterCriteria) -> Vec<String> {
    let mut active = Vec::new();

    if let AssigneeFilter::Only(assignee) = &criteria.assignee {
        active.push(format!("Assignee: {assignee}"));
    }
    if criteria.status != StatusFilter::All {
        active.push(format!("Status: {}", criteria.status.as_str()));
    }
    if criteria.date_from.is_some() || criteria.date_to.is_some() {
        let from = criteria
            .date_from
            .map_or_else(|| "any".to_owned(), |d| d.to_string());
        let to = criteria
            .date_to
            .map_or_else(|| "any".to_owned(), |d| d.to_string());
        active.push(format!("Date: {from} to {to}"));
    }

    active
}

/// True iff any criterion departs from its default.
pub fn has_active(criteria: &FilterCriteria) -> bool {
    *criteria != FilterCriteria::default()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::model::GroupKey;

    use super::*;

    fn task(id: i64, assignee: Assignee, date: &str, completed: bool) -> Task {
        Task {
            id,
            text: format!("task {id}"),
            assignee,
            date: date.into(),
            completed,
        }
    }

    fn date(raw: &str) -> NaiveDate {
        raw.parse().expect("valid test date")
    }

    fn groups() -> Vec<DateGroup> {
        vec![
            DateGroup {
                key: GroupKey::Date("2024-01-01".into()),
                tasks: vec![
                    task(1, Assignee::Joe, "2024-01-01", true),
                    task(2, Assignee::Shannon, "2024-01-01", false),
                ],
            },
            DateGroup {
                key: GroupKey::NoDueDate,
                tasks: vec![task(3, Assignee::Unassigned, "", false)],
            },
        ]
    }

    #[test]
    fn default_criteria_is_the_identity() {
        let input = groups();
        assert_eq!(apply_filters(&input, &FilterCriteria::default()), input);
    }

    #[test]
    fn already_empty_groups_are_dropped_even_without_filters() {
        let input = vec![DateGroup {
            key: GroupKey::Date("2024-01-01".into()),
            tasks: Vec::new(),
        }];
        assert!(apply_filters(&input, &FilterCriteria::default()).is_empty());
    }

    #[test]
    fn assignee_mismatch_never_matches() {
        let criteria = FilterCriteria {
            assignee: AssigneeFilter::Only(Assignee::Joe),
            ..FilterCriteria::default()
        };
        assert!(!matches(&task(2, Assignee::Shannon, "", false), &criteria));
        assert!(matches(&task(1, Assignee::Joe, "", false), &criteria));
    }

    #[test]
    fn undated_task_matches_only_a_fully_unset_range() {
        let undated = task(3, Assignee::Unassigned, "", false);

        assert!(matches(&undated, &FilterCriteria::default()));

        let from_only = FilterCriteria {
            date_from: Some(date("2024-01-01")),
            ..FilterCriteria::default()
        };
        assert!(!matches(&undated, &from_only));

        let to_only = FilterCriteria {
            date_to: Some(date("2024-12-31")),
            ..FilterCriteria::default()
        };
        assert!(!matches(&undated, &to_only));
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let dated = task(1, Assignee::Joe, "2024-06-15", false);
        let criteria = FilterCriteria {
            date_from: Some(date("2024-06-15")),
            date_to: Some(date("2024-06-15")),
            ..FilterCriteria::default()
        };
        assert!(matches(&dated, &criteria));

        let day_late = FilterCriteria {
            date_from: Some(date("2024-06-16")),
            ..FilterCriteria::default()
        };
        assert!(!matches(&dated, &day_late));
    }

    #[test]
    fn completed_filter_thins_groups_and_drops_empty_ones() {
        let criteria = FilterCriteria {
            status: StatusFilter::Completed,
            ..FilterCriteria::default()
        };

        let filtered = apply_filters(&groups(), &criteria);

        // Only the completed task survives; the undated group, holding a
        // single pending task, is dropped entirely.
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].key, GroupKey::Date("2024-01-01".into()));
        assert_eq!(filtered[0].tasks.len(), 1);
        assert_eq!(filtered[0].tasks[0].id, 1);
    }

    #[test]
    fn describe_active_keeps_a_fixed_order() {
        let criteria = FilterCriteria {
            assignee: AssigneeFilter::Only(Assignee::Shannon),
            status: StatusFilter::Pending,
            date_from: Some(date("2024-01-01")),
            date_to: None,
        };

        assert_eq!(
            describe_active(&criteria),
            vec![
                "Assignee: Shannon".to_owned(),
                "Status: pending".to_owned(),
                "Date: 2024-01-01 to any".to_owned(),
            ]
        );
    }

    #[test]
    fn describe_active_is_empty_for_defaults() {
        assert!(describe_active(&FilterCriteria::default()).is_empty());
        assert!(!has_active(&FilterCriteria::default()));
    }

    #[test]
    fn has_active_flags_any_departure_from_defaults() {
        let criteria = FilterCriteria {
            date_to: Some(date("2024-12-31")),
            ..FilterCriteria::default()
        };
        assert!(has_active(&criteria));
    }
}
