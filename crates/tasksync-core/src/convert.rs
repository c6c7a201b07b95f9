// ── Wire-to-view type conversions ──
//
// Bridges `tasksync_api::wire` payloads into the canonical view types.
// All conversions are pure and total: absent optional fields have defined
// defaults, and nothing here can fail or touch the network.

use tasksync_api::wire::{WireGroup, WireTask};

use crate::model::{DateGroup, GroupKey, Task};

impl From<WireTask> for Task {
    fn from(wire: WireTask) -> Self {
        Self {
            id: wire.id,
            text: wire.text,
            assignee: wire.assignee.into(),
            // Unset due date becomes the empty marker, never null.
            date: wire.due_date.unwrap_or_default(),
            completed: wire.completed,
        }
    }
}

impl From<WireGroup> for DateGroup {
    fn from(wire: WireGroup) -> Self {
        Self {
            key: GroupKey::from_wire(&wire.date),
            tasks: wire.todos.into_iter().map(Task::from).collect(),
        }
    }
}

impl From<&Task> for WireTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            text: task.text.clone(),
            assignee: task.assignee.as_str().to_owned(),
            due_date: (!task.date.is_empty()).then(|| task.date.clone()),
            completed: task.completed,
        }
    }
}

/// Map a full fetch payload into view groups, preserving group and task
/// order from the source.
pub fn view_groups(wire: Vec<WireGroup>) -> Vec<DateGroup> {
    wire.into_iter().map(DateGroup::from).collect()
}
