// Wire shapes exchanged with the tasksync service.
//
// These mirror the JSON the service sends and accepts, nothing more. The
// canonical view types live in `tasksync-core`; conversions between the two
// happen there.

use serde::{Deserialize, Serialize};

/// A task as the service serializes it.
///
/// The service also sends bookkeeping fields (`created_at`, `updated_at`);
/// deserialization tolerates and drops them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTask {
    pub id: i64,
    pub text: String,
    pub assignee: String,
    /// ISO calendar date (`YYYY-MM-DD`), no time component.
    #[serde(default)]
    pub due_date: Option<String>,
    pub completed: bool,
}

/// One pre-grouped bucket from `GET /api/todos`.
///
/// `date` is either a calendar date or the `"No Due Date"` sentinel. Group
/// order and task order are whatever the service returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireGroup {
    pub date: String,
    pub todos: Vec<WireTask>,
}

/// Body of `POST /api/todos`.
///
/// `due_date` is always present on the wire -- an unset date is an explicit
/// `null`, never an omitted field, so the service can tell "unset" from
/// "unspecified".
#[derive(Debug, Clone, Serialize)]
pub struct CreateTask<'a> {
    pub text: &'a str,
    pub assignee: &'a str,
    pub due_date: Option<&'a str>,
}

/// Body of `PUT /api/todos/{id}`.
///
/// This is a full replace, not a patch: all four fields are serialized on
/// every call, absent ones as `null`. Callers must supply current values for
/// fields they don't intend to change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTask {
    pub text: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
}

/// Envelope of every inbound push frame: `{ message_type, data }`.
///
/// `message_type` becomes the event-bus topic; `data` is forwarded opaquely.
#[derive(Debug, Clone, Deserialize)]
pub struct PushEnvelope {
    pub message_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}
