// tasksync-core: Reconciliation and view-model layer between tasksync-api
// and whatever renders the result.

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod filter;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::SyncConfig;
pub use controller::TaskController;
pub use error::CoreError;
pub use filter::{
    AssigneeFilter, FilterCriteria, StatusFilter, apply_filters, describe_active, has_active,
    matches,
};
pub use model::{Assignee, DateGroup, GroupKey, Task};

// Re-export the gateway's connection state for consumers that only
// depend on this crate.
pub use tasksync_api::ConnectionState;
