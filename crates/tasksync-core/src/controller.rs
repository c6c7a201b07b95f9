// ── Reconciliation controller ──
//
// Owns the cached view state and keeps it synchronized with the service:
// load everything up front, then refetch everything on any change
// notification. No incremental merge, no diffing -- a change event always
// triggers a full, consistent resync.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use tasksync_api::wire::UpdateTask;
use tasksync_api::{ConnectionState, EventBus, PushChannel, RestClient, topic};

use crate::config::SyncConfig;
use crate::convert;
use crate::error::CoreError;
use crate::filter::{self, FilterCriteria};
use crate::model::{Assignee, DateGroup, Task};

/// Change topics that trigger a full resync.
const RESYNC_TOPICS: [&str; 4] = [
    topic::CREATED,
    topic::UPDATED,
    topic::TOGGLED,
    topic::DELETED,
];

/// The app-wide sync coordinator.
///
/// Cheaply cloneable. Mutations go out through the REST surface and are
/// confirmed only by the resulting push notification -- a mutation's own
/// response is never applied to the cached view.
#[derive(Clone)]
pub struct TaskController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    rest: RestClient,
    push: PushChannel,
    view: watch::Sender<Arc<Vec<DateGroup>>>,
    criteria: watch::Sender<FilterCriteria>,
    /// Stamps handed to fetches at issue time.
    fetch_seq: AtomicU64,
    /// Stamp of the newest fetch applied so far. Completions carrying an
    /// older stamp are discarded, so concurrent in-flight fetches converge
    /// on the most recently issued one.
    applied_seq: AtomicU64,
    handlers_installed: AtomicBool,
}

impl TaskController {
    /// Create a controller from configuration. Does NOT connect -- call
    /// [`connect()`](Self::connect) to open the push channel and load data.
    pub fn new(config: &SyncConfig) -> Result<Self, CoreError> {
        let rest = RestClient::new(config.base_url.clone(), &config.transport)?;
        let push_url = rest.push_url()?;
        let push = PushChannel::new(push_url, config.reconnect_delay);

        let (view, _) = watch::channel(Arc::new(Vec::new()));
        let (criteria, _) = watch::channel(FilterCriteria::default());

        Ok(Self {
            inner: Arc::new(ControllerInner {
                rest,
                push,
                view,
                criteria,
                fetch_seq: AtomicU64::new(0),
                applied_seq: AtomicU64::new(0),
                handlers_installed: AtomicBool::new(false),
            }),
        })
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Open the push channel, wire up change notifications, and perform
    /// the initial full load.
    ///
    /// A failed initial load leaves the view empty; the caller observes it
    /// through the view subscription like any other refresh.
    pub async fn connect(&self) {
        self.install_handlers();
        self.inner.push.connect();
        self.load_all().await;
    }

    /// Close the push channel and cancel any pending reconnect.
    pub fn disconnect(&self) {
        self.inner.push.disconnect();
    }

    /// Fetch the full task set and replace the cached view wholesale.
    ///
    /// On failure the view falls back to empty rather than retaining stale
    /// data -- a deliberate, lossy choice.
    pub async fn load_all(&self) {
        refresh(&self.inner).await;
    }

    fn install_handlers(&self) {
        if self.inner.handlers_installed.swap(true, Ordering::SeqCst) {
            return;
        }
        for topic in RESYNC_TOPICS {
            let weak = Arc::downgrade(&self.inner);
            self.inner.push.bus().subscribe(topic, move |_data| {
                // Every change event spawns its own independent refetch;
                // bursts are not coalesced.
                if let Some(inner) = weak.upgrade() {
                    tokio::spawn(async move { refresh(&inner).await });
                }
                Ok(())
            });
        }
    }

    // ── Mutations ────────────────────────────────────────────────

    /// Create a task. `due_date` is a calendar date string, empty for
    /// unset. Empty text is rejected before any network call.
    pub async fn add_task(
        &self,
        text: &str,
        assignee: &Assignee,
        due_date: &str,
    ) -> Result<(), CoreError> {
        let text = non_empty(text)?;
        let due = (!due_date.is_empty()).then_some(due_date);
        self.inner.rest.create(text, assignee.as_str(), due).await?;
        Ok(())
    }

    /// Replace a task's text, assignee, and due date. This rides the
    /// full-replace update: completion is sent as null, and the view
    /// updates only once the `todo_updated` notification arrives.
    pub async fn save_edits(
        &self,
        id: i64,
        text: &str,
        assignee: &Assignee,
        due_date: &str,
    ) -> Result<(), CoreError> {
        let text = non_empty(text)?;
        let update = UpdateTask {
            text: Some(text.to_owned()),
            assignee: Some(assignee.as_str().to_owned()),
            due_date: (!due_date.is_empty()).then(|| due_date.to_owned()),
            completed: None,
        };
        self.inner.rest.update(id, &update).await?;
        Ok(())
    }

    /// Flip a task's completion flag. The new value is computed
    /// server-side, never locally.
    pub async fn toggle_task(&self, id: i64) -> Result<(), CoreError> {
        self.inner.rest.toggle(id).await?;
        Ok(())
    }

    /// Delete a task.
    pub async fn remove_task(&self, id: i64) -> Result<(), CoreError> {
        self.inner.rest.delete(id).await?;
        Ok(())
    }

    // ── Filters ──────────────────────────────────────────────────

    /// Replace the filter criteria wholesale.
    pub fn set_filters(&self, criteria: FilterCriteria) {
        let _ = self.inner.criteria.send(criteria);
    }

    /// Reset all criteria to their defaults.
    pub fn clear_filters(&self) {
        let _ = self.inner.criteria.send(FilterCriteria::default());
    }

    /// Subscribe to filter criteria changes.
    pub fn filters(&self) -> watch::Receiver<FilterCriteria> {
        self.inner.criteria.subscribe()
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to the cached view state. Every full resync publishes a
    /// fresh snapshot here.
    pub fn view(&self) -> watch::Receiver<Arc<Vec<DateGroup>>> {
        self.inner.view.subscribe()
    }

    /// The current cached view state.
    pub fn snapshot(&self) -> Arc<Vec<DateGroup>> {
        self.inner.view.borrow().clone()
    }

    /// The current view state with the current filter criteria applied.
    pub fn filtered_snapshot(&self) -> Vec<DateGroup> {
        let criteria = self.inner.criteria.borrow().clone();
        filter::apply_filters(&self.snapshot(), &criteria)
    }

    /// Look a task up by id across all cached groups.
    pub fn find_task(&self, id: i64) -> Option<Task> {
        self.inner
            .view
            .borrow()
            .iter()
            .flat_map(|group| &group.tasks)
            .find(|task| task.id == id)
            .cloned()
    }

    /// Subscribe to push-channel connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.push.state()
    }

    /// The gateway's event bus, for lifecycle topics (`connected`,
    /// `disconnected`, `error`) and anything else a renderer wants to
    /// observe directly.
    pub fn bus(&self) -> &Arc<EventBus> {
        self.inner.push.bus()
    }
}

// ── Refresh ──────────────────────────────────────────────────────

/// One stamped fetch-transform-replace cycle.
async fn refresh(inner: &ControllerInner) {
    let seq = inner.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;

    let groups = match inner.rest.fetch_all().await {
        Ok(wire) => convert::view_groups(wire),
        Err(e) => {
            // Lossy fallback: do not retain stale data.
            warn!(error = %e, "full refresh failed, clearing view");
            Vec::new()
        }
    };

    // Single-threaded scheduling in practice; the stamp check only guards
    // against fetches completing out of issue order.
    let newest = inner.applied_seq.fetch_max(seq, Ordering::SeqCst);
    if newest >= seq {
        debug!(seq, newest, "discarding stale fetch result");
        return;
    }

    info!(seq, groups = groups.len(), "view state replaced");
    let _ = inner.view.send(Arc::new(groups));
}

fn non_empty(text: &str) -> Result<&str, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation("task text is empty"));
    }
    Ok(trimmed)
}
