// ── Runtime sync configuration ──
//
// Built by the embedding application and handed to `TaskController` --
// core never reads config files.

use std::time::Duration;

use tasksync_api::TransportConfig;
use url::Url;

/// Configuration for one sync session against a tasksync service.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// REST base URL (e.g. `http://localhost:3000`). The push-channel URL
    /// is derived from it.
    pub base_url: Url,
    /// Fixed delay before reconnecting after an unexpected channel close.
    pub reconnect_delay: Duration,
    /// HTTP transport tuning.
    pub transport: TransportConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000"
                .parse()
                .expect("default base URL is valid"),
            reconnect_delay: Duration::from_secs(3),
            transport: TransportConfig::default(),
        }
    }
}
