// REST surface of the gateway.
//
// Wraps `reqwest::Client` with tasksync URL construction and status
// checking. Mutations are fire-and-confirm: callers get the service's
// response back, but the authoritative state change arrives later over the
// push channel.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::wire::{CreateTask, UpdateTask, WireGroup, WireTask};

/// Async client for the tasksync REST API.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    /// Create a new client from a base URL (e.g. `http://localhost:3000`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: Url, http: reqwest::Client) -> Self {
        Self { http, base_url }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Derive the push-channel URL from the REST base URL.
    ///
    /// Same host and port, the REST scheme swapped for its WebSocket
    /// equivalent (`http` → `ws`, `https` → `wss`), path fixed to `/ws`.
    pub fn push_url(&self) -> Result<Url, Error> {
        let scheme = match self.base_url.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => {
                return Err(Error::ChannelConnect(format!(
                    "cannot derive push URL from scheme {other:?}"
                )));
            }
        };

        let mut url = self.base_url.join("/ws")?;
        url.set_scheme(scheme)
            .map_err(|()| Error::ChannelConnect(format!("cannot set scheme {scheme:?}")))?;
        Ok(url)
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch the full task set, pre-grouped by due date.
    pub async fn fetch_all(&self) -> Result<Vec<WireGroup>, Error> {
        let url = self.api_url("api/todos")?;
        debug!(%url, "fetching all tasks");
        let response = self.http.get(url).send().await?;
        Self::json(response).await
    }

    /// Create a task. An unset `due_date` goes on the wire as explicit null.
    pub async fn create(
        &self,
        text: &str,
        assignee: &str,
        due_date: Option<&str>,
    ) -> Result<WireTask, Error> {
        let url = self.api_url("api/todos")?;
        let body = CreateTask {
            text,
            assignee,
            due_date,
        };
        let response = self.http.post(url).json(&body).send().await?;
        Self::json(response).await
    }

    /// Replace a task wholesale. All four fields are always sent; see
    /// [`UpdateTask`] for the full-replace contract.
    pub async fn update(&self, id: i64, update: &UpdateTask) -> Result<WireTask, Error> {
        let url = self.api_url(&format!("api/todos/{id}"))?;
        let response = self.http.put(url).json(update).send().await?;
        Self::json(response).await
    }

    /// Flip a task's completion flag server-side.
    pub async fn toggle(&self, id: i64) -> Result<WireTask, Error> {
        let url = self.api_url(&format!("api/todos/{id}/toggle"))?;
        let response = self.http.put(url).send().await?;
        Self::json(response).await
    }

    /// Delete a task. Success is `true`; the service sends no body.
    pub async fn delete(&self, id: i64) -> Result<bool, Error> {
        let url = self.api_url(&format!("api/todos/{id}"))?;
        let response = self.http.delete(url).send().await?;
        Self::check(response)?;
        Ok(true)
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Reject non-success statuses, surfacing the status text.
    fn check(response: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(Error::Api {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .map_or_else(|| status.to_string(), str::to_owned),
        })
    }

    async fn json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
        Ok(Self::check(response)?.json().await?)
    }
}
