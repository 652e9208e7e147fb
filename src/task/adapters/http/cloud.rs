//! HTTP-backed cloud key-value mirror.

use crate::task::domain::Task;
use crate::task::ports::{
    CloudChange, CloudChangeReason, CloudStore, SnapshotStore, SnapshotStoreError,
    SnapshotStoreResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use url::Url;

/// Fixed key the snapshot document lives under.
const SNAPSHOT_KEY: &str = "day-tasks";

/// Default cadence of the external-change poll.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Buffered change notifications before lagging subscribers drop events.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

#[derive(Serialize)]
struct SaveBody<'a> {
    tasks: &'a [Task],
}

#[derive(Deserialize)]
struct SavedVersion {
    version: u64,
}

#[derive(Deserialize)]
struct CloudDocument {
    version: u64,
    tasks: Vec<Task>,
}

#[derive(Debug, Default)]
struct HttpCloudState {
    available: bool,
    last_sync: Option<DateTime<Utc>>,
    last_seen_version: Option<u64>,
    last_written_version: Option<u64>,
    synced_once: bool,
}

/// Cloud mirror speaking a minimal key-value REST surface.
///
/// The snapshot document lives under one fixed key; the store keeps the
/// version counter returned by the service and treats any version it
/// neither read nor wrote as an externally originated change. Transport
/// failures flip the store unavailable until a later request succeeds, so
/// the polling loop doubles as the availability probe.
#[derive(Debug)]
pub struct HttpCloudStore<C> {
    http: reqwest::Client,
    endpoint: Url,
    state: Arc<RwLock<HttpCloudState>>,
    changes: broadcast::Sender<CloudChange>,
    clock: Arc<C>,
}

impl<C> Clone for HttpCloudStore<C> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            endpoint: self.endpoint.clone(),
            state: Arc::clone(&self.state),
            changes: self.changes.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> HttpCloudStore<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates a store against the service base URL.
    ///
    /// # Errors
    ///
    /// Returns a [`url::ParseError`] when the snapshot key cannot be joined
    /// onto the base URL.
    pub fn new(base: &Url, clock: Arc<C>) -> Result<Self, url::ParseError> {
        let endpoint = base.join(&format!("kv/{SNAPSHOT_KEY}"))?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            state: Arc::new(RwLock::new(HttpCloudState {
                available: true,
                ..HttpCloudState::default()
            })),
            changes,
            clock,
        })
    }

    /// Spawns the external-change polling loop.
    ///
    /// Each tick fetches the document version and emits a change
    /// notification when another writer moved it.
    #[must_use]
    pub fn spawn_polling(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.poll_once().await;
            }
        })
    }

    /// Runs one poll step, returning the change reason emitted, if any.
    pub async fn poll_once(&self) -> Option<CloudChangeReason> {
        let response = match self.http.get(self.endpoint.clone()).send().await {
            Ok(response) => response,
            Err(err) => {
                self.mark_unavailable(&err);
                return None;
            }
        };
        if response.status() == StatusCode::NOT_FOUND {
            self.set_available(true);
            return None;
        }
        if !response.status().is_success() {
            warn!(status = %response.status(), "cloud poll rejected");
            return None;
        }
        let document: CloudDocument = match response.json().await {
            Ok(document) => document,
            Err(err) => {
                warn!(error = %err, "discarding undecodable cloud document");
                return None;
            }
        };
        self.set_available(true);
        let reason = self.observe_version(document.version);
        if let Some(reason) = reason {
            if self.changes.send(CloudChange { reason }).is_err() {
                debug!(?reason, "cloud change emitted with no subscribers");
            }
        }
        reason
    }

    /// Records an observed document version; returns the change reason when
    /// the version was produced by another writer.
    fn observe_version(&self, version: u64) -> Option<CloudChangeReason> {
        let mut state = self.state.write().ok()?;
        let own_write = state.last_written_version == Some(version);
        let already_seen = state.last_seen_version == Some(version);
        let reason = if own_write || already_seen {
            None
        } else if state.synced_once {
            Some(CloudChangeReason::ServerChange)
        } else {
            Some(CloudChangeReason::InitialSync)
        };
        state.last_seen_version = Some(version);
        state.synced_once = true;
        reason
    }

    fn set_available(&self, available: bool) {
        if let Ok(mut state) = self.state.write() {
            state.available = available;
        }
    }

    fn mark_unavailable(&self, err: &reqwest::Error) {
        warn!(error = %err, "cloud store unreachable");
        self.set_available(false);
    }

    fn stamp_sync(&self) {
        if let Ok(mut state) = self.state.write() {
            state.last_sync = Some(self.clock.utc());
        }
    }

    fn record_write(&self, version: u64) {
        if let Ok(mut state) = self.state.write() {
            state.last_written_version = Some(version);
            state.last_seen_version = Some(version);
            state.synced_once = true;
        }
    }
}

#[async_trait]
impl<C> SnapshotStore for HttpCloudStore<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn save(&self, tasks: &[Task]) -> SnapshotStoreResult<()> {
        if !self.is_available() {
            debug!("cloud store unavailable, skipping save");
            return Ok(());
        }
        let encoded = serde_json::to_vec(&SaveBody { tasks })
            .map_err(SnapshotStoreError::serialisation)?;
        let size = encoded.len();
        let response = self
            .http
            .put(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(encoded)
            .send()
            .await
            .map_err(|err| {
                self.mark_unavailable(&err);
                SnapshotStoreError::io(err)
            })?;
        if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Err(SnapshotStoreError::QuotaExceeded { size });
        }
        if !response.status().is_success() {
            return Err(SnapshotStoreError::io(std::io::Error::other(format!(
                "cloud store returned {}",
                response.status()
            ))));
        }
        let saved: SavedVersion = response
            .json()
            .await
            .map_err(SnapshotStoreError::serialisation)?;
        self.record_write(saved.version);
        self.set_available(true);
        self.stamp_sync();
        Ok(())
    }

    async fn load(&self) -> Option<Vec<Task>> {
        if !self.is_available() {
            debug!("cloud store unavailable, skipping load");
            return None;
        }
        let response = match self.http.get(self.endpoint.clone()).send().await {
            Ok(response) => response,
            Err(err) => {
                self.mark_unavailable(&err);
                return None;
            }
        };
        if response.status() == StatusCode::NOT_FOUND {
            self.set_available(true);
            return None;
        }
        if !response.status().is_success() {
            warn!(status = %response.status(), "cloud load rejected");
            return None;
        }
        let document: CloudDocument = match response.json().await {
            Ok(document) => document,
            Err(err) => {
                warn!(error = %err, "discarding undecodable cloud snapshot");
                return None;
            }
        };
        self.set_available(true);
        self.observe_version(document.version);
        self.stamp_sync();
        Some(document.tasks)
    }
}

#[async_trait]
impl<C> CloudStore for HttpCloudStore<C>
where
    C: Clock + Send + Sync + 'static,
{
    fn is_available(&self) -> bool {
        self.state.read().map(|state| state.available).unwrap_or(false)
    }

    fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.state.read().ok().and_then(|state| state.last_sync)
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<CloudChange> {
        self.changes.subscribe()
    }
}
