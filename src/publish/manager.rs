use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::composition::frame::{Composite, OutputFormat};
use crate::foundation::error::{StripError, StripResult};
use crate::publish::clock::{Clock, SystemClock};
use crate::publish::countdown::{CountdownHandle, schedule_countdown};
use crate::publish::store::ObjectStore;

/// Lifecycle of one published composite.
///
/// `Idle -> Uploading -> Published -> Deleted`, with `Uploading -> Failed -> Idle` on error.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PublicationState {
    /// Nothing published; `publish` is accepted.
    #[default]
    Idle,
    /// An upload is in flight.
    Uploading,
    /// The link is live until `expires_at`.
    Published {
        /// Time-boxed link to the stored object.
        signed_url: String,
        /// When the link and object expire.
        expires_at: DateTime<Utc>,
    },
    /// The last attempt failed; transient, followed by `Idle`.
    Failed,
    /// The object was removed. Terminal.
    Deleted,
}

/// Observable state of a [`PublicationManager`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PublicationRecord {
    /// Key of the stored object while it exists remotely.
    pub remote_key: Option<String>,
    /// Lifecycle state.
    pub state: PublicationState,
    /// Whole seconds left on the countdown; zero outside `Published`.
    pub remaining_secs: u64,
    /// Last recovered problem, e.g. a failed deletion.
    pub last_warning: Option<String>,
}

impl PublicationRecord {
    /// Live link, if published.
    pub fn signed_url(&self) -> Option<&str> {
        match &self.state {
            PublicationState::Published { signed_url, .. } => Some(signed_url),
            _ => None,
        }
    }

    /// Whether the state is `Published`.
    pub fn is_published(&self) -> bool {
        matches!(self.state, PublicationState::Published { .. })
    }
}

/// Links are ephemeral; one day is the longest accepted lifetime.
const MAX_TTL_SECS: u64 = 24 * 60 * 60;

/// Settings for [`PublicationManager`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishOptions {
    /// Link lifetime and countdown length.
    pub ttl_secs: u64,
    /// Countdown tick period.
    pub tick_ms: u64,
    /// Prefix of generated object keys.
    pub key_prefix: String,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            ttl_secs: 60,
            tick_ms: 1000,
            key_prefix: "photo-strip-".to_string(),
        }
    }
}

impl PublishOptions {
    fn validate(&self) -> StripResult<()> {
        if !(1..=MAX_TTL_SECS).contains(&self.ttl_secs) {
            return Err(StripError::invalid_config(format!(
                "ttl_secs must be in 1..={MAX_TTL_SECS}, got {}",
                self.ttl_secs
            )));
        }
        if self.tick_ms == 0 {
            return Err(StripError::invalid_config("tick_ms must be > 0"));
        }
        if !self
            .key_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        {
            return Err(StripError::invalid_config(format!(
                "key prefix '{}' may only contain [A-Za-z0-9_-]",
                self.key_prefix
            )));
        }
        Ok(())
    }
}

/// Result of a [`PublicationManager::publish`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The composite is live behind `signed_url`.
    Published {
        /// Time-boxed link.
        signed_url: String,
    },
    /// A publication already exists or is in flight; nothing was done.
    Ignored,
    /// `leave` was called during the upload; the object was removed again.
    Withdrawn,
}

struct Inner {
    record: PublicationRecord,
    countdown: Option<CountdownHandle>,
    leave_requested: bool,
}

struct Shared {
    store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    options: PublishOptions,
    inner: Mutex<Inner>,
    tx: watch::Sender<PublicationRecord>,
}

impl Shared {
    /// Mutate the record under the lock without notifying subscribers.
    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }

    /// Mutate the record under the lock and broadcast the new snapshot.
    fn update<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let out = f(&mut inner);
        self.tx.send_replace(inner.record.clone());
        out
    }

    fn broadcast(&self) {
        self.update(|_| ());
    }

    fn snapshot(&self) -> PublicationRecord {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record
            .clone()
    }

    fn make_key(&self, format: OutputFormat) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "{}{}-{}.{}",
            self.options.key_prefix,
            self.clock.now().timestamp_millis(),
            id.get(..8).unwrap_or(&id),
            format.extension()
        )
    }

    /// Tear down a live publication. Only the caller that takes the key deletes it.
    ///
    /// Subscribers see `Deleted` once the remote delete has settled.
    async fn expire(&self, reason: &'static str) {
        let taken = self.with_inner(|inner| {
            if !inner.record.is_published() {
                return None;
            }
            inner.record.state = PublicationState::Deleted;
            inner.record.remaining_secs = 0;
            Some((inner.record.remote_key.take(), inner.countdown.take()))
        });
        let Some((key, countdown)) = taken else {
            return;
        };
        drop(countdown);
        if let Some(key) = key {
            tracing::debug!(%key, reason, "publication ended");
            self.delete_best_effort(&key).await;
        }
        self.broadcast();
    }

    async fn delete_best_effort(&self, key: &str) {
        match self.store.delete(key).await {
            Ok(()) => tracing::debug!(%key, "remote object deleted"),
            Err(e) => {
                let err = StripError::deletion(format!("'{key}': {e}"));
                tracing::warn!(error = %err, "remote object may linger until the store expires it");
                self.with_inner(|inner| inner.record.last_warning = Some(err.to_string()));
            }
        }
    }
}

/// Uploads one composite, exposes a signed link for a fixed time, and deletes it afterwards.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct PublicationManager {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for PublicationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicationManager")
            .field("options", &self.shared.options)
            .field("record", &self.shared.snapshot())
            .finish()
    }
}

impl PublicationManager {
    /// Manager using the system clock.
    pub fn new(store: Arc<dyn ObjectStore>, options: PublishOptions) -> StripResult<Self> {
        Self::with_clock(store, Arc::new(SystemClock), options)
    }

    /// Manager with an explicit clock.
    pub fn with_clock(
        store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        options: PublishOptions,
    ) -> StripResult<Self> {
        options.validate()?;
        let (tx, _rx) = watch::channel(PublicationRecord::default());
        Ok(Self {
            shared: Arc::new(Shared {
                store,
                clock,
                options,
                inner: Mutex::new(Inner {
                    record: PublicationRecord::default(),
                    countdown: None,
                    leave_requested: false,
                }),
                tx,
            }),
        })
    }

    /// Current record.
    pub fn record(&self) -> PublicationRecord {
        self.shared.snapshot()
    }

    /// Receiver of every record change.
    pub fn subscribe(&self) -> watch::Receiver<PublicationRecord> {
        self.shared.tx.subscribe()
    }

    /// Active options.
    pub fn options(&self) -> &PublishOptions {
        &self.shared.options
    }

    /// Upload `composite`, sign it, and start the countdown.
    ///
    /// Only acts from `Idle`; any other state returns [`PublishOutcome::Ignored`]. On failure the
    /// provisional object is deleted, the record returns to `Idle`, and the call may be retried.
    #[tracing::instrument(skip_all, fields(bytes = composite.encoded.len()))]
    pub async fn publish(&self, composite: &Composite) -> StripResult<PublishOutcome> {
        let shared = &self.shared;
        let started = shared.update(|inner| {
            if inner.record.state != PublicationState::Idle {
                return false;
            }
            inner.record.state = PublicationState::Uploading;
            inner.record.last_warning = None;
            inner.leave_requested = false;
            true
        });
        if !started {
            tracing::debug!("publish ignored, publication already active");
            return Ok(PublishOutcome::Ignored);
        }

        let key = shared.make_key(composite.format);
        tracing::debug!(%key, "uploading");
        let attempt = Attempt {
            shared: Arc::clone(shared),
            key: key.clone(),
            settled: false,
        };
        let outcome = match self.upload_and_sign(&key, &composite.encoded).await {
            Ok(signed_url) => Ok(self.go_live(key, signed_url).await),
            Err(err) => {
                let left = shared.update(|inner| {
                    inner.record.remote_key = None;
                    inner.record.state = PublicationState::Failed;
                    inner.leave_requested
                });
                tracing::warn!(error = %err, "publish failed");
                shared.delete_best_effort(&key).await;
                shared.update(|inner| {
                    inner.record.state = if left {
                        PublicationState::Deleted
                    } else {
                        PublicationState::Idle
                    };
                });
                Err(err)
            }
        };
        attempt.settle();
        outcome
    }

    async fn upload_and_sign(&self, key: &str, bytes: &[u8]) -> StripResult<String> {
        let shared = &self.shared;
        shared
            .store
            .put(key, bytes)
            .await
            .map_err(|e| StripError::upload(format!("'{key}': {e}")))?;
        shared.update(|inner| inner.record.remote_key = Some(key.to_string()));
        shared
            .store
            .sign(key, shared.options.ttl_secs)
            .await
            .map_err(|e| StripError::sign(format!("'{key}': {e}")))
    }

    async fn go_live(&self, key: String, signed_url: String) -> PublishOutcome {
        let shared = &self.shared;
        let ttl = shared.options.ttl_secs;
        let expires_at = shared.clock.now() + chrono::Duration::seconds(ttl as i64);

        let withdrawn = shared.with_inner(|inner| {
            if inner.leave_requested {
                inner.record.remote_key = None;
                inner.record.state = PublicationState::Deleted;
                return true;
            }
            inner.record.state = PublicationState::Published {
                signed_url: signed_url.clone(),
                expires_at,
            };
            inner.record.remaining_secs = ttl;
            inner.countdown = Some(start_countdown(
                Arc::downgrade(shared),
                Duration::from_secs(ttl),
                Duration::from_millis(shared.options.tick_ms),
            ));
            false
        });

        if withdrawn {
            tracing::debug!(%key, "left during upload, withdrawing");
            shared.delete_best_effort(&key).await;
            shared.broadcast();
            return PublishOutcome::Withdrawn;
        }
        shared.broadcast();
        tracing::info!(%key, %expires_at, "published");
        PublishOutcome::Published { signed_url }
    }

    /// Countdown reached zero: delete the object and end in `Deleted`. Idempotent.
    pub async fn on_expiry(&self) {
        self.shared.expire("expired").await;
    }

    /// The user navigated away. Never fails.
    ///
    /// While published this cancels the countdown and deletes like [`Self::on_expiry`]; during an
    /// upload the in-flight `publish` deletes its object once it settles.
    pub async fn leave(&self) {
        let uploading = self.shared.update(|inner| {
            if inner.record.state == PublicationState::Uploading {
                inner.leave_requested = true;
                true
            } else {
                false
            }
        });
        if !uploading {
            self.shared.expire("left").await;
        }
    }
}

fn start_countdown(weak: Weak<Shared>, total: Duration, tick: Duration) -> CountdownHandle {
    let on_tick = {
        let weak = weak.clone();
        move |remaining: Duration| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let secs = remaining.as_millis().div_ceil(1000) as u64;
            shared.update(|inner| {
                if inner.record.is_published() {
                    inner.record.remaining_secs = secs;
                }
            });
            tracing::debug!(remaining_secs = secs, "countdown tick");
        }
    };
    let on_done = move || {
        if let Some(shared) = weak.upgrade() {
            // The countdown task is aborted when its handle is dropped during expiry.
            tokio::spawn(async move { shared.expire("expired").await });
        }
    };
    schedule_countdown(total, tick, on_tick, on_done)
}

impl Drop for PublicationManager {
    fn drop(&mut self) {
        let (key, countdown) = self.shared.update(|inner| {
            let key = inner.record.remote_key.take();
            if key.is_some() {
                inner.record.state = PublicationState::Deleted;
                inner.record.remaining_secs = 0;
            }
            (key, inner.countdown.take())
        });
        drop(countdown);
        let Some(key) = key else {
            return;
        };
        spawn_detached_delete(Arc::clone(&self.shared.store), key);
    }
}

/// An in-flight `publish` attempt. If the attempt is dropped before it settles, the record is
/// released and the provisional object is deleted in the background.
struct Attempt {
    shared: Arc<Shared>,
    key: String,
    settled: bool,
}

impl Attempt {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for Attempt {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let orphaned = self.shared.update(|inner| match inner.record.state {
            PublicationState::Uploading | PublicationState::Failed => {
                inner.record.remote_key = None;
                inner.record.remaining_secs = 0;
                inner.record.state = if inner.leave_requested {
                    PublicationState::Deleted
                } else {
                    PublicationState::Idle
                };
                true
            }
            // Withdrawn, with the delete still pending.
            PublicationState::Deleted => true,
            _ => false,
        });
        if orphaned {
            tracing::debug!(key = %self.key, "publish cancelled before settling");
            spawn_detached_delete(Arc::clone(&self.shared.store), std::mem::take(&mut self.key));
        }
    }
}

fn spawn_detached_delete(store: Arc<dyn ObjectStore>, key: String) {
    match tokio::runtime::Handle::try_current() {
        Ok(rt) => {
            rt.spawn(async move {
                if let Err(e) = store.delete(&key).await {
                    tracing::warn!(%key, error = %e, "detached delete failed");
                }
            });
        }
        Err(_) => {
            tracing::warn!(%key, "no runtime to delete remote object, left to store expiry");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/publish/manager.rs"]
mod tests;
