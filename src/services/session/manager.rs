use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::plugins::session::{Conversation, Job, Message, SessionState, UploadedFile};
use crate::services::api::{ApiError, DashboardApi, HttpDashboardApi};
use crate::services::config::ClientConfig;

use super::poller;

/// Read-only view of the session, published after every transition.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub conversation_id: Option<String>,
    pub messages: Vec<Message>,
    pub files: Vec<UploadedFile>,
    pub jobs: BTreeMap<String, Job>,
    pub conversations: Vec<Conversation>,
    pub is_sending: bool,
    pub is_loading_conversation: bool,
    pub is_uploading: bool,
    /// True exactly while `jobs` is non-empty.
    pub polling: bool,
}

#[derive(Default)]
pub(super) struct Inner {
    pub(super) state: SessionState,
    pub(super) sending: bool,
    pub(super) loading_conversation: bool,
    pub(super) uploads_in_flight: usize,
    pub(super) poll_task: Option<JoinHandle<()>>,
}

impl Inner {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            conversation_id: self.state.conversation_id().map(str::to_string),
            messages: self.state.messages().to_vec(),
            files: self.state.files().to_vec(),
            jobs: self
                .state
                .jobs()
                .iter()
                .map(|(id, job)| (id.clone(), job.clone()))
                .collect(),
            conversations: self.state.conversations().to_vec(),
            is_sending: self.sending,
            is_loading_conversation: self.loading_conversation,
            is_uploading: self.uploads_in_flight > 0,
            polling: self.poll_task.is_some(),
        }
    }
}

pub(super) struct Shared {
    pub(super) api: Arc<dyn DashboardApi>,
    pub(super) poll_interval: Duration,
    // NOTE: std::sync::Mutex; never held across .await.
    inner: Mutex<Inner>,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl Shared {
    pub(super) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply one transition, then re-derive the poll task from the job map and
    /// publish a snapshot, all under the same lock.
    pub(super) fn update<R>(self: &Arc<Self>, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.lock();
        let out = f(&mut inner);
        self.reconcile_poller(&mut inner);
        self.snapshot.send_replace(inner.snapshot());
        out
    }

    fn reconcile_poller(self: &Arc<Self>, inner: &mut Inner) {
        if inner.state.jobs().is_empty() {
            if let Some(handle) = inner.poll_task.take() {
                handle.abort();
                log::debug!("Job poller stopped");
            }
            return;
        }

        let running = inner
            .poll_task
            .as_ref()
            .is_some_and(|handle| !handle.is_finished());
        if running {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                inner.poll_task = Some(poller::spawn(
                    &runtime,
                    Arc::downgrade(self),
                    self.poll_interval,
                ));
                log::debug!(
                    "Job poller started for {} job(s) every {:?}",
                    inner.state.jobs().len(),
                    self.poll_interval
                );
            }
            Err(_) => log::warn!("No async runtime available; job poller not started"),
        }
    }

    fn stop_poller(&self) {
        let handle = self.lock().poll_task.take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    fn publish(&self) {
        let inner = self.lock();
        self.snapshot.send_replace(inner.snapshot());
    }
}

/// Clears an in-flight flag on drop, including when the owning future is
/// cancelled mid-request.
pub(super) struct InFlight {
    shared: Arc<Shared>,
    release: fn(&mut Inner),
}

impl InFlight {
    pub(super) fn new(shared: &Arc<Shared>, release: fn(&mut Inner)) -> Self {
        Self {
            shared: shared.clone(),
            release,
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.shared.update(self.release);
    }
}

/// Owns the session state and mediates every call to the backend.
///
/// Gateways never return errors: failures are logged and folded into the
/// message log. Dropping the manager stops the job poller; requests already
/// in flight are not cancelled.
pub struct SessionManager {
    pub(super) shared: Arc<Shared>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn DashboardApi>, poll_interval: Duration) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                api,
                poll_interval,
                inner: Mutex::new(Inner::default()),
                snapshot,
            }),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let api = HttpDashboardApi::new(config)?;
        Ok(Self::new(Arc::new(api), config.poll_interval))
    }

    pub fn api(&self) -> &Arc<dyn DashboardApi> {
        &self.shared.api
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.lock().snapshot()
    }

    pub fn is_polling(&self) -> bool {
        self.shared.lock().poll_task.is_some()
    }

    /// Clear conversation id, log, staged files and jobs.
    pub fn start_new_conversation(&self) {
        self.shared.update(|inner| inner.state.start_new_conversation());
    }

    /// Stop the job poller without touching the job map.
    pub fn shutdown(&self) {
        self.shared.stop_poller();
        self.shared.publish();
    }

    /// Run one poll tick immediately. Returns false when no job is tracked.
    pub async fn poll_jobs_once(&self) -> bool {
        self.shared.poll_jobs_once().await
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.shared.stop_poller();
    }
}
