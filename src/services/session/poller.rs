//! Job Poller: one interval task that lives exactly as long as the job map
//! is non-empty.
//!
//! Per job: `processing -> completed` or `processing -> error`, both terminal.
//! Fetch failures leave the job as it was; the next tick retries.

use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::future::join_all;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::plugins::session::{Job, JobStatus, Message, SessionState};
use crate::services::api::{ApiError, JobStatusReply};
use crate::services::notices;

use super::manager::Shared;

pub(super) fn spawn(runtime: &Handle, shared: Weak<Shared>, period: Duration) -> JoinHandle<()> {
    runtime.spawn(async move {
        // First tick one period after arming, like a browser interval.
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(shared) = shared.upgrade() else {
                break;
            };
            if !shared.poll_jobs_once().await {
                break;
            }
        }
    })
}

impl Shared {
    pub(super) async fn poll_jobs_once(self: &Arc<Self>) -> bool {
        let job_ids = self.lock().state.job_ids();
        if job_ids.is_empty() {
            return false;
        }

        let api = self.api.clone();
        let results = join_all(job_ids.into_iter().map(|job_id| {
            let api = api.clone();
            async move {
                let result = api.job_status(&job_id).await;
                (job_id, result)
            }
        }))
        .await;

        self.update(|inner| {
            for (job_id, result) in results {
                apply_job_status(&mut inner.state, &job_id, result);
            }
        });
        true
    }
}

/// Fold one status fetch into the state.
pub(super) fn apply_job_status(
    state: &mut SessionState,
    job_id: &str,
    result: Result<JobStatusReply, ApiError>,
) {
    let reply = match result {
        Ok(reply) => reply,
        Err(err) => {
            log::warn!("Job status fetch failed for {}: {}", job_id, err);
            return;
        }
    };

    // Retired while the request was in flight.
    if !state.jobs().contains_key(job_id) {
        log::debug!("Dropping status for untracked job {}", job_id);
        return;
    }

    let job = Job::from(reply);
    match job.status {
        JobStatus::Processing => state.merge_job_status(job_id, job),
        JobStatus::Completed => {
            let content = job
                .response
                .clone()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| notices::DASHBOARD_READY.to_string());
            let links = job.links.clone();
            state.merge_job_status(job_id, job);
            if state.has_completed_message(&content) {
                log::debug!("Job {} completed with an already logged response", job_id);
            } else {
                state.append_message(Message::completed(content, links));
            }
            state.retire_job(job_id);
            log::info!("Dashboard job {} completed", job_id);
        }
        JobStatus::Error => {
            let content = job
                .response
                .clone()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| notices::job_error(job.error.as_deref()));
            state.append_message(Message::error(content));
            state.retire_job(job_id);
            log::warn!(
                "Dashboard job {} failed: {}",
                job_id,
                job.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
