//! Polling a submitted job until it reaches a terminal state.

use crate::consts::polling::{DEFAULT_RETRY_INTERVAL_SECS, MIN_POLL_INTERVAL};
use crate::job::{Job, JobState, JobStatus};
use crate::service::{PdfServicesApi, PdfServicesError, Result};
use log::{debug, info, warn};
use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay used when a status carries no retry hint.
    pub default_retry_interval: Duration,
    /// Overall limit for one job, measured from the first poll.
    pub timeout: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        PollOptions {
            default_retry_interval: Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS),
            timeout: None,
        }
    }
}

/// Runs `fut` unless a shutdown signal arrives first, which yields
/// [`PdfServicesError::Cancelled`]. A closed channel is dropped from `shutdown`
/// and `fut` runs to completion.
pub(crate) async fn until_shutdown<T, F>(fut: F, shutdown: &mut Option<broadcast::Receiver<()>>) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::pin!(fut);

    if let Some(rx) = shutdown.as_mut() {
        tokio::select! {
            biased;
            signal = rx.recv() => match signal {
                Err(broadcast::error::RecvError::Closed) => {}
                _ => return Err(PdfServicesError::Cancelled),
            },
            result = &mut fut => return result,
        }
        // Every sender is gone, so nothing can cancel this job any more.
        *shutdown = None;
    }
    fut.await
}

/// Polls `job` until it succeeds or fails.
///
/// Consecutive polls are at least as far apart as the server asked and never
/// closer than one second. Both the status requests and the waits between them
/// race against `shutdown`: a signal yields [`PdfServicesError::Cancelled`], a
/// closed channel means no cancellation. The remote job is left running in both
/// the cancelled and the timed-out case.
pub async fn poll_until_done<S>(
    service: &S,
    mut job: Job,
    options: &PollOptions,
    shutdown: &mut Option<broadcast::Receiver<()>>,
) -> Result<Job>
where
    S: PdfServicesApi + ?Sized,
{
    let deadline = options.timeout.map(|t| (Instant::now() + t, t));

    loop {
        let request = service.job_status(job.handle());
        let status = match deadline {
            Some((at, limit)) => {
                let bounded = async {
                    tokio::time::timeout_at(at, request)
                        .await
                        .map_err(|_| PdfServicesError::TimedOut(limit))?
                };
                until_shutdown(bounded, shutdown).await?
            }
            None => until_shutdown(request, shutdown).await?,
        };
        let delay = match &status {
            JobStatus::InProgress { retry_after } => Some((*retry_after).max(MIN_POLL_INTERVAL)),
            _ => None,
        };

        match job.observe(status)? {
            JobState::Succeeded => {
                info!("Job {} succeeded after {} poll(s)", job.handle(), job.polls());
                return Ok(job);
            }
            JobState::Failed => {
                warn!("Job {} failed after {} poll(s)", job.handle(), job.polls());
                return Ok(job);
            }
            JobState::Submitted | JobState::InProgress => {}
        }

        let mut delay = delay.unwrap_or(MIN_POLL_INTERVAL);
        let mut timed_out = false;
        if let Some((at, _)) = deadline {
            let remaining = at.saturating_duration_since(Instant::now());
            if remaining <= delay {
                delay = remaining;
                timed_out = true;
            }
        }

        debug!("Job {} in progress, next poll in {:?}", job.handle(), delay);
        let pause = async {
            tokio::time::sleep(delay).await;
            Ok(())
        };
        if let Err(e) = until_shutdown(pause, shutdown).await {
            info!("Stopped polling job {}", job.handle());
            return Err(e);
        }
        if let (true, Some((_, limit))) = (timed_out, deadline) {
            warn!("Job {} still running after {:?}", job.handle(), limit);
            return Err(PdfServicesError::TimedOut(limit));
        }
    }
}
