//! Job runner
//!
//! Drives whole job lifecycles on top of a [`PdfServicesApi`]: submit, poll
//! to a terminal state, resolve the result, fetch the outputs. Lifecycles are
//! independent, so a batch runs them side by side under a permit limit.
//!
//! Every suspension point of a lifecycle races against the shutdown signal,
//! including the wait for a batch permit.

use crate::asset::StreamAsset;
use crate::consts::batch::DEFAULT_MAX_CONCURRENT;
use crate::job::{Job, JobHandle, JobRequest, JobResult};
use crate::manifest::JobManifest;
use crate::output::save_outputs;
use crate::polling::{poll_until_done, until_shutdown, PollOptions};
use crate::service::{PdfServicesApi, PdfServicesError, Result};
use futures::future::{join_all, try_join_all};
use log::{info, warn};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, Semaphore};

type Shutdown = Option<broadcast::Receiver<()>>;

/// Outcome of one named job in a batch.
#[derive(Debug)]
pub struct JobOutcome<T = JobResult> {
    pub name: String,
    pub result: Result<T>,
}

pub struct JobRunner<S: PdfServicesApi + ?Sized> {
    service: Arc<S>,
    options: PollOptions,
    shutdown: Option<broadcast::Sender<()>>,
}

impl<S: PdfServicesApi + ?Sized> JobRunner<S> {
    pub fn new(service: Arc<S>, options: PollOptions) -> Self {
        JobRunner {
            service,
            options,
            shutdown: None,
        }
    }

    /// Running lifecycles stop with `Cancelled` once `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: broadcast::Sender<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    fn shutdown_receiver(&self) -> Shutdown {
        self.shutdown.as_ref().map(|tx| tx.subscribe())
    }

    /// Submits one job and waits for its result.
    pub async fn execute(&self, request: &JobRequest) -> Result<JobResult> {
        let mut shutdown = self.shutdown_receiver();
        self.execute_until(request, &mut shutdown).await
    }

    async fn execute_until(&self, request: &JobRequest, shutdown: &mut Shutdown) -> Result<JobResult> {
        request.validate()?;
        let handle = until_shutdown(self.service.submit(request), shutdown).await?;
        info!("Submitted {} job: {}", request.kind(), handle);

        let job = Job::for_request(handle, request);
        let job = poll_until_done(&*self.service, job, &self.options, shutdown).await?;
        job.into_result()
    }

    /// Waits for an already submitted job and resolves its result.
    pub async fn get_job_result(&self, handle: JobHandle) -> Result<JobResult> {
        let mut shutdown = self.shutdown_receiver();
        let job = poll_until_done(&*self.service, Job::new(handle), &self.options, &mut shutdown).await?;
        job.into_result()
    }

    /// Downloads every output asset of `result`, named by role.
    pub async fn fetch_outputs(&self, result: &JobResult) -> Result<Vec<(String, StreamAsset)>> {
        let downloads = result.outputs().into_iter().map(|(name, asset)| async move {
            let content = self.service.download(asset).await?;
            Ok::<_, PdfServicesError>((name, content))
        });
        try_join_all(downloads).await
    }

    /// Runs a manifest end to end: uploads its local inputs, executes the
    /// job and saves the outputs under `out_dir`. Returns the written paths.
    pub async fn run_manifest(&self, manifest: &JobManifest, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut shutdown = self.shutdown_receiver();
        self.run_manifest_until(manifest, out_dir, &mut shutdown).await
    }

    async fn run_manifest_until(
        &self,
        manifest: &JobManifest,
        out_dir: &Path,
        shutdown: &mut Shutdown,
    ) -> Result<Vec<PathBuf>> {
        let request = until_shutdown(manifest.into_request(&*self.service), shutdown).await?;
        let result = self.execute_until(&request, shutdown).await?;
        let outputs = until_shutdown(self.fetch_outputs(&result), shutdown).await?;

        let written = save_outputs(out_dir, &manifest.name, &outputs, &result).await?;
        if written.is_empty() {
            info!("Job {} finished; output written to external storage", manifest.name);
        }
        for path in &written {
            info!("Job {} saved {}", manifest.name, path.display());
        }
        Ok(written)
    }

    /// Runs named jobs with at most `max_concurrent` in flight. Outcomes come
    /// back in input order; one job failing does not stop the others.
    pub async fn run_batch(&self, requests: Vec<(String, JobRequest)>, max_concurrent: usize) -> Vec<JobOutcome> {
        self.run_limited(requests, max_concurrent, |request, mut shutdown| async move {
            self.execute_until(&request, &mut shutdown).await
        })
        .await
    }

    /// Like [`run_batch`](Self::run_batch), but each job also uploads its
    /// inputs and saves its outputs inside its own permit, so outputs are
    /// fetched as soon as that job finishes.
    pub async fn run_manifests(
        &self,
        manifests: Vec<JobManifest>,
        max_concurrent: usize,
        out_dir: &Path,
    ) -> Vec<JobOutcome<Vec<PathBuf>>> {
        let named: Vec<(String, JobManifest)> = manifests.into_iter().map(|m| (m.name.clone(), m)).collect();
        self.run_limited(named, max_concurrent, |manifest, mut shutdown| async move {
            self.run_manifest_until(&manifest, out_dir, &mut shutdown).await
        })
        .await
    }

    async fn run_limited<T, R, F, Fut>(&self, jobs: Vec<(String, T)>, max_concurrent: usize, run: F) -> Vec<JobOutcome<R>>
    where
        F: Fn(T, Shutdown) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let max_concurrent = if max_concurrent == 0 { DEFAULT_MAX_CONCURRENT } else { max_concurrent };
        let semaphore = Semaphore::new(max_concurrent);
        info!("Running {} job(s), up to {} at a time", jobs.len(), max_concurrent);

        let jobs = jobs.into_iter().map(|(name, job)| {
            let semaphore = &semaphore;
            let run = &run;
            // Subscribe now so queued jobs see a signal sent before they start.
            let mut shutdown = self.shutdown_receiver();
            async move {
                let permit = async {
                    semaphore
                        .acquire()
                        .await
                        .map_err(|_| PdfServicesError::IllegalState("batch permits closed".to_string()))
                };
                let result = match until_shutdown(permit, &mut shutdown).await {
                    Ok(_permit) => run(job, shutdown).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = &result {
                    warn!("Job {} failed: {}", name, e);
                }
                JobOutcome { name, result }
            }
        });
        join_all(jobs).await
    }
}
