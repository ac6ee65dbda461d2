//! In-memory service with scripted job statuses, for polling and runner tests.

use crate::asset::{Asset, AssetRef, StreamAsset};
use crate::job::{JobHandle, JobRequest, JobStatus};
use crate::service::{PdfServicesApi, PdfServicesError, Result, ServiceError, TransferError};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Jobs are keyed by the id (or uri) of their first input, and the handle
/// location is that key.
#[derive(Default)]
pub(crate) struct ScriptedService {
    scripts: Mutex<HashMap<String, VecDeque<JobStatus>>>,
    rejections: Mutex<HashMap<String, ServiceError>>,
    stalls: Mutex<HashMap<String, Duration>>,
    polls: Mutex<Vec<(String, Instant)>>,
    submitted: Mutex<Vec<JobRequest>>,
    blobs: Mutex<HashMap<String, StreamAsset>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

pub(crate) fn job_key(request: &JobRequest) -> String {
    match request.operation().inputs().first() {
        Some(AssetRef::Cloud(asset)) => asset.asset_id.clone(),
        Some(AssetRef::External(external)) => external.uri.clone(),
        None => String::new(),
    }
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, key: &str, statuses: Vec<JobStatus>) {
        self.scripts.lock().unwrap().insert(key.to_string(), statuses.into());
    }

    pub fn reject(&self, key: &str, error: ServiceError) {
        self.rejections.lock().unwrap().insert(key.to_string(), error);
    }

    /// Delays every submit and status request for `key` by `delay`.
    pub fn stall(&self, key: &str, delay: Duration) {
        self.stalls.lock().unwrap().insert(key.to_string(), delay);
    }

    async fn wait_for(&self, key: &str) {
        let delay = self.stalls.lock().unwrap().get(key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn poll_times(&self, key: &str) -> Vec<Instant> {
        self.polls
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, t)| *t)
            .collect()
    }

    pub fn submissions(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PdfServicesApi for ScriptedService {
    async fn upload(&self, content: Vec<u8>, media_type: &str) -> Result<Asset> {
        let mut blobs = self.blobs.lock().unwrap();
        let mut asset = Asset::new(format!("blob-{}", blobs.len()));
        asset.media_type = Some(media_type.to_string());
        asset.size = Some(content.len() as u64);
        blobs.insert(
            asset.asset_id.clone(),
            StreamAsset { content, media_type: media_type.to_string() },
        );
        Ok(asset)
    }

    async fn submit(&self, request: &JobRequest) -> Result<JobHandle> {
        request.validate()?;
        let key = job_key(request);
        self.wait_for(&key).await;
        if let Some(error) = self.rejections.lock().unwrap().get(&key) {
            return Err(PdfServicesError::from_service(error.clone()));
        }
        self.submitted.lock().unwrap().push(request.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Ok(JobHandle::new(key))
    }

    async fn job_status(&self, handle: &JobHandle) -> Result<JobStatus> {
        self.polls.lock().unwrap().push((handle.location.clone(), Instant::now()));
        self.wait_for(&handle.location).await;
        let status = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&handle.location)
            .and_then(|script| script.pop_front())
            .ok_or_else(|| {
                PdfServicesError::IllegalState(format!("no scripted status for {}", handle.location))
            })?;
        if status.is_terminal() {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(status)
    }

    async fn download(&self, asset: &Asset) -> Result<StreamAsset> {
        self.blobs
            .lock()
            .unwrap()
            .get(&asset.asset_id)
            .cloned()
            .ok_or_else(|| {
                TransferError::UnexpectedStatus { status: 404, url: asset.asset_id.clone() }.into()
            })
    }
}
