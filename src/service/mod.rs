//! PDF Services API
//!
//! The four remote calls of a job lifecycle, behind a trait so polling and
//! batching can run against any backend.

pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod scripted;

pub use client::PdfServicesClient;
pub use error::{PdfServicesError, Result, ServiceError, TransferError};

use crate::asset::{media_type_for_path, Asset, StreamAsset};
use crate::job::{JobHandle, JobRequest, JobStatus};
use futures::future::try_join_all;
use std::path::{Path, PathBuf};

#[async_trait::async_trait]
pub trait PdfServicesApi: Send + Sync {
    /// Stores `content` in service storage and returns its asset.
    async fn upload(&self, content: Vec<u8>, media_type: &str) -> Result<Asset>;

    /// Validates and submits a job. Nothing is sent when validation fails.
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle>;

    /// Fetches the current status of a submitted job once.
    async fn job_status(&self, handle: &JobHandle) -> Result<JobStatus>;

    /// Fetches the bytes of an asset.
    async fn download(&self, asset: &Asset) -> Result<StreamAsset>;

    /// Reads a local file and uploads it. The media type is guessed from the
    /// extension unless given.
    async fn upload_file(&self, path: &Path, media_type: Option<&str>) -> Result<Asset> {
        let media_type = match media_type.or_else(|| media_type_for_path(path)) {
            Some(m) => m.to_string(),
            None => {
                return Err(PdfServicesError::Validation(format!(
                    "cannot infer the media type of {}",
                    path.display()
                )))
            }
        };
        let content = tokio::fs::read(path).await?;
        self.upload(content, &media_type).await
    }

    /// Uploads files concurrently. Assets come back in input order.
    async fn upload_all(&self, paths: &[PathBuf]) -> Result<Vec<Asset>> {
        try_join_all(paths.iter().map(|path| self.upload_file(path, None))).await
    }
}
