//! Client and job runner for asynchronous cloud PDF processing.
//!
//! Inputs are uploaded as assets, an operation is submitted as a job, the job
//! is polled until it succeeds or fails, and the output assets are fetched.

pub mod asset;
pub mod config;
pub mod consts;
pub mod environment;
pub mod job;
pub mod logging;
pub mod manifest;
pub mod operation;
pub mod output;
pub mod page_ranges;
pub mod polling;
pub mod runner;
pub mod service;

pub use asset::{Asset, AssetRef, ExternalAsset, ExternalStorageType, StreamAsset};
pub use job::{Job, JobHandle, JobRequest, JobResult, JobState, JobStatus};
pub use operation::{Operation, OperationKind};
pub use page_ranges::PageRanges;
pub use polling::{poll_until_done, PollOptions};
pub use runner::{JobOutcome, JobRunner};
pub use service::{PdfServicesApi, PdfServicesClient, PdfServicesError, Result, ServiceError, TransferError};
