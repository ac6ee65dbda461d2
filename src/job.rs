//! Jobs
//!
//! A job is one asynchronous invocation of a remote operation. It is submitted
//! once, yields a [`JobHandle`], and is then polled until it reaches exactly
//! one terminal state.

use crate::asset::{Asset, ExternalAsset};
use crate::operation::{Operation, OperationKind};
use crate::service::error::{PdfServicesError, Result, ServiceError, TransferError};
use serde::Deserialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// One operation invocation, ready to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    operation: Operation,
    /// External-storage target. When set, the service writes the output there
    /// and the job result carries no asset.
    output: Option<ExternalAsset>,
}

impl JobRequest {
    pub fn new(operation: Operation) -> Self {
        JobRequest {
            operation,
            output: None,
        }
    }

    pub fn with_output(mut self, output: ExternalAsset) -> Self {
        self.output = Some(output);
        self
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn kind(&self) -> OperationKind {
        self.operation.kind()
    }

    pub fn output(&self) -> Option<&ExternalAsset> {
        self.output.as_ref()
    }

    pub fn validate(&self) -> Result<()> {
        self.operation.validate()?;
        if let Some(output) = &self.output {
            if !self.kind().supports_external_storage() {
                return Err(PdfServicesError::Validation(format!(
                    "{} does not support external storage output",
                    self.kind()
                )));
            }
            if output.uri.is_empty() {
                return Err(PdfServicesError::Validation(
                    "external output uri is empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn request_body(&self) -> Value {
        let mut body = self.operation.request_body();
        if let (Some(output), Value::Object(fields)) = (&self.output, &mut body) {
            fields.insert("output".to_string(), serde_json::json!(output));
        }
        body
    }
}

/// Server-issued status location of a submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub location: String,
    pub request_id: Option<String>,
}

impl JobHandle {
    pub fn new(location: impl Into<String>) -> Self {
        JobHandle {
            location: location.into(),
            request_id: None,
        }
    }
}

impl Display for JobHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.location)
    }
}

/// Output assets of a succeeded job. Which fields are set depends on the
/// operation: most produce `asset`, split and image export produce `assets`,
/// autotag produces a tagged PDF plus an optional report, extract produces
/// content plus a resource archive, properties produce only `metadata`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobResult {
    #[serde(default)]
    asset: Option<Asset>,
    #[serde(default)]
    assets: Vec<Asset>,
    #[serde(default, rename = "tagged-pdf")]
    tagged_pdf: Option<Asset>,
    #[serde(default)]
    report: Option<Asset>,
    #[serde(default)]
    content: Option<Asset>,
    #[serde(default)]
    resource: Option<Asset>,
    #[serde(default)]
    metadata: Option<Value>,
}

impl JobResult {
    /// Result with a single primary output asset.
    pub fn with_asset(asset: Asset) -> Self {
        JobResult {
            asset: Some(asset),
            ..Default::default()
        }
    }

    /// The primary output.
    pub fn asset(&self) -> Option<&Asset> {
        self.asset
            .as_ref()
            .or(self.tagged_pdf.as_ref())
            .or(self.content.as_ref())
            .or(self.assets.first())
    }

    /// List outputs (split parts, page images).
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn report(&self) -> Option<&Asset> {
        self.report.as_ref()
    }

    pub fn resource(&self) -> Option<&Asset> {
        self.resource.as_ref()
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    /// Every output asset with a role name, in a stable order.
    pub fn outputs(&self) -> Vec<(String, &Asset)> {
        let mut outputs = Vec::new();
        let named = [
            ("output", &self.asset),
            ("tagged", &self.tagged_pdf),
            ("content", &self.content),
            ("report", &self.report),
            ("resource", &self.resource),
        ];
        for (name, asset) in named {
            if let Some(asset) = asset {
                outputs.push((name.to_string(), asset));
            }
        }
        for (i, asset) in self.assets.iter().enumerate() {
            outputs.push((format!("part-{}", i), asset));
        }
        outputs
    }

    pub fn is_empty(&self) -> bool {
        self.outputs().is_empty() && self.metadata.is_none()
    }
}

/// Status reported by one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    /// Not finished; poll again after `retry_after`.
    InProgress { retry_after: Duration },
    Succeeded(JobResult),
    Failed(ServiceError),
}

#[derive(Deserialize)]
struct RawStatus {
    status: String,
    #[serde(rename = "retryInterval")]
    retry_interval: Option<u64>,
    error: Option<Value>,
}

impl JobStatus {
    /// Parses a status body. The retry delay comes from the body's
    /// `retryInterval`, then the `retry-after` header, then `default_retry`.
    pub(crate) fn parse(
        body: Value,
        header_retry_after: Option<u32>,
        http_status: u16,
        default_retry: Duration,
    ) -> Result<JobStatus> {
        let raw: RawStatus = serde_json::from_value(body.clone())?;
        let status = raw.status.trim().to_ascii_lowercase().replace('_', " ");

        match status.as_str() {
            "in progress" => {
                let retry_after = raw
                    .retry_interval
                    .or(header_retry_after.map(u64::from))
                    .map(Duration::from_secs)
                    .unwrap_or(default_retry);
                Ok(JobStatus::InProgress { retry_after })
            }
            "done" => Ok(JobStatus::Succeeded(serde_json::from_value(body)?)),
            "failed" => Ok(JobStatus::Failed(ServiceError::from_job_failure(
                raw.error.as_ref(),
                http_status,
            ))),
            other => Err(TransferError::InvalidResponse(format!("unknown job status `{}`", other)).into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::InProgress { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Submitted,
    InProgress,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

impl Display for JobState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Submitted => write!(f, "submitted"),
            JobState::InProgress => write!(f, "in progress"),
            JobState::Succeeded => write!(f, "succeeded"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

/// Local view of one submitted job: `Submitted -> InProgress -> {Succeeded, Failed}`.
#[derive(Debug, Clone)]
pub struct Job {
    handle: JobHandle,
    state: JobState,
    /// Set when the output goes to external storage, where success carries no asset.
    external_output: bool,
    result: Option<JobResult>,
    failure: Option<ServiceError>,
    polls: u32,
}

impl Job {
    pub fn new(handle: JobHandle) -> Self {
        Job {
            handle,
            state: JobState::Submitted,
            external_output: false,
            result: None,
            failure: None,
            polls: 0,
        }
    }

    pub fn for_request(handle: JobHandle, request: &JobRequest) -> Self {
        Job {
            external_output: request.output().is_some(),
            ..Job::new(handle)
        }
    }

    pub fn handle(&self) -> &JobHandle {
        &self.handle
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Number of statuses observed so far.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Applies one polled status. A terminal job accepts no further status.
    pub fn observe(&mut self, status: JobStatus) -> Result<JobState> {
        if self.is_terminal() {
            return Err(PdfServicesError::IllegalState(format!(
                "job {} is already {}",
                self.handle, self.state
            )));
        }
        self.polls += 1;
        self.state = match status {
            JobStatus::InProgress { .. } => JobState::InProgress,
            JobStatus::Succeeded(result) => {
                self.result = Some(result);
                JobState::Succeeded
            }
            JobStatus::Failed(error) => {
                self.failure = Some(error);
                JobState::Failed
            }
        };
        Ok(self.state)
    }

    /// The result of a succeeded job. Before a terminal state this is a
    /// contract violation; after a failure it is the service's error.
    pub fn result(&self) -> Result<&JobResult> {
        match self.state {
            JobState::Submitted | JobState::InProgress => Err(PdfServicesError::IllegalState(format!(
                "job {} is {}; wait for a terminal state before reading the result",
                self.handle, self.state
            ))),
            JobState::Failed => Err(PdfServicesError::from_service(
                self.failure.clone().unwrap_or_else(|| ServiceError::from_job_failure(None, 0)),
            )),
            JobState::Succeeded => {
                let result = self.result.as_ref().ok_or_else(|| {
                    PdfServicesError::IllegalState(format!("job {} has no recorded result", self.handle))
                })?;
                if result.is_empty() && !self.external_output {
                    return Err(TransferError::InvalidResponse(format!(
                        "job {} succeeded without output assets",
                        self.handle
                    ))
                    .into());
                }
                Ok(result)
            }
        }
    }

    pub fn into_result(self) -> Result<JobResult> {
        self.result()?;
        Ok(self.result.unwrap_or_default())
    }
}
