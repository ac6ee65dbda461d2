//! Error handling for the PDF Services client

use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Error body as sent by the service. Rejected requests nest it under `error`,
/// some gateway errors put the fields at the top level.
#[derive(Deserialize, Default)]
struct RawError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<u16>,
}

impl RawError {
    fn parse(body: &str) -> Option<RawError> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        let inner = value
            .get("error")
            .filter(|e| e.is_object())
            .unwrap_or(&value);
        serde_json::from_value(inner.clone()).ok()
    }
}

/// A rejection reported by the remote service, either for a request or for a job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code} (HTTP {status}): {message}")]
pub struct ServiceError {
    /// Machine-readable error code, e.g. `BAD_PDF` or `INSUFFICIENT_QUOTA`.
    pub code: String,
    pub message: String,
    /// HTTP status of the response, or the status embedded in a failed job payload.
    pub status: u16,
    pub request_id: Option<String>,
    /// Seconds the server asked us to wait, when it sent a `retry-after` header.
    pub retry_after: Option<u32>,
}

impl ServiceError {
    /// Builds a service error from a raw HTTP rejection.
    pub(crate) fn from_http(status: u16, headers: &HeaderMap, body: &str) -> Self {
        let raw = RawError::parse(body).unwrap_or_default();
        let code = if raw.code.is_empty() {
            format!("HTTP_{}", status)
        } else {
            raw.code
        };
        let message = if raw.message.is_empty() {
            body.trim().to_string()
        } else {
            raw.message
        };

        ServiceError {
            code,
            message,
            status,
            request_id: header_str(headers, "x-request-id"),
            retry_after: parse_retry_after(headers),
        }
    }

    /// Builds a service error from the `error` object of a failed job status.
    pub(crate) fn from_job_failure(error: Option<&serde_json::Value>, http_status: u16) -> Self {
        let raw: RawError = error
            .and_then(|e| serde_json::from_value(e.clone()).ok())
            .unwrap_or_default();

        ServiceError {
            code: if raw.code.is_empty() { "JOB_FAILED".to_string() } else { raw.code },
            message: if raw.message.is_empty() {
                "job failed without an error description".to_string()
            } else {
                raw.message
            },
            status: raw.status.unwrap_or(http_status),
            request_id: None,
            retry_after: None,
        }
    }

    /// Usage-limit exhaustion: HTTP 429 or a quota error code.
    pub fn is_quota(&self) -> bool {
        self.status == 429 || self.code.to_ascii_uppercase().contains("QUOTA")
    }
}

/// Network, I/O or wire-format failure while talking to the service or to storage.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Reqwest error, typically related to network issues or request failures.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode a JSON body from the server.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response is missing the `{0}` header")]
    MissingHeader(&'static str),

    /// Pre-signed storage URI rejected the transfer (expired or inaccessible asset).
    #[error("{url} answered with HTTP {status}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum PdfServicesError {
    /// Missing or malformed inputs/parameters, detected before any request is sent.
    #[error("invalid job request: {0}")]
    Validation(String),

    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),

    /// The service rejected the request or the job failed.
    #[error("service error: {0}")]
    Service(ServiceError),

    /// The service rejected the request because usage limits are exhausted.
    #[error("quota exceeded: {0}")]
    Quota(ServiceError),

    /// Result resolution called out of sequence.
    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("job polling cancelled")]
    Cancelled,

    #[error("job did not finish within {0:?}")]
    TimedOut(Duration),
}

pub type Result<T> = std::result::Result<T, PdfServicesError>;

impl PdfServicesError {
    /// Reads a non-success response and classifies it.
    pub async fn from_response(response: reqwest::Response) -> PdfServicesError {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response text".to_string());

        Self::classify(status, &headers, &body)
    }

    pub(crate) fn classify(status: u16, headers: &HeaderMap, body: &str) -> PdfServicesError {
        Self::from_service(ServiceError::from_http(status, headers, body))
    }

    pub fn from_service(error: ServiceError) -> PdfServicesError {
        if error.is_quota() {
            PdfServicesError::Quota(error)
        } else {
            PdfServicesError::Service(error)
        }
    }

    /// True for `Service` and its `Quota` subtype.
    pub fn is_service_error(&self) -> bool {
        self.service_error().is_some()
    }

    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(e) | Self::Quota(e) => Some(e),
            _ => None,
        }
    }

    /// Try parse Retry-After header (seconds)
    pub fn get_retry_after_seconds(&self) -> Option<u32> {
        self.service_error().and_then(|e| e.retry_after)
    }
}

impl From<reqwest::Error> for PdfServicesError {
    fn from(e: reqwest::Error) -> Self {
        PdfServicesError::Transfer(TransferError::Http(e))
    }
}

impl From<std::io::Error> for PdfServicesError {
    fn from(e: std::io::Error) -> Self {
        PdfServicesError::Transfer(TransferError::Io(e))
    }
}

impl From<serde_json::Error> for PdfServicesError {
    fn from(e: serde_json::Error) -> Self {
        PdfServicesError::Transfer(TransferError::Decode(e))
    }
}

pub(crate) fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<u32> {
    header_str(headers, "retry-after").and_then(|v| v.parse::<u32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_str(v).unwrap());
        }
        map
    }

    #[test]
    fn test_nested_error_body_is_parsed() {
        let body = r#"{"error":{"code":"BAD_PDF","message":"Input file is corrupted","status":400}}"#;
        let err = PdfServicesError::classify(400, &headers(&[("x-request-id", "req-1")]), body);
        match err {
            PdfServicesError::Service(e) => {
                assert_eq!(e.code, "BAD_PDF");
                assert_eq!(e.message, "Input file is corrupted");
                assert_eq!(e.status, 400);
                assert_eq!(e.request_id.as_deref(), Some("req-1"));
            }
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_flat_error_body_is_parsed() {
        let body = r#"{"code":"UNAUTHORIZED","message":"token expired"}"#;
        let err = PdfServicesError::classify(401, &HeaderMap::new(), body);
        let service = err.service_error().unwrap();
        assert_eq!(service.code, "UNAUTHORIZED");
        assert_eq!(service.status, 401);
    }

    #[test]
    fn test_unparseable_body_keeps_text() {
        let err = PdfServicesError::classify(502, &HeaderMap::new(), "Bad Gateway\n");
        let service = err.service_error().unwrap();
        assert_eq!(service.code, "HTTP_502");
        assert_eq!(service.message, "Bad Gateway");
    }

    #[test]
    fn test_429_is_quota_with_retry_after() {
        let err = PdfServicesError::classify(429, &headers(&[("retry-after", "30")]), "{}");
        assert!(matches!(err, PdfServicesError::Quota(_)));
        assert!(err.is_service_error());
        assert_eq!(err.get_retry_after_seconds(), Some(30));
    }

    #[test]
    fn test_quota_code_is_quota_regardless_of_status() {
        let body = r#"{"error":{"code":"INSUFFICIENT_QUOTA","message":"quota exhausted"}}"#;
        let err = PdfServicesError::classify(403, &HeaderMap::new(), body);
        assert!(matches!(err, PdfServicesError::Quota(_)));
    }

    #[test]
    fn test_job_failure_payload() {
        let payload = serde_json::json!({"code": "PASSWORD_PROTECTED", "message": "encrypted", "status": 400});
        let err = ServiceError::from_job_failure(Some(&payload), 200);
        assert_eq!(err.code, "PASSWORD_PROTECTED");
        assert_eq!(err.status, 400);

        let bare = ServiceError::from_job_failure(None, 200);
        assert_eq!(bare.code, "JOB_FAILED");
        assert_eq!(bare.status, 200);
    }
}
