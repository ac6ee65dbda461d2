//! PDF Services Client
//!
//! A reqwest client for the PDF Services REST API: asset upload and download,
//! job submission and job status.

use crate::asset::{Asset, StreamAsset};
use crate::config::ClientConfig;
use crate::consts::client::{API_KEY_HEADER, REQUEST_ID_HEADER};
use crate::environment::Credentials;
use crate::job::{JobHandle, JobRequest, JobStatus};
use crate::service::error::{header_str, parse_retry_after, PdfServicesError, Result, TransferError};
use crate::service::PdfServicesApi;
use log::debug;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Deserialize)]
struct UploadTicket {
    #[serde(rename = "uploadUri")]
    upload_uri: String,
    #[serde(rename = "assetID")]
    asset_id: String,
}

#[derive(Deserialize)]
struct AssetLocation {
    #[serde(rename = "downloadUri")]
    download_uri: String,
}

#[derive(Debug, Clone)]
pub struct PdfServicesClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    default_retry_interval: Duration,
}

impl PdfServicesClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
            default_retry_interval: config.poll.default_retry_interval,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Adds the API key and bearer token. Pre-signed storage URIs must not get these.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(API_KEY_HEADER, &self.credentials.client_id)
            .bearer_auth(&self.credentials.access_token)
    }

    async fn handle_response_status(response: Response) -> Result<Response> {
        if !response.status().is_success() {
            return Err(PdfServicesError::from_response(response).await);
        }
        Ok(response)
    }

    /// Non-2xx from a pre-signed storage URI.
    fn check_storage_status(response: Response) -> Result<Response> {
        if !response.status().is_success() {
            return Err(TransferError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: response.url().to_string(),
            }
            .into());
        }
        Ok(response)
    }

    async fn resolve_download_uri(&self, asset: &Asset) -> Result<String> {
        if let Some(uri) = &asset.download_uri {
            return Ok(uri.clone());
        }
        let url = self.build_url(&format!("assets/{}", asset.asset_id));
        debug!("Resolving download location of asset {}", asset.asset_id);
        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = Self::handle_response_status(response).await?;
        let location: AssetLocation = serde_json::from_slice(&response.bytes().await?)?;
        Ok(location.download_uri)
    }
}

#[async_trait::async_trait]
impl PdfServicesApi for PdfServicesClient {
    async fn upload(&self, content: Vec<u8>, media_type: &str) -> Result<Asset> {
        let url = self.build_url("assets");
        let response = self
            .authorized(self.client.post(&url))
            .json(&serde_json::json!({ "mediaType": media_type }))
            .send()
            .await?;
        let response = Self::handle_response_status(response).await?;
        let ticket: UploadTicket = serde_json::from_slice(&response.bytes().await?)?;

        debug!("Uploading {} bytes as {} to asset {}", content.len(), media_type, ticket.asset_id);
        let size = content.len() as u64;
        let response = self
            .client
            .put(&ticket.upload_uri)
            .header(CONTENT_TYPE, media_type)
            .body(content)
            .send()
            .await?;
        Self::check_storage_status(response)?;

        Ok(Asset {
            asset_id: ticket.asset_id,
            download_uri: None,
            media_type: Some(media_type.to_string()),
            size: Some(size),
        })
    }

    async fn submit(&self, request: &JobRequest) -> Result<JobHandle> {
        request.validate()?;

        let url = self.build_url(&format!("operation/{}", request.kind().endpoint()));
        debug!("Submitting {} job to {}", request.kind(), url);
        let response = self
            .authorized(self.client.post(&url))
            .json(&request.request_body())
            .send()
            .await?;
        let response = Self::handle_response_status(response).await?;

        let location = header_str(response.headers(), LOCATION.as_str())
            .ok_or(TransferError::MissingHeader("location"))?;
        Ok(JobHandle {
            location,
            request_id: header_str(response.headers(), REQUEST_ID_HEADER),
        })
    }

    async fn job_status(&self, handle: &JobHandle) -> Result<JobStatus> {
        debug!("Polling job status at {}", handle.location);
        let response = self.authorized(self.client.get(&handle.location)).send().await?;
        let response = Self::handle_response_status(response).await?;

        let http_status = response.status().as_u16();
        let retry_after = parse_retry_after(response.headers());
        let body: serde_json::Value = serde_json::from_slice(&response.bytes().await?)?;
        JobStatus::parse(body, retry_after, http_status, self.default_retry_interval)
    }

    async fn download(&self, asset: &Asset) -> Result<StreamAsset> {
        let uri = self.resolve_download_uri(asset).await?;
        debug!("Downloading asset {}", asset.asset_id);
        let response = Self::check_storage_status(self.client.get(&uri).send().await?)?;

        let media_type = header_str(response.headers(), CONTENT_TYPE.as_str())
            .or_else(|| asset.media_type.clone())
            .unwrap_or_else(|| OCTET_STREAM.to_string());
        let content = response.bytes().await?.to_vec();
        Ok(StreamAsset { content, media_type })
    }
}
