//! Assets
//!
//! Handles to document content held by the service (uploaded or produced by a
//! job), or by caller-owned external storage reachable through a pre-signed URL.

use crate::service::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Media types accepted by the upload endpoint.
pub mod media_type {
    pub const PDF: &str = "application/pdf";
    pub const DOC: &str = "application/msword";
    pub const DOCX: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
    pub const PPT: &str = "application/vnd.ms-powerpoint";
    pub const PPTX: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation";
    pub const XLS: &str = "application/vnd.ms-excel";
    pub const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
    pub const RTF: &str = "text/rtf";
    pub const TXT: &str = "text/plain";
    pub const HTML: &str = "text/html";
    pub const ZIP: &str = "application/zip";
    pub const JSON: &str = "application/json";
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const BMP: &str = "image/bmp";
    pub const GIF: &str = "image/gif";
    pub const TIFF: &str = "image/tiff";
}

/// Guesses the upload media type from a file extension.
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let media = match ext.as_str() {
        "pdf" => media_type::PDF,
        "doc" => media_type::DOC,
        "docx" => media_type::DOCX,
        "ppt" => media_type::PPT,
        "pptx" => media_type::PPTX,
        "xls" => media_type::XLS,
        "xlsx" => media_type::XLSX,
        "rtf" => media_type::RTF,
        "txt" => media_type::TXT,
        "html" | "htm" => media_type::HTML,
        "zip" => media_type::ZIP,
        "json" => media_type::JSON,
        "png" => media_type::PNG,
        "jpg" | "jpeg" => media_type::JPEG,
        "bmp" => media_type::BMP,
        "gif" => media_type::GIF,
        "tif" | "tiff" => media_type::TIFF,
        _ => return None,
    };
    Some(media)
}

/// File extension to use when saving content of the given media type.
pub fn extension_for_media_type(media: &str) -> &'static str {
    // Content types may carry parameters, e.g. `application/json; charset=utf-8`.
    let media = media.split(';').next().unwrap_or("").trim();
    match media {
        media_type::PDF => "pdf",
        media_type::DOC => "doc",
        media_type::DOCX => "docx",
        media_type::PPTX => "pptx",
        media_type::XLSX => "xlsx",
        media_type::RTF => "rtf",
        media_type::ZIP => "zip",
        media_type::JSON => "json",
        media_type::PNG => "png",
        media_type::JPEG => "jpeg",
        _ => "bin",
    }
}

#[derive(Deserialize)]
struct RawAssetMetadata {
    #[serde(rename = "type")]
    media_type: Option<String>,
    size: Option<u64>,
}

#[derive(Deserialize)]
struct RawAsset {
    #[serde(rename = "assetID")]
    asset_id: String,
    #[serde(rename = "downloadUri")]
    download_uri: Option<String>,
    metadata: Option<RawAssetMetadata>,
}

/// Opaque handle to a blob held by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAsset")]
pub struct Asset {
    pub asset_id: String,
    /// Pre-signed download location, present on job outputs.
    pub download_uri: Option<String>,
    pub media_type: Option<String>,
    pub size: Option<u64>,
}

impl From<RawAsset> for Asset {
    fn from(raw: RawAsset) -> Self {
        let (media_type, size) = match raw.metadata {
            Some(m) => (m.media_type, m.size),
            None => (None, None),
        };
        Asset {
            asset_id: raw.asset_id,
            download_uri: raw.download_uri,
            media_type,
            size,
        }
    }
}

impl Asset {
    /// An asset known only by id, e.g. one uploaded in an earlier run.
    pub fn new(asset_id: impl Into<String>) -> Self {
        Asset {
            asset_id: asset_id.into(),
            download_uri: None,
            media_type: None,
            size: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExternalStorageType {
    #[serde(rename = "S3")]
    S3,
    #[serde(rename = "SHAREPOINT")]
    SharePoint,
    #[serde(rename = "DROPBOX")]
    Dropbox,
}

/// Content in caller-owned storage, addressed by a pre-signed URL. The service
/// reads or writes it directly, so it never flows through this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAsset {
    pub uri: String,
    pub storage: ExternalStorageType,
}

impl ExternalAsset {
    pub fn new(uri: impl Into<String>, storage: ExternalStorageType) -> Self {
        ExternalAsset {
            uri: uri.into(),
            storage,
        }
    }
}

/// Job input: either an uploaded asset or an external one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRef {
    Cloud(Asset),
    External(ExternalAsset),
}

impl AssetRef {
    pub fn is_external(&self) -> bool {
        matches!(self, AssetRef::External(_))
    }
}

impl From<Asset> for AssetRef {
    fn from(asset: Asset) -> Self {
        AssetRef::Cloud(asset)
    }
}

impl From<ExternalAsset> for AssetRef {
    fn from(asset: ExternalAsset) -> Self {
        AssetRef::External(asset)
    }
}

/// Downloaded asset content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamAsset {
    pub content: Vec<u8>,
    pub media_type: String,
}

impl StreamAsset {
    /// Writes the content to `path`, creating parent directories.
    pub async fn save_as(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &self.content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_asset_from_job_output() {
        let asset: Asset = serde_json::from_value(serde_json::json!({
            "assetID": "urn:aaid:AS:UE1:abc",
            "downloadUri": "https://storage.example/abc",
            "metadata": {"type": "application/pdf", "size": 1024}
        }))
        .unwrap();

        assert_eq!(asset.asset_id, "urn:aaid:AS:UE1:abc");
        assert_eq!(asset.download_uri.as_deref(), Some("https://storage.example/abc"));
        assert_eq!(asset.media_type.as_deref(), Some(media_type::PDF));
        assert_eq!(asset.size, Some(1024));
    }

    #[test]
    fn test_external_asset_wire_shape() {
        let external = ExternalAsset::new("https://bucket.example/in.docx?sig=1", ExternalStorageType::SharePoint);
        let value = serde_json::to_value(&external).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"uri": "https://bucket.example/in.docx?sig=1", "storage": "SHAREPOINT"})
        );
    }

    #[test]
    fn test_media_type_guessing() {
        assert_eq!(media_type_for_path(Path::new("in/report.PDF")), Some(media_type::PDF));
        assert_eq!(media_type_for_path(Path::new("deck.pptx")), Some(media_type::PPTX));
        assert_eq!(media_type_for_path(Path::new("noext")), None);
        assert_eq!(extension_for_media_type("application/json; charset=utf-8"), "json");
        assert_eq!(extension_for_media_type("application/x-unknown"), "bin");
    }

    #[tokio::test]
    async fn test_save_as_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.pdf");
        let stream = StreamAsset {
            content: b"%PDF-1.7".to_vec(),
            media_type: media_type::PDF.to_string(),
        };

        stream.save_as(&path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
    }
}
