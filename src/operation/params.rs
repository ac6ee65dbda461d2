//! Per-operation parameters.
//!
//! Plain value objects; every optional field is omitted from the request
//! body when unset so the service applies its own default.

use crate::asset::Asset;
use crate::page_ranges::PageRanges;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePdfParams {
    /// BCP 47 language tag of the source document, e.g. `en-US`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    /// Inches.
    pub page_width: f64,
    pub page_height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HtmlToPdfParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_header_footer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_layout: Option<PageLayout>,
    /// Data for dynamic HTML, serialized JSON passed through to the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportTargetFormat {
    Doc,
    Docx,
    Pptx,
    Xlsx,
    Rtf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPdfParams {
    pub target_format: ExportTargetFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_lang: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImagesOutputType {
    ListOfPageImages,
    ZipOfPageImages,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPdfToImagesParams {
    pub target_format: ImageFormat,
    pub output_type: ImagesOutputType,
}

/// How a split divides the document. Exactly one criterion per job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SplitOption {
    /// One output file per range.
    PageRanges(PageRanges),
    /// Output files of this many pages each.
    PageCount(u32),
    /// This many output files of roughly equal size.
    FileCount(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRotation {
    /// Clockwise degrees: 90, 180 or 270.
    pub angle: u16,
    pub page_ranges: PageRanges,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineInput {
    pub asset: Asset,
    /// All pages when unset.
    pub page_ranges: Option<PageRanges>,
}

impl CombineInput {
    pub fn new(asset: Asset) -> Self {
        CombineInput {
            asset,
            page_ranges: None,
        }
    }

    pub fn with_page_ranges(asset: Asset, page_ranges: PageRanges) -> Self {
        CombineInput {
            asset,
            page_ranges: Some(page_ranges),
        }
    }
}

/// Pages of `asset` to splice into the base document so that they start at `base_page`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInsertion {
    pub asset: Asset,
    pub page_ranges: Option<PageRanges>,
    pub base_page: u32,
}

/// Pages of `asset` that take the place of page `base_page` of the base document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReplacement {
    pub asset: Asset,
    pub page_ranges: Option<PageRanges>,
    pub base_page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompressionLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<CompressionLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrType {
    SearchableImage,
    SearchableImageExact,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OcrParams {
    /// Locale such as `en-US` or `de-DE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_type: Option<OcrType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptionAlgorithm {
    #[serde(rename = "AES_128")]
    Aes128,
    #[serde(rename = "AES_256")]
    Aes256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentToEncrypt {
    AllContent,
    AllContentExceptMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    PrintLowQuality,
    PrintHighQuality,
    EditContent,
    EditDocumentAssembly,
    EditAnnotations,
    EditFillAndSignFormFields,
    CopyContent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordProtection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectParams {
    pub password_protection: PasswordProtection,
    pub encryption_algorithm: EncryptionAlgorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_to_encrypt: Option<ContentToEncrypt>,
    /// Only honored together with an owner password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<Permission>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatermarkAppearance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appear_on_foreground: Option<bool>,
    /// Percent, 0-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatermarkParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_ranges: Option<PageRanges>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appearance: Option<WatermarkAppearance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutotagParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_headings: Option<bool>,
    /// Also produce an XLSX tagging report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_report: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractElement {
    Text,
    Tables,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractRendition {
    Tables,
    Figures,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableOutputFormat {
    Csv,
    Xlsx,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractParams {
    pub elements_to_extract: Vec<ExtractElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements_to_extract_renditions: Option<Vec<ExtractRendition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_output_format: Option<TableOutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get_char_bounds: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_styling: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertiesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_level: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessibilityParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_end: Option<u32>,
}
