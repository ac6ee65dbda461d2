//! Operations
//!
//! One variant per remote operation. Each variant names its inputs by role
//! (base document, watermark, seal image, ...) because the request body is the
//! only place the service learns which asset plays which part.

pub mod params;
mod parts;

use crate::asset::{Asset, AssetRef};
use crate::page_ranges::PageRanges;
use crate::service::error::{PdfServicesError, Result};
use params::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    CreatePdf,
    HtmlToPdf,
    ExportPdf,
    ExportPdfToImages,
    Combine,
    Split,
    DeletePages,
    RotatePages,
    InsertPages,
    ReplacePages,
    ReorderPages,
    Compress,
    Linearize,
    Ocr,
    Protect,
    RemoveProtection,
    Watermark,
    Autotag,
    Extract,
    Properties,
    ElectronicSeal,
    AccessibilityCheck,
    ImportFormData,
}

impl OperationKind {
    /// Path segment under `/operation/` the job is posted to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            OperationKind::CreatePdf => "createpdf",
            OperationKind::HtmlToPdf => "htmltopdf",
            OperationKind::ExportPdf => "exportpdf",
            OperationKind::ExportPdfToImages => "exportpdftoimages",
            OperationKind::Combine
            | OperationKind::InsertPages
            | OperationKind::ReplacePages
            | OperationKind::ReorderPages => "combinepdf",
            OperationKind::Split => "splitpdf",
            OperationKind::DeletePages | OperationKind::RotatePages => "pagemanipulation",
            OperationKind::Compress => "compresspdf",
            OperationKind::Linearize => "linearizepdf",
            OperationKind::Ocr => "ocr",
            OperationKind::Protect => "protectpdf",
            OperationKind::RemoveProtection => "removeprotection",
            OperationKind::Watermark => "addwatermark",
            OperationKind::Autotag => "autotag",
            OperationKind::Extract => "extractpdf",
            OperationKind::Properties => "pdfproperties",
            OperationKind::ElectronicSeal => "electronicseal",
            OperationKind::AccessibilityCheck => "accessibilitychecker",
            OperationKind::ImportFormData => "setformdata",
        }
    }

    /// Whether the operation accepts external-storage input and output.
    pub fn supports_external_storage(&self) -> bool {
        !matches!(
            self,
            OperationKind::Combine
                | OperationKind::InsertPages
                | OperationKind::ReplacePages
                | OperationKind::ReorderPages
                | OperationKind::Watermark
                | OperationKind::ElectronicSeal
        )
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Same spelling as the manifest files.
        match serde_json::to_value(self) {
            Ok(Value::String(s)) => f.write_str(&s),
            _ => write!(f, "{:?}", self),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    CreatePdf { input: AssetRef, params: CreatePdfParams },
    HtmlToPdf { input: AssetRef, params: HtmlToPdfParams },
    ExportPdf { input: AssetRef, params: ExportPdfParams },
    ExportPdfToImages { input: AssetRef, params: ExportPdfToImagesParams },
    Combine { inputs: Vec<CombineInput> },
    Split { input: AssetRef, option: SplitOption },
    DeletePages { input: AssetRef, page_ranges: PageRanges },
    RotatePages { input: AssetRef, rotations: Vec<PageRotation> },
    InsertPages { base: Asset, insertions: Vec<PageInsertion> },
    ReplacePages { base: Asset, replacements: Vec<PageReplacement> },
    /// `page_order` lists the pages of `input` in their new order.
    ReorderPages { input: Asset, page_order: PageRanges },
    Compress { input: AssetRef, params: CompressParams },
    Linearize { input: AssetRef },
    Ocr { input: AssetRef, params: OcrParams },
    Protect { input: AssetRef, params: ProtectParams },
    RemoveProtection { input: AssetRef, password: String },
    Watermark { input: Asset, watermark: Asset, params: WatermarkParams },
    Autotag { input: AssetRef, params: AutotagParams },
    Extract { input: AssetRef, params: ExtractParams },
    Properties { input: AssetRef, params: PropertiesParams },
    /// Seal options (certificate credentials, field placement, appearance) are
    /// passed through verbatim.
    ElectronicSeal { input: Asset, seal_image: Option<Asset>, seal_options: Value },
    AccessibilityCheck { input: AssetRef, params: AccessibilityParams },
    ImportFormData { input: AssetRef, form_data: Value },
}

fn invalid(msg: impl Into<String>) -> PdfServicesError {
    PdfServicesError::Validation(msg.into())
}

fn check_ranges(ranges: &PageRanges, what: &str) -> Result<()> {
    ranges.validate().map_err(|e| invalid(format!("{}: {}", what, e)))
}

fn check_required_ranges(ranges: &PageRanges, what: &str) -> Result<()> {
    if ranges.is_empty() {
        return Err(invalid(format!("{} requires at least one page range", what)));
    }
    check_ranges(ranges, what)
}

fn check_optional_ranges(ranges: &Option<PageRanges>, what: &str) -> Result<()> {
    match ranges {
        Some(r) => check_required_ranges(r, what),
        None => Ok(()),
    }
}

fn check_base_pages<'a>(pages: impl Iterator<Item = &'a u32>, what: &str) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for page in pages {
        if *page == 0 {
            return Err(invalid(format!("{}: page numbers start at 1", what)));
        }
        if !seen.insert(*page) {
            return Err(invalid(format!("{}: base page {} used twice", what, page)));
        }
    }
    if seen.is_empty() {
        return Err(invalid(format!("{} requires at least one entry", what)));
    }
    Ok(())
}

/// Input reference under `key`, or the external `input` object.
fn input_body(input: &AssetRef, key: &str) -> Map<String, Value> {
    let mut body = Map::new();
    match input {
        AssetRef::Cloud(asset) => {
            body.insert(key.to_string(), Value::String(asset.asset_id.clone()));
        }
        AssetRef::External(external) => {
            body.insert("input".to_string(), json!(external));
        }
    }
    body
}

fn with_params<T: Serialize>(mut body: Map<String, Value>, params: &T) -> Map<String, Value> {
    if let Ok(Value::Object(fields)) = serde_json::to_value(params) {
        body.extend(fields);
    }
    body
}

fn segment(asset: &Asset, page_ranges: Option<&PageRanges>) -> Value {
    let mut entry = Map::new();
    entry.insert("assetID".to_string(), Value::String(asset.asset_id.clone()));
    if let Some(ranges) = page_ranges {
        entry.insert("pageRanges".to_string(), json!(ranges));
    }
    Value::Object(entry)
}

fn base_segment(base: &Asset, start: u32, end: Option<u32>) -> Value {
    let mut ranges = PageRanges::new();
    match end {
        Some(end) => ranges.add_range(start, end),
        None => ranges.add_all_from(start),
    };
    segment(base, Some(&ranges))
}

/// Splits `base` around the given pages and splices the new content in.
/// `skip` is 0 for insertion (base page stays, after the new pages) and 1 for
/// replacement (base page is dropped).
fn splice(base: &Asset, mut edits: Vec<(u32, &Asset, Option<&PageRanges>)>, skip: u32) -> Value {
    edits.sort_by_key(|(page, _, _)| *page);
    let mut assets = Vec::new();
    let mut cursor = 1;
    for (page, asset, ranges) in edits {
        if page > cursor {
            assets.push(base_segment(base, cursor, Some(page - 1)));
        }
        assets.push(segment(asset, ranges));
        cursor = page + skip;
    }
    assets.push(base_segment(base, cursor, None));
    json!({ "assets": assets })
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::CreatePdf { .. } => OperationKind::CreatePdf,
            Operation::HtmlToPdf { .. } => OperationKind::HtmlToPdf,
            Operation::ExportPdf { .. } => OperationKind::ExportPdf,
            Operation::ExportPdfToImages { .. } => OperationKind::ExportPdfToImages,
            Operation::Combine { .. } => OperationKind::Combine,
            Operation::Split { .. } => OperationKind::Split,
            Operation::DeletePages { .. } => OperationKind::DeletePages,
            Operation::RotatePages { .. } => OperationKind::RotatePages,
            Operation::InsertPages { .. } => OperationKind::InsertPages,
            Operation::ReplacePages { .. } => OperationKind::ReplacePages,
            Operation::ReorderPages { .. } => OperationKind::ReorderPages,
            Operation::Compress { .. } => OperationKind::Compress,
            Operation::Linearize { .. } => OperationKind::Linearize,
            Operation::Ocr { .. } => OperationKind::Ocr,
            Operation::Protect { .. } => OperationKind::Protect,
            Operation::RemoveProtection { .. } => OperationKind::RemoveProtection,
            Operation::Watermark { .. } => OperationKind::Watermark,
            Operation::Autotag { .. } => OperationKind::Autotag,
            Operation::Extract { .. } => OperationKind::Extract,
            Operation::Properties { .. } => OperationKind::Properties,
            Operation::ElectronicSeal { .. } => OperationKind::ElectronicSeal,
            Operation::AccessibilityCheck { .. } => OperationKind::AccessibilityCheck,
            Operation::ImportFormData { .. } => OperationKind::ImportFormData,
        }
    }

    /// The single input of single-input operations.
    fn single_input(&self) -> Option<&AssetRef> {
        match self {
            Operation::CreatePdf { input, .. }
            | Operation::HtmlToPdf { input, .. }
            | Operation::ExportPdf { input, .. }
            | Operation::ExportPdfToImages { input, .. }
            | Operation::Split { input, .. }
            | Operation::DeletePages { input, .. }
            | Operation::RotatePages { input, .. }
            | Operation::Compress { input, .. }
            | Operation::Linearize { input }
            | Operation::Ocr { input, .. }
            | Operation::Protect { input, .. }
            | Operation::RemoveProtection { input, .. }
            | Operation::Autotag { input, .. }
            | Operation::Extract { input, .. }
            | Operation::Properties { input, .. }
            | Operation::AccessibilityCheck { input, .. }
            | Operation::ImportFormData { input, .. } => Some(input),
            _ => None,
        }
    }

    /// Input assets in request order.
    pub fn inputs(&self) -> Vec<AssetRef> {
        if let Some(input) = self.single_input() {
            return vec![input.clone()];
        }
        let cloud: Vec<&Asset> = match self {
            Operation::Combine { inputs } => inputs.iter().map(|i| &i.asset).collect(),
            Operation::InsertPages { base, insertions } => std::iter::once(base)
                .chain(insertions.iter().map(|i| &i.asset))
                .collect(),
            Operation::ReplacePages { base, replacements } => std::iter::once(base)
                .chain(replacements.iter().map(|r| &r.asset))
                .collect(),
            Operation::ReorderPages { input, .. } => vec![input],
            Operation::Watermark { input, watermark, .. } => vec![input, watermark],
            Operation::ElectronicSeal { input, seal_image, .. } => {
                std::iter::once(input).chain(seal_image.iter()).collect()
            }
            _ => Vec::new(),
        };
        cloud.into_iter().cloned().map(AssetRef::Cloud).collect()
    }

    /// Checks required inputs and parameters. Runs before any request is sent.
    pub fn validate(&self) -> Result<()> {
        if let Some(AssetRef::Cloud(asset)) = self.single_input() {
            if asset.asset_id.is_empty() {
                return Err(invalid("input asset id is empty"));
            }
        }
        if let Some(AssetRef::External(external)) = self.single_input() {
            if external.uri.is_empty() {
                return Err(invalid("external input uri is empty"));
            }
        }

        match self {
            Operation::ExportPdfToImages { .. }
            | Operation::CreatePdf { .. }
            | Operation::HtmlToPdf { .. }
            | Operation::ExportPdf { .. }
            | Operation::Compress { .. }
            | Operation::Linearize { .. }
            | Operation::Ocr { .. }
            | Operation::Autotag { .. }
            | Operation::Properties { .. } => Ok(()),
            Operation::Combine { inputs } => {
                if inputs.len() < 2 {
                    return Err(invalid("combine requires at least two input files"));
                }
                for input in inputs {
                    check_optional_ranges(&input.page_ranges, "combine")?;
                }
                Ok(())
            }
            Operation::Split { option, .. } => match option {
                SplitOption::PageRanges(ranges) => check_required_ranges(ranges, "split"),
                SplitOption::PageCount(0) => Err(invalid("split page count must be positive")),
                SplitOption::FileCount(0) => Err(invalid("split file count must be positive")),
                _ => Ok(()),
            },
            Operation::DeletePages { page_ranges, .. } => {
                check_required_ranges(page_ranges, "delete pages")
            }
            Operation::RotatePages { rotations, .. } => {
                if rotations.is_empty() {
                    return Err(invalid("rotate pages requires at least one rotation"));
                }
                for rotation in rotations {
                    if !matches!(rotation.angle, 90 | 180 | 270) {
                        return Err(invalid(format!(
                            "rotation angle must be 90, 180 or 270, got {}",
                            rotation.angle
                        )));
                    }
                    check_required_ranges(&rotation.page_ranges, "rotate pages")?;
                }
                Ok(())
            }
            Operation::InsertPages { insertions, .. } => {
                check_base_pages(insertions.iter().map(|i| &i.base_page), "insert pages")?;
                for insertion in insertions {
                    check_optional_ranges(&insertion.page_ranges, "insert pages")?;
                }
                Ok(())
            }
            Operation::ReplacePages { replacements, .. } => {
                check_base_pages(replacements.iter().map(|r| &r.base_page), "replace pages")?;
                for replacement in replacements {
                    check_optional_ranges(&replacement.page_ranges, "replace pages")?;
                }
                Ok(())
            }
            Operation::ReorderPages { page_order, .. } => {
                check_required_ranges(page_order, "reorder pages")
            }
            Operation::Protect { params, .. } => {
                let passwords = &params.password_protection;
                let user = passwords.user_password.as_deref().filter(|p| !p.is_empty());
                let owner = passwords.owner_password.as_deref().filter(|p| !p.is_empty());
                if user.is_none() && owner.is_none() {
                    return Err(invalid("protect requires a user or owner password"));
                }
                if user.is_some() && user == owner {
                    return Err(invalid("user and owner passwords must differ"));
                }
                if params.permissions.is_some() && owner.is_none() {
                    return Err(invalid("permissions require an owner password"));
                }
                Ok(())
            }
            Operation::RemoveProtection { password, .. } => {
                if password.is_empty() {
                    return Err(invalid("remove protection requires the document password"));
                }
                Ok(())
            }
            Operation::Watermark { params, .. } => {
                check_optional_ranges(&params.page_ranges, "watermark")?;
                if let Some(opacity) = params.appearance.as_ref().and_then(|a| a.opacity) {
                    if opacity > 100 {
                        return Err(invalid(format!(
                            "watermark opacity must be between 0 and 100, got {}",
                            opacity
                        )));
                    }
                }
                Ok(())
            }
            Operation::Extract { params, .. } => {
                if params.elements_to_extract.is_empty() {
                    return Err(invalid("extract requires at least one element type"));
                }
                Ok(())
            }
            Operation::ElectronicSeal { seal_options, .. } => match seal_options {
                Value::Object(fields) if !fields.is_empty() => Ok(()),
                _ => Err(invalid("electronic seal requires seal options")),
            },
            Operation::AccessibilityCheck { params, .. } => {
                match (params.page_start, params.page_end) {
                    (Some(0), _) | (_, Some(0)) => Err(invalid("page numbers start at 1")),
                    (Some(start), Some(end)) if end < start => {
                        Err(invalid("accessibility check page range ends before it starts"))
                    }
                    _ => Ok(()),
                }
            }
            Operation::ImportFormData { form_data, .. } => {
                if !form_data.is_object() {
                    return Err(invalid("form data must be a JSON object"));
                }
                Ok(())
            }
        }
    }

    /// JSON request body for the operation endpoint.
    pub fn request_body(&self) -> Value {
        let body = match self {
            Operation::CreatePdf { input, params } => with_params(input_body(input, "assetID"), params),
            Operation::HtmlToPdf { input, params } => with_params(input_body(input, "assetID"), params),
            Operation::ExportPdf { input, params } => with_params(input_body(input, "assetID"), params),
            Operation::ExportPdfToImages { input, params } => {
                with_params(input_body(input, "assetID"), params)
            }
            Operation::Combine { inputs } => {
                let assets: Vec<Value> = inputs
                    .iter()
                    .map(|i| segment(&i.asset, i.page_ranges.as_ref()))
                    .collect();
                return json!({ "assets": assets });
            }
            Operation::Split { input, option } => {
                let mut body = input_body(input, "assetID");
                body.insert("splitoption".to_string(), json!(option));
                body
            }
            Operation::DeletePages { input, page_ranges } => {
                let mut body = input_body(input, "assetID");
                body.insert(
                    "pageActions".to_string(),
                    json!([{ "delete": { "pageRanges": page_ranges } }]),
                );
                body
            }
            Operation::RotatePages { input, rotations } => {
                let mut body = input_body(input, "assetID");
                let actions: Vec<Value> = rotations.iter().map(|r| json!({ "rotate": r })).collect();
                body.insert("pageActions".to_string(), Value::Array(actions));
                body
            }
            Operation::InsertPages { base, insertions } => {
                let edits = insertions
                    .iter()
                    .map(|i| (i.base_page, &i.asset, i.page_ranges.as_ref()))
                    .collect();
                return splice(base, edits, 0);
            }
            Operation::ReplacePages { base, replacements } => {
                let edits = replacements
                    .iter()
                    .map(|r| (r.base_page, &r.asset, r.page_ranges.as_ref()))
                    .collect();
                return splice(base, edits, 1);
            }
            Operation::ReorderPages { input, page_order } => {
                return json!({ "assets": [segment(input, Some(page_order))] });
            }
            Operation::Compress { input, params } => with_params(input_body(input, "assetID"), params),
            Operation::Linearize { input } => input_body(input, "assetID"),
            Operation::Ocr { input, params } => with_params(input_body(input, "assetID"), params),
            Operation::Protect { input, params } => with_params(input_body(input, "assetID"), params),
            Operation::RemoveProtection { input, password } => {
                let mut body = input_body(input, "assetID");
                body.insert("password".to_string(), Value::String(password.clone()));
                body
            }
            Operation::Watermark { input, watermark, params } => {
                let mut body = Map::new();
                body.insert("inputDocumentAssetID".to_string(), json!(input.asset_id));
                body.insert("watermarkAssetID".to_string(), json!(watermark.asset_id));
                with_params(body, params)
            }
            Operation::Autotag { input, params } => with_params(input_body(input, "assetID"), params),
            Operation::Extract { input, params } => with_params(input_body(input, "assetID"), params),
            Operation::Properties { input, params } => with_params(input_body(input, "assetID"), params),
            Operation::ElectronicSeal { input, seal_image, seal_options } => {
                let mut body = Map::new();
                body.insert("inputDocumentAssetID".to_string(), json!(input.asset_id));
                if let Some(image) = seal_image {
                    body.insert("sealImageAssetID".to_string(), json!(image.asset_id));
                }
                body.insert("sealOptions".to_string(), seal_options.clone());
                body
            }
            Operation::AccessibilityCheck { input, params } => {
                with_params(input_body(input, "assetID"), params)
            }
            Operation::ImportFormData { input, form_data } => {
                let mut body = input_body(input, "assetID");
                body.insert("jsonFormFieldsData".to_string(), form_data.clone());
                body
            }
        };
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{ExternalAsset, ExternalStorageType};

    fn pdf(id: &str) -> Asset {
        Asset::new(id)
    }

    fn ranges(pairs: &[(u32, u32)]) -> PageRanges {
        let mut r = PageRanges::new();
        for (s, e) in pairs {
            r.add_range(*s, *e);
        }
        r
    }

    #[test]
    fn test_combine_body_keeps_input_order_and_ranges() {
        let op = Operation::Combine {
            inputs: vec![
                CombineInput::with_page_ranges(pdf("a"), ranges(&[(1, 2)])),
                CombineInput::new(pdf("b")),
            ],
        };
        assert!(op.validate().is_ok());
        assert_eq!(op.kind().endpoint(), "combinepdf");
        assert_eq!(
            op.request_body(),
            json!({"assets": [
                {"assetID": "a", "pageRanges": [{"start": 1, "end": 2}]},
                {"assetID": "b"}
            ]})
        );
    }

    #[test]
    fn test_combine_needs_two_inputs() {
        let op = Operation::Combine {
            inputs: vec![CombineInput::new(pdf("a"))],
        };
        assert!(matches!(op.validate(), Err(PdfServicesError::Validation(_))));
    }

    #[test]
    fn test_split_by_empty_ranges_is_invalid() {
        let op = Operation::Split {
            input: pdf("a").into(),
            option: SplitOption::PageRanges(PageRanges::new()),
        };
        assert!(matches!(op.validate(), Err(PdfServicesError::Validation(_))));

        let by_count = Operation::Split {
            input: pdf("a").into(),
            option: SplitOption::PageCount(2),
        };
        assert!(by_count.validate().is_ok());
        assert_eq!(
            by_count.request_body(),
            json!({"assetID": "a", "splitoption": {"pageCount": 2}})
        );
    }

    #[test]
    fn test_delete_pages_body_and_validation() {
        let op = Operation::DeletePages {
            input: pdf("a").into(),
            page_ranges: ranges(&[(2, 3)]),
        };
        assert!(op.validate().is_ok());
        assert_eq!(
            op.request_body(),
            json!({"assetID": "a", "pageActions": [{"delete": {"pageRanges": [{"start": 2, "end": 3}]}}]})
        );

        let empty = Operation::DeletePages {
            input: pdf("a").into(),
            page_ranges: PageRanges::new(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_rotation_angle_is_checked() {
        let op = Operation::RotatePages {
            input: pdf("a").into(),
            rotations: vec![PageRotation {
                angle: 45,
                page_ranges: ranges(&[(1, 1)]),
            }],
        };
        assert!(op.validate().unwrap_err().to_string().contains("45"));
    }

    #[test]
    fn test_insert_pages_splices_base_document() {
        let op = Operation::InsertPages {
            base: pdf("base"),
            insertions: vec![
                PageInsertion {
                    asset: pdf("second"),
                    page_ranges: None,
                    base_page: 3,
                },
                PageInsertion {
                    asset: pdf("first"),
                    page_ranges: Some(ranges(&[(1, 1)])),
                    base_page: 1,
                },
            ],
        };
        assert!(op.validate().is_ok());
        assert_eq!(
            op.request_body(),
            json!({"assets": [
                {"assetID": "first", "pageRanges": [{"start": 1, "end": 1}]},
                {"assetID": "base", "pageRanges": [{"start": 1, "end": 2}]},
                {"assetID": "second"},
                {"assetID": "base", "pageRanges": [{"start": 3}]}
            ]})
        );
        assert_eq!(op.inputs().len(), 3);
    }

    #[test]
    fn test_replace_pages_drops_replaced_page() {
        let op = Operation::ReplacePages {
            base: pdf("base"),
            replacements: vec![PageReplacement {
                asset: pdf("new"),
                page_ranges: Some(ranges(&[(1, 2)])),
                base_page: 2,
            }],
        };
        assert_eq!(
            op.request_body(),
            json!({"assets": [
                {"assetID": "base", "pageRanges": [{"start": 1, "end": 1}]},
                {"assetID": "new", "pageRanges": [{"start": 1, "end": 2}]},
                {"assetID": "base", "pageRanges": [{"start": 3}]}
            ]})
        );
    }

    #[test]
    fn test_duplicate_base_page_is_invalid() {
        let op = Operation::ReplacePages {
            base: pdf("base"),
            replacements: vec![
                PageReplacement { asset: pdf("x"), page_ranges: None, base_page: 2 },
                PageReplacement { asset: pdf("y"), page_ranges: None, base_page: 2 },
            ],
        };
        assert!(op.validate().unwrap_err().to_string().contains("used twice"));
    }

    #[test]
    fn test_protect_password_rules() {
        let mut params = ProtectParams {
            password_protection: PasswordProtection::default(),
            encryption_algorithm: EncryptionAlgorithm::Aes256,
            content_to_encrypt: None,
            permissions: None,
        };
        let op = |p: &ProtectParams| Operation::Protect {
            input: pdf("a").into(),
            params: p.clone(),
        };
        assert!(op(&params).validate().is_err());

        params.password_protection.user_password = Some("user".into());
        assert!(op(&params).validate().is_ok());

        params.permissions = Some(vec![Permission::PrintLowQuality]);
        assert!(op(&params).validate().is_err());

        params.password_protection.owner_password = Some("owner".into());
        assert!(op(&params).validate().is_ok());
        assert_eq!(
            op(&params).request_body(),
            json!({
                "assetID": "a",
                "passwordProtection": {"userPassword": "user", "ownerPassword": "owner"},
                "encryptionAlgorithm": "AES_256",
                "permissions": ["PRINT_LOW_QUALITY"]
            })
        );
    }

    #[test]
    fn test_watermark_opacity_bound() {
        let mut params = WatermarkParams {
            page_ranges: None,
            appearance: Some(WatermarkAppearance {
                appear_on_foreground: Some(true),
                opacity: Some(50),
            }),
        };
        let op = |p: &WatermarkParams| Operation::Watermark {
            input: pdf("doc"),
            watermark: pdf("mark"),
            params: p.clone(),
        };
        assert!(op(&params).validate().is_ok());
        assert_eq!(
            op(&params).request_body(),
            json!({
                "inputDocumentAssetID": "doc",
                "watermarkAssetID": "mark",
                "appearance": {"appearOnForeground": true, "opacity": 50}
            })
        );

        params.appearance.as_mut().unwrap().opacity = Some(150);
        assert!(op(&params).validate().is_err());
    }

    #[test]
    fn test_external_input_replaces_asset_id() {
        let op = Operation::CreatePdf {
            input: ExternalAsset::new("https://bucket.example/in.docx", ExternalStorageType::S3).into(),
            params: CreatePdfParams::default(),
        };
        assert_eq!(
            op.request_body(),
            json!({"input": {"uri": "https://bucket.example/in.docx", "storage": "S3"}})
        );
    }

    #[test]
    fn test_optional_params_are_omitted() {
        let op = Operation::Ocr {
            input: pdf("a").into(),
            params: OcrParams {
                ocr_lang: Some("de-DE".into()),
                ocr_type: None,
            },
        };
        assert_eq!(op.request_body(), json!({"assetID": "a", "ocrLang": "de-DE"}));
    }

    #[test]
    fn test_kind_display_matches_manifest_spelling() {
        assert_eq!(OperationKind::ExportPdfToImages.to_string(), "export-pdf-to-images");
        assert_eq!(OperationKind::Ocr.to_string(), "ocr");
    }
}
