//! Building an [`Operation`] from a kind, an ordered input list and a JSON
//! parameter bundle, as found in job manifests.

use super::params::*;
use super::{Operation, OperationKind};
use crate::asset::{Asset, AssetRef};
use crate::page_ranges::PageRanges;
use crate::service::error::{PdfServicesError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CombineParts {
    /// Per-input ranges, aligned with the input list. Missing entries mean all pages.
    page_ranges: Vec<Option<PageRanges>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageRangesParts {
    page_ranges: PageRanges,
}

#[derive(Deserialize)]
struct RotateParts {
    rotations: Vec<PageRotation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageEditParts {
    base_page: u32,
    #[serde(default)]
    page_ranges: Option<PageRanges>,
}

#[derive(Deserialize)]
struct InsertParts {
    insertions: Vec<PageEditParts>,
}

#[derive(Deserialize)]
struct ReplaceParts {
    replacements: Vec<PageEditParts>,
}

#[derive(Deserialize)]
struct PasswordParts {
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SealParts {
    seal_options: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormDataParts {
    json_form_fields_data: Value,
}

fn params<T: DeserializeOwned>(kind: OperationKind, value: Value) -> Result<T> {
    let value = if value.is_null() {
        Value::Object(Default::default())
    } else {
        value
    };
    serde_json::from_value(value)
        .map_err(|e| PdfServicesError::Validation(format!("invalid {} parameters: {}", kind, e)))
}

fn expect_inputs(kind: OperationKind, inputs: &[AssetRef], min: usize, max: usize) -> Result<()> {
    let n = inputs.len();
    if n < min || n > max {
        let expected = if min == max {
            min.to_string()
        } else if max == usize::MAX {
            format!("at least {}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(PdfServicesError::Validation(format!(
            "{} expects {} input file(s), got {}",
            kind, expected, n
        )));
    }
    Ok(())
}

fn next_input(kind: OperationKind, inputs: &mut std::vec::IntoIter<AssetRef>) -> Result<AssetRef> {
    inputs.next().ok_or_else(|| {
        PdfServicesError::Validation(format!("{} is missing an input file", kind))
    })
}

fn cloud(kind: OperationKind, input: AssetRef) -> Result<Asset> {
    match input {
        AssetRef::Cloud(asset) => Ok(asset),
        AssetRef::External(_) => Err(PdfServicesError::Validation(format!(
            "{} does not support external storage inputs",
            kind
        ))),
    }
}

impl Operation {
    /// Builds an operation from `(kind, inputs, params)`. Inputs are taken in
    /// role order: for watermark `[document, watermark]`, for electronic seal
    /// `[document, seal image?]`, for insert/replace `[base, pages...]`
    /// aligned with the `insertions`/`replacements` parameter list.
    pub fn from_parts(kind: OperationKind, inputs: Vec<AssetRef>, value: Value) -> Result<Operation> {
        use OperationKind as K;

        let single = |inputs: Vec<AssetRef>| -> Result<AssetRef> {
            expect_inputs(kind, &inputs, 1, 1)?;
            next_input(kind, &mut inputs.into_iter())
        };

        let operation = match kind {
            K::CreatePdf => Operation::CreatePdf { input: single(inputs)?, params: params(kind, value)? },
            K::HtmlToPdf => Operation::HtmlToPdf { input: single(inputs)?, params: params(kind, value)? },
            K::ExportPdf => Operation::ExportPdf { input: single(inputs)?, params: params(kind, value)? },
            K::ExportPdfToImages => Operation::ExportPdfToImages {
                input: single(inputs)?,
                params: params(kind, value)?,
            },
            K::Combine => {
                expect_inputs(kind, &inputs, 2, usize::MAX)?;
                let parts: CombineParts = params(kind, value)?;
                if parts.page_ranges.len() > inputs.len() {
                    return Err(PdfServicesError::Validation(
                        "combine has more page range entries than input files".to_string(),
                    ));
                }
                let mut ranges = parts.page_ranges.into_iter();
                let inputs = inputs
                    .into_iter()
                    .map(|input| {
                        Ok(CombineInput {
                            asset: cloud(kind, input)?,
                            page_ranges: ranges.next().flatten(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Operation::Combine { inputs }
            }
            K::Split => Operation::Split { input: single(inputs)?, option: params(kind, value)? },
            K::DeletePages => {
                let parts: PageRangesParts = params(kind, value)?;
                Operation::DeletePages { input: single(inputs)?, page_ranges: parts.page_ranges }
            }
            K::RotatePages => {
                let parts: RotateParts = params(kind, value)?;
                Operation::RotatePages { input: single(inputs)?, rotations: parts.rotations }
            }
            K::InsertPages | K::ReplacePages => {
                expect_inputs(kind, &inputs, 2, usize::MAX)?;
                let edits = if kind == K::InsertPages {
                    params::<InsertParts>(kind, value)?.insertions
                } else {
                    params::<ReplaceParts>(kind, value)?.replacements
                };
                if edits.len() != inputs.len() - 1 {
                    return Err(PdfServicesError::Validation(format!(
                        "{} needs one page edit per input after the base document ({} edits, {} inputs)",
                        kind,
                        edits.len(),
                        inputs.len() - 1
                    )));
                }
                let mut inputs = inputs.into_iter();
                let base = cloud(kind, next_input(kind, &mut inputs)?)?;
                let pairs = inputs
                    .zip(edits)
                    .map(|(input, edit)| Ok((cloud(kind, input)?, edit)))
                    .collect::<Result<Vec<_>>>()?;
                if kind == K::InsertPages {
                    let insertions = pairs
                        .into_iter()
                        .map(|(asset, edit)| PageInsertion {
                            asset,
                            page_ranges: edit.page_ranges,
                            base_page: edit.base_page,
                        })
                        .collect();
                    Operation::InsertPages { base, insertions }
                } else {
                    let replacements = pairs
                        .into_iter()
                        .map(|(asset, edit)| PageReplacement {
                            asset,
                            page_ranges: edit.page_ranges,
                            base_page: edit.base_page,
                        })
                        .collect();
                    Operation::ReplacePages { base, replacements }
                }
            }
            K::ReorderPages => {
                let parts: PageRangesParts = params(kind, value)?;
                Operation::ReorderPages {
                    input: cloud(kind, single(inputs)?)?,
                    page_order: parts.page_ranges,
                }
            }
            K::Compress => Operation::Compress { input: single(inputs)?, params: params(kind, value)? },
            K::Linearize => Operation::Linearize { input: single(inputs)? },
            K::Ocr => Operation::Ocr { input: single(inputs)?, params: params(kind, value)? },
            K::Protect => Operation::Protect { input: single(inputs)?, params: params(kind, value)? },
            K::RemoveProtection => {
                let parts: PasswordParts = params(kind, value)?;
                Operation::RemoveProtection { input: single(inputs)?, password: parts.password }
            }
            K::Watermark => {
                expect_inputs(kind, &inputs, 2, 2)?;
                let mut inputs = inputs.into_iter();
                let input = cloud(kind, next_input(kind, &mut inputs)?)?;
                let watermark = cloud(kind, next_input(kind, &mut inputs)?)?;
                Operation::Watermark { input, watermark, params: params(kind, value)? }
            }
            K::Autotag => Operation::Autotag { input: single(inputs)?, params: params(kind, value)? },
            K::Extract => Operation::Extract { input: single(inputs)?, params: params(kind, value)? },
            K::Properties => Operation::Properties { input: single(inputs)?, params: params(kind, value)? },
            K::ElectronicSeal => {
                expect_inputs(kind, &inputs, 1, 2)?;
                let parts: SealParts = params(kind, value)?;
                let mut inputs = inputs.into_iter();
                let input = cloud(kind, next_input(kind, &mut inputs)?)?;
                let seal_image = inputs.next().map(|i| cloud(kind, i)).transpose()?;
                Operation::ElectronicSeal { input, seal_image, seal_options: parts.seal_options }
            }
            K::AccessibilityCheck => Operation::AccessibilityCheck {
                input: single(inputs)?,
                params: params(kind, value)?,
            },
            K::ImportFormData => {
                let parts: FormDataParts = params(kind, value)?;
                Operation::ImportFormData { input: single(inputs)?, form_data: parts.json_form_fields_data }
            }
        };

        Ok(operation)
    }
}
