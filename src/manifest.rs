//! Job manifests
//!
//! JSON files describing jobs for the command-line runner. A manifest names
//! the operation, its inputs (local files or external-storage references),
//! its parameters and an optional external output.
//!
//! ```json
//! {
//!   "name": "merge-reports",
//!   "operation": "combine",
//!   "inputs": ["q1.pdf", "q2.pdf"],
//!   "params": { "pageRanges": [[{ "start": 1, "end": 3 }]] }
//! }
//! ```

use crate::asset::{AssetRef, ExternalAsset};
use crate::job::JobRequest;
use crate::operation::{Operation, OperationKind};
use crate::service::{PdfServicesApi, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestInput {
    External(ExternalAsset),
    /// Relative paths are resolved against the manifest's directory.
    Local(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobManifest {
    pub name: String,
    pub operation: OperationKind,
    #[serde(default)]
    pub inputs: Vec<ManifestInput>,
    #[serde(default)]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<ExternalAsset>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestFile {
    Batch { jobs: Vec<JobManifest> },
    List(Vec<JobManifest>),
    Single(JobManifest),
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

impl JobManifest {
    /// Loads a single-job manifest.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut manifests = load_manifests(path)?;
        if manifests.len() != 1 {
            return Err(invalid_data(format!(
                "expected one job in the manifest, found {}",
                manifests.len()
            )));
        }
        Ok(manifests.remove(0))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| invalid_data(e.to_string()))?;
        fs::write(path, json)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for input in &mut self.inputs {
            if let ManifestInput::Local(path) = input {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }

    pub fn local_inputs(&self) -> Vec<PathBuf> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                ManifestInput::Local(path) => Some(path.clone()),
                ManifestInput::External(_) => None,
            })
            .collect()
    }

    /// Uploads the local inputs and builds the job request. Uploads run
    /// concurrently; the resulting assets keep their manifest positions.
    pub async fn into_request<S: PdfServicesApi + ?Sized>(&self, service: &S) -> Result<JobRequest> {
        let mut uploaded = service.upload_all(&self.local_inputs()).await?.into_iter();

        let mut inputs = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let asset_ref = match input {
                ManifestInput::External(external) => AssetRef::External(external.clone()),
                ManifestInput::Local(_) => match uploaded.next() {
                    Some(asset) => AssetRef::Cloud(asset),
                    None => break,
                },
            };
            inputs.push(asset_ref);
        }

        let operation = Operation::from_parts(self.operation, inputs, self.params.clone())?;
        let request = JobRequest::new(operation);
        Ok(match &self.output {
            Some(output) => request.with_output(output.clone()),
            None => request,
        })
    }
}

/// Loads every job in a manifest file. The file holds one job, a list of
/// jobs, or an object with a `jobs` list. Job names must be unique.
pub fn load_manifests<P: AsRef<Path>>(path: P) -> io::Result<Vec<JobManifest>> {
    let path = path.as_ref();
    let buf = fs::read(path)?;
    let file: ManifestFile = serde_json::from_slice(&buf)
        .map_err(|e| invalid_data(format!("{}: {}", path.display(), e)))?;

    let mut manifests = match file {
        ManifestFile::Batch { jobs } => jobs,
        ManifestFile::List(jobs) => jobs,
        ManifestFile::Single(job) => vec![job],
    };

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mut names = HashSet::new();
    for manifest in &mut manifests {
        if manifest.name.trim().is_empty() {
            return Err(invalid_data("job name must not be empty".to_string()));
        }
        if !names.insert(manifest.name.clone()) {
            return Err(invalid_data(format!("duplicate job name `{}`", manifest.name)));
        }
        manifest.resolve_paths(base);
    }
    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Asset, ExternalStorageType};
    use crate::operation::params::CombineInput;
    use crate::service::scripted::ScriptedService;
    use crate::service::PdfServicesError;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_single_manifest_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "job.json",
            r#"{
                "name": "merge",
                "operation": "combine",
                "inputs": ["a.pdf", "/abs/b.pdf", {"uri": "https://bucket.example/c.pdf", "storage": "S3"}]
            }"#,
        );

        let manifest = JobManifest::load_from_file(&path).unwrap();
        assert_eq!(manifest.operation, OperationKind::Combine);
        assert_eq!(
            manifest.local_inputs(),
            vec![dir.path().join("a.pdf"), PathBuf::from("/abs/b.pdf")]
        );
        assert_eq!(
            manifest.inputs[2],
            ManifestInput::External(ExternalAsset::new("https://bucket.example/c.pdf", ExternalStorageType::S3))
        );
        assert!(manifest.params.is_null());
    }

    #[test]
    fn test_load_batch_forms() {
        let dir = tempdir().unwrap();
        let listed = write(
            dir.path(),
            "list.json",
            r#"[{"name": "a", "operation": "linearize", "inputs": ["a.pdf"]},
                {"name": "b", "operation": "ocr", "inputs": ["b.pdf"]}]"#,
        );
        let wrapped = write(
            dir.path(),
            "wrapped.json",
            r#"{"jobs": [{"name": "a", "operation": "compress", "inputs": ["a.pdf"], "params": {"compressionLevel": "HIGH"}}]}"#,
        );

        let names: Vec<String> = load_manifests(&listed).unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(load_manifests(&wrapped).unwrap()[0].operation, OperationKind::Compress);
    }

    #[test]
    fn test_load_rejects_bad_manifests() {
        let dir = tempdir().unwrap();
        let duplicate = write(
            dir.path(),
            "dup.json",
            r#"[{"name": "a", "operation": "linearize"}, {"name": "a", "operation": "ocr"}]"#,
        );
        let unknown = write(dir.path(), "unknown.json", r#"{"name": "a", "operation": "teleport"}"#);
        let unnamed = write(dir.path(), "unnamed.json", r#"{"name": " ", "operation": "ocr"}"#);

        assert!(load_manifests(&duplicate).is_err());
        assert!(load_manifests(&unknown).is_err());
        assert!(load_manifests(&unnamed).is_err());
        assert!(JobManifest::load_from_file(&duplicate).is_err());
        assert!(load_manifests(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let manifest = JobManifest {
            name: "protect".to_string(),
            operation: OperationKind::Protect,
            inputs: vec![ManifestInput::Local(dir.path().join("in.pdf"))],
            params: serde_json::json!({
                "passwordProtection": {"userPassword": "open"},
                "encryptionAlgorithm": "AES_256"
            }),
            output: None,
        };
        let path = dir.path().join("protect.json");
        manifest.save_to_file(&path).unwrap();

        assert_eq!(JobManifest::load_from_file(&path).unwrap(), manifest);
    }

    #[tokio::test]
    async fn test_into_request_uploads_locals_in_order() {
        let dir = tempdir().unwrap();
        write(dir.path(), "first.pdf", "first");
        write(dir.path(), "second.pdf", "second");
        let path = write(
            dir.path(),
            "job.json",
            r#"{"name": "merge", "operation": "combine", "inputs": ["first.pdf", "second.pdf"]}"#,
        );

        let service = ScriptedService::new();
        let request = JobManifest::load_from_file(&path).unwrap().into_request(&service).await.unwrap();

        match request.operation() {
            Operation::Combine { inputs } => {
                let ids: Vec<&str> = inputs.iter().map(|i: &CombineInput| i.asset.asset_id.as_str()).collect();
                assert_eq!(ids, vec!["blob-0", "blob-1"]);
            }
            other => panic!("unexpected operation {:?}", other),
        }
        let first = service.download(&Asset::new("blob-0")).await.unwrap();
        assert_eq!(first.content, b"first");
    }

    #[tokio::test]
    async fn test_into_request_with_external_input_and_output() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "job.json",
            r#"{
                "name": "ocr-remote",
                "operation": "ocr",
                "inputs": [{"uri": "https://bucket.example/scan.pdf", "storage": "DROPBOX"}],
                "params": {"ocrLang": "de-DE"},
                "output": {"uri": "https://bucket.example/scan-ocr.pdf", "storage": "DROPBOX"}
            }"#,
        );

        let service = ScriptedService::new();
        let request = JobManifest::load_from_file(&path).unwrap().into_request(&service).await.unwrap();

        assert!(request.output().is_some());
        assert!(request.operation().inputs()[0].is_external());
        assert!(request.validate().is_ok());
    }

    #[tokio::test]
    async fn test_into_request_with_wrong_input_count() {
        let dir = tempdir().unwrap();
        write(dir.path(), "only.pdf", "x");
        let path = write(
            dir.path(),
            "job.json",
            r#"{"name": "wm", "operation": "watermark", "inputs": ["only.pdf"]}"#,
        );

        let service = ScriptedService::new();
        let err = JobManifest::load_from_file(&path).unwrap().into_request(&service).await.unwrap_err();
        assert!(matches!(err, PdfServicesError::Validation(_)));
    }
}
