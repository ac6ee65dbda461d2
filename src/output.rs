//! Saving job outputs to disk.

use crate::asset::{extension_for_media_type, StreamAsset};
use crate::job::JobResult;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Directory for the outputs of job `name`: `<out_dir>/<name>/`. Always a
/// direct child of `out_dir`.
pub fn job_dir(out_dir: &Path, name: &str) -> PathBuf {
    let mut safe: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect();
    if safe.is_empty() || safe.starts_with('.') {
        safe.insert(0, '_');
    }
    out_dir.join(safe)
}

/// `<stamp>-<role>.<ext>`, so reruns never overwrite earlier outputs.
pub fn output_file_name(stamp: &DateTime<Local>, role: &str, media_type: &str) -> String {
    format!(
        "{}-{}.{}",
        stamp.format("%Y-%m-%dT%H-%M-%S"),
        role,
        extension_for_media_type(media_type)
    )
}

/// Writes downloaded outputs and any result metadata. Returns the written paths.
pub async fn save_outputs(
    out_dir: &Path,
    name: &str,
    outputs: &[(String, StreamAsset)],
    result: &JobResult,
) -> std::io::Result<Vec<PathBuf>> {
    let dir = job_dir(out_dir, name);
    let stamp = Local::now();
    let mut written = Vec::new();

    for (role, content) in outputs {
        let path = dir.join(output_file_name(&stamp, role, &content.media_type));
        content
            .save_as(&path)
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        written.push(path);
    }

    if let Some(metadata) = result.metadata() {
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}-metadata.json", stamp.format("%Y-%m-%dT%H-%M-%S")));
        let json = serde_json::to_vec_pretty(metadata)?;
        tokio::fs::write(&path, json).await?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::media_type;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_file_names() {
        let stamp = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(output_file_name(&stamp, "output", media_type::PDF), "2024-03-09T14-05-07-output.pdf");
        assert_eq!(output_file_name(&stamp, "part-1", "application/x-unknown"), "2024-03-09T14-05-07-part-1.bin");
        assert_eq!(job_dir(Path::new("out"), "q1 report/v2"), Path::new("out").join("q1_report_v2"));
        assert_eq!(job_dir(Path::new("out"), "v1.2"), Path::new("out").join("v1.2"));
    }

    #[test]
    fn test_job_dir_stays_inside_out_dir() {
        let out = Path::new("out");
        assert_eq!(job_dir(out, ".."), out.join("_.."));
        assert_eq!(job_dir(out, "."), out.join("_."));
        assert_eq!(job_dir(out, ".hidden"), out.join("_.hidden"));
        assert_eq!(job_dir(out, "../../etc"), out.join("_.._.._etc"));
        assert_eq!(job_dir(out, ""), out.join("_"));
    }

    #[tokio::test]
    async fn test_save_outputs_and_metadata() {
        let dir = tempdir().unwrap();
        let outputs = vec![(
            "output".to_string(),
            StreamAsset { content: b"%PDF".to_vec(), media_type: media_type::PDF.to_string() },
        )];
        let result: JobResult =
            serde_json::from_value(serde_json::json!({"metadata": {"pageCount": 3}})).unwrap();

        let written = save_outputs(dir.path(), "props", &outputs, &result).await.unwrap();

        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|p| p.starts_with(dir.path().join("props"))));
        assert_eq!(std::fs::read(&written[0]).unwrap(), b"%PDF");
        let metadata: serde_json::Value = serde_json::from_slice(&std::fs::read(&written[1]).unwrap()).unwrap();
        assert_eq!(metadata["pageCount"], 3);
    }
}
