//! Validation and persistence of accepted submissions.

use std::io;
use std::path::PathBuf;

use tracing::info;

use super::Submission;
use crate::config::StorageConfig;
use crate::error::SubmissionError;
use crate::sink::{EventSink, Severity};

/// Message reported when the provider fails without explaining why.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Create the upload directory if it does not exist yet.
pub async fn ensure_upload_dir(storage: &StorageConfig) -> io::Result<()> {
    tokio::fs::create_dir_all(&storage.upload_dir).await?;
    info!(upload_dir = %storage.upload_dir.display(), "upload_dir_ready");
    Ok(())
}

/// Validate a submission and save its image.
///
/// Checks run in order: the provider status must be `"200"`, then the image
/// part must carry a non-empty filename. The image overwrites the fixed
/// saved-image path. Concurrent writers are not serialized.
pub async fn process_submission(
    submission: Submission,
    storage: &StorageConfig,
    sink: &dyn EventSink,
) -> Result<PathBuf, SubmissionError> {
    if !submission.is_success() {
        let message = submission
            .img_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        return Err(SubmissionError::UpstreamReportedFailure(message));
    }

    let image = match submission.res_image {
        Some(image) if !image.file_name.is_empty() => image,
        _ => return Err(SubmissionError::InvalidFile),
    };

    let path = storage.saved_image_path();
    tokio::fs::write(&path, &image.bytes)
        .await
        .map_err(|source| SubmissionError::Storage {
            path: path.clone(),
            source,
        })?;

    if submission.id_gen.is_none() || submission.time_gen.is_none() {
        sink.emit(Severity::Warn, "id_gen or time_gen not provided");
    }

    sink.emit(
        Severity::Info,
        &format!(
            "image saved: ID: {}, Time: {}",
            submission.id_gen.as_deref().unwrap_or_default(),
            submission.time_gen.as_deref().unwrap_or_default(),
        ),
    );

    Ok(path)
}

/// Single reporting point for content-level failures.
pub fn report_error(sink: &dyn EventSink, err: &SubmissionError) {
    sink.emit(Severity::Error, &err.to_string());
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use tempfile::TempDir;

    use super::*;
    use crate::sink::MemorySink;
    use crate::submission::UploadedImage;

    fn storage(dir: &TempDir) -> StorageConfig {
        StorageConfig {
            upload_dir: dir.path().to_path_buf(),
            max_upload_bytes: 1024,
        }
    }

    fn ok_submission(file_name: &str) -> Submission {
        Submission {
            status: Some("200".to_string()),
            id_gen: Some("gen-42".to_string()),
            time_gen: Some("3.2".to_string()),
            img_message: None,
            res_image: Some(UploadedImage {
                file_name: file_name.to_string(),
                content_type: Some("image/png".to_string()),
                bytes: Bytes::from_static(b"png-bytes"),
            }),
        }
    }

    #[tokio::test]
    async fn test_successful_submission_overwrites_saved_image() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        std::fs::write(storage.saved_image_path(), b"old").unwrap();
        let sink = MemorySink::new();

        let path = process_submission(ok_submission("result.png"), &storage, &sink)
            .await
            .unwrap();

        assert_eq!(path, storage.saved_image_path());
        assert_eq!(std::fs::read(&path).unwrap(), b"png-bytes");
        assert_eq!(
            sink.messages(Severity::Info),
            vec!["image saved: ID: gen-42, Time: 3.2".to_string()]
        );
        assert!(sink.messages(Severity::Error).is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_uses_img_message() {
        let dir = TempDir::new().unwrap();
        let submission = Submission {
            status: Some("500".to_string()),
            img_message: Some("no face detected".to_string()),
            ..ok_submission("result.png")
        };

        let err = process_submission(submission, &storage(&dir), &MemorySink::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::UpstreamReportedFailure(ref m) if m == "no face detected"));
        assert!(!storage(&dir).saved_image_path().exists());
    }

    #[tokio::test]
    async fn test_upstream_failure_defaults_message() {
        let dir = TempDir::new().unwrap();
        let submission = Submission {
            status: None,
            ..ok_submission("result.png")
        };

        let err = process_submission(submission, &storage(&dir), &MemorySink::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), UNKNOWN_ERROR);
    }

    #[tokio::test]
    async fn test_empty_filename_is_invalid() {
        let dir = TempDir::new().unwrap();
        let sink = MemorySink::new();

        let err = process_submission(ok_submission(""), &storage(&dir), &sink)
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::InvalidFile));
        assert!(!storage(&dir).saved_image_path().exists());
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_missing_upload_dir_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let storage = StorageConfig {
            upload_dir: dir.path().join("missing"),
            max_upload_bytes: 1024,
        };

        let err = process_submission(ok_submission("result.png"), &storage, &MemorySink::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_missing_ids_warns() {
        let dir = TempDir::new().unwrap();
        let sink = MemorySink::new();
        let submission = Submission {
            id_gen: None,
            ..ok_submission("result.png")
        };

        process_submission(submission, &storage(&dir), &sink).await.unwrap();

        assert_eq!(sink.messages(Severity::Warn).len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_upload_dir_creates_nested() {
        let dir = TempDir::new().unwrap();
        let storage = StorageConfig {
            upload_dir: dir.path().join("a").join("uploads"),
            max_upload_bytes: 1024,
        };

        ensure_upload_dir(&storage).await.unwrap();
        ensure_upload_dir(&storage).await.unwrap();

        assert!(storage.upload_dir.is_dir());
    }

    #[test]
    fn test_report_error_emits_error() {
        let sink = MemorySink::new();
        report_error(&sink, &SubmissionError::InvalidFile);
        assert_eq!(sink.messages(Severity::Error), vec!["resImage is not a file".to_string()]);
    }
}
