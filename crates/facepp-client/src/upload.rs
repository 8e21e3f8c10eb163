//! Local-file upload handles.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ApiError;

/// Maximum upload size accepted by the API: 2 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// A local file destined for a multipart upload.
///
/// The size cap is enforced when content is requested, from a stat,
/// before the file is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    path: PathBuf,
}

impl UploadFile {
    /// Wrap a filesystem path. No I/O happens until [`content`](Self::content).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The wrapped path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base filename, used as the multipart part filename.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Read the full file content.
    ///
    /// Fails with [`ApiError::FileTooLarge`] if the file exceeds
    /// [`MAX_UPLOAD_BYTES`] at stat time; exactly 2 MiB is allowed.
    pub fn content(&self) -> Result<Vec<u8>, ApiError> {
        let size = fs::metadata(&self.path)?.len();
        if size > MAX_UPLOAD_BYTES {
            return Err(ApiError::FileTooLarge {
                path: self.path.display().to_string(),
                size,
            });
        }
        Ok(fs::read(&self.path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file_of_size(size: u64) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        file.as_file().set_len(size).unwrap();
        file
    }

    #[test]
    fn exactly_at_cap_is_allowed() {
        let file = file_of_size(MAX_UPLOAD_BYTES);
        let content = UploadFile::new(file.path()).content().unwrap();
        assert_eq!(content.len() as u64, MAX_UPLOAD_BYTES);
    }

    #[test]
    fn one_byte_over_cap_is_rejected() {
        let file = file_of_size(MAX_UPLOAD_BYTES + 1);
        let err = UploadFile::new(file.path()).content().unwrap_err();
        match err {
            ApiError::FileTooLarge { size, .. } => assert_eq!(size, MAX_UPLOAD_BYTES + 1),
            other => panic!("expected FileTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn reads_content_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"fake image bytes").unwrap();
        let content = UploadFile::new(file.path()).content().unwrap();
        assert_eq!(content, b"fake image bytes");
    }

    #[test]
    fn file_name_is_final_component() {
        let upload = UploadFile::new("/tmp/photos/face.jpg");
        assert_eq!(upload.file_name(), "face.jpg");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = UploadFile::new("/nonexistent/face.jpg").content().unwrap_err();
        assert!(matches!(err, ApiError::Io(_)));
    }
}
