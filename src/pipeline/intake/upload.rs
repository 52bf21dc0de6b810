use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use super::format::{extension_of, sanitize_filename, FileKind};

/// Client-facing description of the received file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub original_name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// An uploaded file held in temporary storage for the duration of one request.
///
/// The backing file is removed when the value is dropped, so every exit path
/// of the processing code (success, error, panic) cleans up after itself.
#[derive(Debug)]
pub struct RawUpload {
    file: NamedTempFile,
    original_name: String,
    extension: String,
    mime_type: String,
    size: u64,
}

impl RawUpload {
    /// Write `bytes` to a new temporary file in `dir`. The file keeps the
    /// declared extension so format libraries that sniff by name see it.
    pub fn stage(
        dir: &Path,
        original_name: &str,
        mime_type: Option<&str>,
        bytes: &[u8],
    ) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;

        let original_name = sanitize_filename(original_name);
        let extension = extension_of(&original_name);
        let suffix = if extension.is_empty() {
            String::new()
        } else {
            format!(".{extension}")
        };

        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;

        let mime_type = match mime_type.map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => mime_guess::from_path(&original_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        };

        tracing::debug!(
            name = %original_name,
            size = bytes.len(),
            path = %file.path().display(),
            "Upload staged"
        );

        Ok(Self {
            file,
            original_name,
            extension,
            mime_type,
            size: bytes.len() as u64,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn kind(&self) -> Option<FileKind> {
        FileKind::from_extension(&self.extension)
    }

    pub fn file_info(&self) -> FileInfo {
        FileInfo {
            original_name: self.original_name.clone(),
            size: self.size,
            mime_type: self.mime_type.clone(),
        }
    }

    /// Delete the temporary file now, logging rather than failing on error.
    pub fn discard(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary upload");
        }
    }
}
