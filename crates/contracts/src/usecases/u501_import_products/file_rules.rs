//! Upload rules checked before anything leaves the browser, and re-checked
//! by the backend on arrival.

use serde::{Deserialize, Serialize};

use super::error::FileSelectionError;

/// 10 MiB
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Accepted suffixes, compared case-insensitively
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".csv", ".xlsx", ".xls"];

/// Value for the `accept` attribute of the file input
pub const ACCEPT_ATTRIBUTE: &str = ".csv,.xlsx,.xls";

/// A file chosen by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: Option<String>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        self.mime_type = (!mime_type.is_empty()).then_some(mime_type);
        self
    }
}

pub fn has_allowed_extension(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Size first, so an oversized file reports the size limit whatever its extension
pub fn validate_upload(name: &str, size: u64) -> Result<(), FileSelectionError> {
    if size > MAX_FILE_SIZE_BYTES {
        return Err(FileSelectionError::too_large(size));
    }
    if !has_allowed_extension(name) {
        return Err(FileSelectionError::UnsupportedExtension {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Holds the currently accepted file and the last rejection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSelector {
    file: Option<SelectedFile>,
    error: Option<FileSelectionError>,
}

impl FileSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept or reject `file`.
    ///
    /// A rejection drops whatever file was accepted before. `None` behaves
    /// like [`FileSelector::clear`].
    pub fn select(
        &mut self,
        file: Option<SelectedFile>,
    ) -> Result<Option<&SelectedFile>, FileSelectionError> {
        let Some(file) = file else {
            self.clear();
            return Ok(None);
        };

        match validate_upload(&file.name, file.size) {
            Ok(()) => {
                self.error = None;
                self.file = Some(file);
                Ok(self.file.as_ref())
            }
            Err(e) => {
                self.file = None;
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub fn clear(&mut self) {
        self.file = None;
        self.error = None;
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn error(&self) -> Option<&FileSelectionError> {
        self.error.as_ref()
    }
}
