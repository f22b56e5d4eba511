//! Upload request validation and content fingerprinting.

use std::path::Path;

use bytes::Bytes;
use sha2::{Digest, Sha256};

use modhub_core::config::ModerationConfig;
use modhub_core::error::AppError;
use modhub_entity::file::ModerationMode;

/// Maximum stored file name length.
const MAX_FILENAME_LEN: usize = 255;

/// An upload as received from the transport layer.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Client-supplied file name.
    pub filename: String,
    /// Declared MIME type.
    pub content_type: Option<String>,
    /// File content.
    pub data: Bytes,
    /// Requested moderation mode.
    pub moderation_mode: ModerationMode,
}

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    /// Base name without directory components.
    pub filename: String,
    /// Lowercase extension.
    pub extension: String,
    /// Size in bytes.
    pub size: u64,
    /// Hex SHA-256 of the content.
    pub sha256: String,
}

/// Validates name, extension, and size. Runs before any state is created.
pub fn validate_upload(
    request: &UploadRequest,
    config: &ModerationConfig,
) -> Result<ValidatedUpload, AppError> {
    let filename = sanitize_filename(&request.filename)?;

    let extension = Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| AppError::validation("File has no extension"))?;

    if !config.is_extension_allowed(&extension) {
        return Err(AppError::validation(format!(
            "File type '.{extension}' is not allowed. Allowed: {}",
            config.allowed_extensions.join(", ")
        )));
    }

    let size = request.data.len() as u64;
    if size == 0 {
        return Err(AppError::validation("File is empty"));
    }
    if size > config.max_file_size_bytes {
        return Err(AppError::validation(format!(
            "File is too large: {size} bytes (max {} bytes)",
            config.max_file_size_bytes
        )));
    }

    Ok(ValidatedUpload {
        filename,
        extension,
        size,
        sha256: sha256_hex(&request.data),
    })
}

/// Hex-encoded SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Strips directory components and rejects empty or oversized names.
fn sanitize_filename(raw: &str) -> Result<String, AppError> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(AppError::validation("File name is empty"));
    }
    if name.chars().count() > MAX_FILENAME_LEN {
        return Err(AppError::validation(format!(
            "File name exceeds {MAX_FILENAME_LEN} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(AppError::validation("File name contains control characters"));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modhub_core::ErrorKind;

    fn request(name: &str, size: usize) -> UploadRequest {
        UploadRequest {
            filename: name.to_string(),
            content_type: None,
            data: Bytes::from(vec![7u8; size]),
            moderation_mode: ModerationMode::Manual,
        }
    }

    #[test]
    fn test_accepts_allowed_extension_any_case() {
        let ok = validate_upload(&request("../../Report.DOCX", 4), &ModerationConfig::default())
            .expect("valid");
        assert_eq!(ok.filename, "Report.DOCX");
        assert_eq!(ok.extension, "docx");
        assert_eq!(ok.size, 4);
        assert_eq!(ok.sha256.len(), 64);
    }

    #[test]
    fn test_rejects_bad_extension_size_and_name() {
        let config = ModerationConfig {
            max_file_size_bytes: 8,
            ..ModerationConfig::default()
        };
        for req in [
            request("notes.pdf", 4),
            request("noext", 4),
            request("big.exe", 9),
            request("empty.doc", 0),
            request("dir/", 4),
        ] {
            let err = validate_upload(&req, &config).expect_err("invalid");
            assert_eq!(err.kind, ErrorKind::Validation, "{}", req.filename);
        }
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
