use std::path::Path;

use crate::config::{EXTENSION_CONTENT_TYPES, MAX_UPLOAD_BYTES, SUPPORTED_CONTENT_TYPES};

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Why an upload was refused before any upstream call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("Uploaded file is empty.")]
    EmptyFile,

    #[error("File is {}; limit is {} MB. Please compress or split it.", human_size(.size), .limit / (1024 * 1024))]
    TooLarge { size: usize, limit: usize },

    #[error("Unsupported content type: {0}")]
    UnsupportedType(String),
}

/// Admission check for an upload. Empty files are refused first, then
/// oversized ones, then unsupported content types.
pub fn validate(content_type: &str, byte_length: usize) -> Result<(), UploadRejection> {
    if byte_length == 0 {
        return Err(UploadRejection::EmptyFile);
    }

    if byte_length > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge {
            size: byte_length,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    let normalized = normalize_content_type(content_type);
    if !SUPPORTED_CONTENT_TYPES.contains(&normalized.as_str()) {
        return Err(UploadRejection::UnsupportedType(content_type.to_string()));
    }

    Ok(())
}

/// Lowercases a MIME type and drops any parameters, so
/// `audio/webm;codecs=opus` becomes `audio/webm`.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    let extension = extension.to_ascii_lowercase();
    EXTENSION_CONTENT_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
}

pub fn content_type_for_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(content_type_for_extension)
}

pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let normalized = normalize_content_type(content_type);
    let extension = match normalized.as_str() {
        "audio/mpeg" | "audio/mp3" | "audio/mpeg3" => "mp3",
        "audio/mpg" => "mpg",
        "audio/mpga" => "mpga",
        "audio/mp4" | "video/mp4" => "mp4",
        "audio/m4a" | "audio/x-m4a" => "m4a",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/webm" | "video/webm" => "webm",
        _ => return None,
    };
    Some(extension)
}

/// Picks the content type to validate: the declared one when it is
/// meaningful, otherwise whatever the filename extension implies.
pub fn resolve_content_type(declared: Option<&str>, filename: Option<&str>) -> String {
    if let Some(declared) = declared {
        let normalized = normalize_content_type(declared);
        if !normalized.is_empty() && normalized != FALLBACK_CONTENT_TYPE {
            return normalized;
        }
    }

    filename
        .and_then(|name| content_type_for_path(Path::new(name)))
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}

fn human_size(bytes: &usize) -> String {
    format!("{:.1} MB", *bytes as f64 / (1024.0 * 1024.0))
}
