//! Storage key derivation for uploaded files

use regex::Regex;
use std::sync::OnceLock;

/// Folder used when the request does not name one
pub const DEFAULT_FOLDER: &str = "uploads";

/// Name used when the upload carries no usable file name
pub const PLACEHOLDER_FILENAME: &str = "file";

/// Lower-case `name` and replace every character outside `[a-z0-9.]` with `-`
pub fn sanitize_filename(name: Option<&str>) -> String {
    static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();
    let regex = UNSAFE_CHARS
        .get_or_init(|| Regex::new(r"[^a-z0-9.]").expect("Failed to compile filename regex"));

    let sanitized = name
        .map(|name| regex.replace_all(&name.to_lowercase(), "-").into_owned())
        .unwrap_or_default();

    if sanitized.is_empty() {
        PLACEHOLDER_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Normalize the destination folder, falling back to `uploads`
pub fn normalize_folder(folder: Option<&str>) -> String {
    let folder = folder.map(|f| f.trim().trim_matches('/')).unwrap_or_default();

    if folder.is_empty() {
        DEFAULT_FOLDER.to_string()
    } else {
        folder.to_string()
    }
}

/// Derive the remote key `folder/sanitizedFilename`
pub fn storage_key(folder: Option<&str>, filename: Option<&str>) -> String {
    format!("{}/{}", normalize_folder(folder), sanitize_filename(filename))
}
