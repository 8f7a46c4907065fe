use std::path::Path;

/// Extensions offered by the file picker. Not a security boundary; the
/// backend validates again.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[
    "xlsx", "xls", "csv", "json", "txt", "png", "jpg", "jpeg", "gif", "bmp",
];

/// Lower-cased extension without the dot, or an empty string.
pub fn file_type(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn is_accepted(name: &str) -> bool {
    let ext = file_type(name);
    ACCEPTED_EXTENSIONS.contains(&ext.as_str())
}

pub(crate) fn mime_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Where the backend stores an upload; matches the paths it reports back.
pub fn staged_path(conversation_id: &str, name: &str) -> String {
    format!("uploads/{conversation_id}/{name}")
}
