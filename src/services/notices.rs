//! User-facing texts for synthetic log entries.
//!
//! Every failure caught at a gateway boundary ends up as one of these in the
//! message log. Edit here to change the wording.

use crate::services::api::ApiError;

// ============================================================================
// CHAT
// ============================================================================

pub const CHAT_FAILED: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// Sent in place of an empty message when only files are staged.
pub fn upload_only_placeholder(file_count: usize) -> String {
    format!("I've uploaded {file_count} file(s) for analysis.")
}

// ============================================================================
// UPLOADS
// ============================================================================

pub const UPLOAD_TOO_LARGE: &str = "File is too large. Maximum file size is 100MB.";
pub const UPLOAD_INVALID_FORMAT: &str =
    "Invalid file format. Please upload Excel, CSV, JSON, text or image files.";
pub const UPLOAD_FAILED: &str = "Failed to upload files. Please try again.";

/// Pick the upload failure text for an error.
///
/// Size and format rejections use fixed texts even when the server attached
/// a detail; other server details are shown verbatim.
pub fn upload_failure(err: &ApiError) -> String {
    match err.status() {
        Some(413) => return UPLOAD_TOO_LARGE.to_string(),
        Some(415) => return UPLOAD_INVALID_FORMAT.to_string(),
        _ => {}
    }
    match err.detail() {
        Some(detail) => format!("Upload failed: {detail}"),
        None => UPLOAD_FAILED.to_string(),
    }
}

// ============================================================================
// DASHBOARD JOBS
// ============================================================================

pub const DASHBOARD_START_FAILED: &str =
    "Sorry, I couldn't start creating your dashboard. Please try again.";

/// Used when a completed job carries no response text.
pub const DASHBOARD_READY: &str = "Your Power BI dashboard is ready!";

pub fn job_error(error: Option<&str>) -> String {
    let error = error
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .unwrap_or("Dashboard creation failed");
    format!("Error: {error}")
}
