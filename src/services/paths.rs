use std::path::PathBuf;

use crate::services::config::ClientConfig;

const SAVEDATA_DIR_NAME: &str = "savedata";

fn exe_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(|p| p.to_path_buf())
}

/// Resolve and create the application's data directory.
///
/// `DASHBOARD_DATA_DIR` wins; otherwise `<exe_dir>/savedata`.
pub(crate) fn data_dir(config: &ClientConfig) -> Result<PathBuf, String> {
    let dir = match config.data_dir.clone() {
        Some(dir) => dir,
        None => exe_dir()
            .ok_or_else(|| "Failed to resolve executable directory".to_string())?
            .join(SAVEDATA_DIR_NAME),
    };

    std::fs::create_dir_all(&dir).map_err(|e| format!("Failed to create data directory: {e}"))?;
    Ok(dir)
}
