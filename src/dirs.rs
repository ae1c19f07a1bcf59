use std::path::PathBuf;

use anyhow::Context;

/// The directory downloads are written under: the user's choice, or the
/// current working directory.
pub fn get_save_directory(custom_save_directory: Option<PathBuf>) -> Result<PathBuf, anyhow::Error> {
    match custom_save_directory.filter(|path| !path.as_os_str().is_empty()) {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("failed to get current working directory"),
    }
}
