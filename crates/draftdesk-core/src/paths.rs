use crate::error::{DeskError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DATA_DIR_NAME: &str = ".draftdesk";
pub const CONFIG_FILE: &str = "config.yaml";
pub const SESSIONS_DIR: &str = "sessions";
pub const CACHE_DIR: &str = "cache";
pub const DEFAULT_SESSION: &str = "default";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Resolve the data directory.
///
/// Priority:
/// 1. `explicit` (the `--data-dir` flag or `DRAFTDESK_HOME`)
/// 2. `~/.draftdesk`
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    let home = home::home_dir().ok_or(DeskError::HomeNotFound)?;
    Ok(home.join(DATA_DIR_NAME))
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

pub fn sessions_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSIONS_DIR)
}

/// Where fetched catalogs are kept between runs.
pub fn cache_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(CACHE_DIR)
}

pub fn session_file(sessions_dir: &Path, session_id: &str) -> PathBuf {
    sessions_dir.join(format!("{session_id}.json"))
}

// ---------------------------------------------------------------------------
// Session id validation
// ---------------------------------------------------------------------------

/// Session ids become file names, so only a conservative alphabet is allowed.
pub fn validate_session_id(id: &str) -> Result<()> {
    let ok = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !ok {
        return Err(DeskError::user_input(format!(
            "invalid session id '{id}': use letters, digits, '-' or '_'"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
