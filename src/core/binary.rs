//! Locating the cass binary
//!
//! Resolution order: explicit path (config or `CASS_BINARY`), then the
//! usual install locations, then `PATH`. A missing binary is not fatal:
//! the fallback path is used and the first invocation reports the error.

use crate::core::error::{CassError, Result};
use std::path::{Path, PathBuf};

/// Path used when nothing executable was found
pub const FALLBACK_BINARY: &str = "/app/cass";

/// Fixed install locations checked after the explicit override
fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("/app/cass"),
        PathBuf::from("./cass"),
        PathBuf::from("../target/release/cass"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".cargo/bin/cass"));
    }
    candidates
}

/// Check that `path` is a regular file we can execute
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = path.metadata() else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

/// Find the cass binary
pub fn locate_binary(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if is_executable(path) {
            return Ok(path.to_path_buf());
        }
        tracing::warn!("Configured cass binary {:?} is not executable", path);
    }

    if let Some(found) = candidate_paths().into_iter().find(|p| is_executable(p)) {
        return Ok(found);
    }

    which::which("cass").map_err(|_| {
        CassError::BinaryNotFound(
            "set CASS_BINARY or ensure cass is in PATH".to_string(),
        )
    })
}

/// Find the cass binary, falling back to `/app/cass` with a warning
pub fn resolve_binary(explicit: Option<&Path>) -> PathBuf {
    match locate_binary(explicit) {
        Ok(path) => {
            tracing::info!("Found cass binary at: {:?}", path);
            path
        }
        Err(e) => {
            tracing::warn!("cass binary not found at startup: {}", e);
            PathBuf::from(FALLBACK_BINARY)
        }
    }
}
