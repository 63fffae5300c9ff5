//! Environment/runtime helpers
//!
//! Sanity checks to ensure the store file can be created at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the directory that will hold `file_path` exists.
pub async fn ensure_parent_dir(file_path: &str) -> anyhow::Result<()> {
    let parent = match Path::new(file_path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(()),
    };
    if tokio::fs::metadata(parent).await.is_ok() {
        return Ok(());
    }
    warn!(dir = %parent.display(), "store directory not found; creating it");
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    info!(dir = %parent.display(), "store directory created");
    Ok(())
}
