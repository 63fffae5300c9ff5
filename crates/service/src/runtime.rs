//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_store_dir` without depending directly on `common`.

/// Ensure the directory holding the store file exists.
pub async fn ensure_store_dir(store_path: &str) -> anyhow::Result<()> {
    common::env::ensure_parent_dir(store_path).await
}
