//! Storage abstractions for service layer
//!
//! File-backed persistence of the user store. Reads fail open by default;
//! writes go through a temp file that is renamed over the target.

pub mod user_file_store;

pub use user_file_store::UserFileStore;
