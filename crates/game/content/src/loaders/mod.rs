//! Content loaders for reading action data from files.
//!
//! Catalogs are RON lists of [`action_core::ActionConfig`]; the engine config
//! is a TOML document of [`action_core::EngineConfig`].

pub mod actions;
pub mod config;

pub use actions::ActionCatalog;
pub use config::ConfigLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
