//! Engine configuration loader.

use std::path::Path;

use action_core::EngineConfig;

use crate::loaders::{LoadResult, read_file};

const EMBEDDED_ENGINE: &str = include_str!("../../data/engine.toml");

/// Loader for engine configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`EngineConfig::default`].
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))
    }

    /// The engine config shipped with the default catalog.
    pub fn embedded() -> LoadResult<EngineConfig> {
        Self::parse(EMBEDDED_ENGINE)
    }

    pub fn parse(content: &str) -> LoadResult<EngineConfig> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse engine config TOML: {}", e))?;

        if config.max_queue_time_depth < 0.0 || config.anticipation_timeout <= 0.0 {
            anyhow::bail!(
                "Engine config timings must be positive (queue depth {}, anticipation timeout {})",
                config.max_queue_time_depth,
                config.anticipation_timeout
            );
        }
        Ok(config)
    }
}
