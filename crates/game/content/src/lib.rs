//! Data-driven action content and loaders.
//!
//! This crate provides loaders for RON/TOML data files:
//! - Action catalogs (data-driven via RON)
//! - Engine configuration (data-driven via TOML)
//!
//! A default catalog and engine config are embedded in the binary so hosts
//! can start without any files on disk. Content is consumed by the players
//! through [`action_core::ActionOracle`] and never appears in replicated state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ActionCatalog, ConfigLoader, LoadResult};
