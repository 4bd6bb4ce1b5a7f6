//! Configuration for the `stic` tool
//!
//! Provides types, discovery and loading for `stic.toml`.

pub mod loader;
pub mod schema;

pub use loader::{
    find_config, find_config_from, load_config, merge_cli_overrides, project_root, resolve_path,
    CliOverrides, ConfigError, CONFIG_FILE,
};
pub use schema::*;
