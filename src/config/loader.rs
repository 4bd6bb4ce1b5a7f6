//! Configuration loading and discovery for `stic.toml`

use super::schema::SticConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name searched for.
pub const CONFIG_FILE: &str = "stic.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse stic.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub catalog: Option<PathBuf>,
    pub scale: Option<u32>,
    pub strict: Option<bool>,
}

/// Find stic.toml by walking up from the current directory, then in
/// `$XDG_CONFIG_HOME/sticsmith/` (or `~/.config/sticsmith/`).
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }
    find_xdg_config()
}

fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("sticsmith").join(CONFIG_FILE);
    config_path.exists().then_some(config_path)
}

/// Find stic.toml by walking up from `start`.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// An explicit path must exist. Without one the file is discovered with
/// [`find_config`]; when nothing is found the defaults are returned. Relative
/// paths inside the file are resolved against its directory.
pub fn load_config(path: Option<&Path>) -> Result<SticConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => {
            log::debug!("no {} found, using defaults", CONFIG_FILE);
            Ok(SticConfig::default())
        }
    }
}

fn load_config_file(path: &Path) -> Result<SticConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: SticConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let (Some(root), Some(catalog)) = (project_root(path), config.project.catalog.as_ref()) {
        config.project.catalog = Some(resolve_path(root, catalog));
    }
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Merge CLI overrides into a configuration. CLI values win.
pub fn merge_cli_overrides(config: &mut SticConfig, overrides: &CliOverrides) {
    if let Some(ref catalog) = overrides.catalog {
        config.project.catalog = Some(catalog.clone());
    }
    if let Some(scale) = overrides.scale {
        config.render.scale = scale;
    }
    if let Some(strict) = overrides.strict {
        config.render.strict = strict;
    }
}

/// Directory containing the config file.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Join a relative path onto `project_root`; absolute paths pass through.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, contents).expect("should write config content");
        path
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(temp.path(), "[project]\nname = \"test\"\n");
        let subdir = temp.path().join("art").join("figures");
        fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_config_from(subdir), Some(config_path.clone()));
        assert_eq!(find_config_from(temp.path().to_path_buf()), Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().unwrap();
        assert_eq!(find_config_from(temp.path().to_path_buf()), None);
    }

    #[test]
    fn test_load_config_resolves_catalog() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            temp.path(),
            "[project]\nname = \"demo\"\ncatalog = \"data/GROM.json\"\n\n[render]\nscale = 2\n",
        );

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.project.name, "demo");
        assert_eq!(config.project.catalog, Some(temp.path().join("data/GROM.json")));
        assert_eq!(config.render.scale, 2);
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(temp.path(), "this is not valid toml {{{");
        assert!(matches!(load_config(Some(&config_path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(temp.path(), "[render]\nscale = 0\n");
        let result = load_config(Some(&config_path));
        match result {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = SticConfig::default();
        let overrides = CliOverrides {
            scale: Some(8),
            strict: Some(true),
            ..Default::default()
        };
        merge_cli_overrides(&mut config, &overrides);
        assert_eq!(config.render.scale, 8);
        assert!(config.render.strict);
        assert_eq!(config.project.catalog, None);
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/project");
        assert_eq!(resolve_path(root, Path::new("/other/path")), PathBuf::from("/other/path"));
        assert_eq!(resolve_path(root, Path::new("GROM.json")), PathBuf::from("/project/GROM.json"));
        assert_eq!(project_root(Path::new("/project/stic.toml")), Some(root));
    }
}
