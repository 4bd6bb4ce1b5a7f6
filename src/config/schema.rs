//! `stic.toml` schema

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::palette::{is_color, DEFAULT_CARD_COLOR};

/// Largest PNG scale factor accepted.
pub const MAX_SCALE: u32 = 16;

/// Project metadata section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default)]
    pub name: String,
    /// Card catalog file, relative to the config file
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

/// Fallbacks for card data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Native color of catalog cards and empty GRAM slots
    #[serde(default = "default_card_color")]
    pub card_color: u8,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { card_color: default_card_color() }
    }
}

fn default_card_color() -> u8 {
    DEFAULT_CARD_COLOR
}

/// PNG export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Integer scale factor
    #[serde(default = "default_scale")]
    pub scale: u32,
    /// Treat warnings as errors
    #[serde(default)]
    pub strict: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { scale: default_scale(), strict: false }
    }
}

fn default_scale() -> u32 {
    3
}

/// Complete stic.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SticConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "render.scale")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stic.toml: '{}' {}", self.field, self.message)
    }
}

impl SticConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: &str| {
            errors.push(ConfigValidationError {
                field: field.to_string(),
                message: message.to_string(),
            });
        };

        if !is_color(self.defaults.card_color) {
            push("defaults.card_color", "must be a palette index 0-15");
        }
        if self.render.scale == 0 || self.render.scale > MAX_SCALE {
            push("render.scale", "must be between 1 and 16");
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parse() {
        let config: SticConfig = toml::from_str("").unwrap();
        assert_eq!(config, SticConfig::default());
        assert_eq!(config.defaults.card_color, 7);
        assert_eq!(config.render.scale, 3);
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[project]
name = "demo"
catalog = "GROM.json"

[defaults]
card_color = 5

[render]
scale = 4
strict = true
"#;
        let config: SticConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.project.name, "demo");
        assert_eq!(config.project.catalog, Some(PathBuf::from("GROM.json")));
        assert_eq!(config.defaults.card_color, 5);
        assert_eq!(config.render.scale, 4);
        assert!(config.render.strict);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<SticConfig, _> = toml::from_str("[render]\nscael = 2\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = SticConfig::default();
        config.defaults.card_color = 16;
        config.render.scale = 17;
        let errors = config.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["defaults.card_color", "render.scale"]);
        assert!(errors[0].to_string().starts_with("stic.toml: 'defaults.card_color'"));
    }
}
