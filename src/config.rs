use crate::controller::ViewOptions;
use crate::fs::{FileSystem, default_fs};
use crate::model::NodeGroup;
use crate::render::Color;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = ".knotview.toml";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:4567";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LEVEL_SPACING: f32 = 150.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub backend: BackendConfig,
    pub view: ViewOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub url: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    backend: Option<RawBackend>,
    layout: Option<RawLayout>,
    groups: Option<HashMap<String, RawGroupColors>>,
}

#[derive(Debug, Deserialize)]
struct RawBackend {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawLayout {
    level_spacing: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RawGroupColors {
    background: Option<String>,
    border: Option<String>,
    highlight_background: Option<String>,
    highlight_border: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Loads `.knotview.toml` from `dir`, falling back to defaults when it does not exist.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        Self::load_with_fs(dir, default_fs())
    }

    pub fn load_with_fs(dir: &Path, fs: &dyn FileSystem) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILE);

        if !fs.exists(&config_path) {
            return Ok(Self::default());
        }

        let content = fs.read_to_string(&config_path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(b) = raw.backend {
            if let Some(url) = b.url {
                config.backend.url = url;
            }
            if let Some(secs) = b.timeout_secs {
                if secs == 0 {
                    return Err(ConfigError::Invalid(
                        "backend.timeout_secs must be positive".into(),
                    ));
                }
                config.backend.timeout = Duration::from_secs(secs);
            }
        }

        if let Some(spacing) = raw.layout.and_then(|l| l.level_spacing) {
            if !(spacing.is_finite() && spacing > 0.0) {
                return Err(ConfigError::Invalid(
                    "layout.level_spacing must be a positive number".into(),
                ));
            }
            config.view.level_spacing = spacing;
        }

        for (name, raw_colors) in raw.groups.unwrap_or_default() {
            let group = NodeGroup::from_name(&name)
                .ok_or_else(|| ConfigError::Invalid(format!("unknown node group '{}'", name)))?;
            let colors = config.view.style.for_group_mut(group);
            let key = |field: &str| format!("groups.{}.{}", name, field);
            apply_color(&mut colors.background, raw_colors.background, key("background"))?;
            apply_color(&mut colors.border, raw_colors.border, key("border"))?;
            apply_color(
                &mut colors.highlight_background,
                raw_colors.highlight_background,
                key("highlight_background"),
            )?;
            apply_color(
                &mut colors.highlight_border,
                raw_colors.highlight_border,
                key("highlight_border"),
            )?;
        }

        Ok(config)
    }
}

fn apply_color(target: &mut Color, value: Option<String>, key: String) -> Result<(), ConfigError> {
    if let Some(hex) = value {
        *target = Color::from_hex(&hex)
            .ok_or_else(|| ConfigError::Invalid(format!("{} is not a #rrggbb colour: {}", key, hex)))?;
    }
    Ok(())
}

pub fn generate_config_template() -> String {
    format!(
        r##"# knotview configuration

[backend]
# Where the dependency analysis backend listens
url = "{url}"
timeout_secs = {timeout}

[layout]
# Vertical distance between dependency levels
level_spacing = {spacing:.1}

# Override node colours per group (jar, dir, package, class)
# [groups.jar]
# background = "#e7a5ab"
# border = "#555555"
# highlight_background = "#ebb5ba"
# highlight_border = "#000000"
"##,
        url = DEFAULT_BACKEND_URL,
        timeout = DEFAULT_TIMEOUT_SECS,
        spacing = DEFAULT_LEVEL_SPACING,
    )
}
