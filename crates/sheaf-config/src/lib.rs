//! Configuration management for sheaf.
//!
//! Parses `sheaf.toml` with serde and discovers it in the current directory or
//! its parents. CLI settings are applied on top via [`CliSettings`].
//!
//! ```toml
//! [render]
//! mode = "server"          # or "interactive"
//! production = false
//! parallel = true
//! max_depth = 256
//! affordance = ["header", "sub_header"]   # or true / false
//! hidden = ["front-matter"]
//!
//! [diagrams]
//! enabled = true
//! priority = 25
//! languages = ["mermaid", "plantuml"]
//! placeholder = "source"   # or "skeleton"
//!
//! [links]
//! wikilinks = true
//! hashtags = true
//! wikilink_base = "${SHEAF_SITE:-}/wiki/"
//! hashtag_base = "/tags/"
//! priority = 50
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `links.wikilink_base` and `links.hashtag_base` support `${VAR}` (error if
//! unset) and `${VAR:-default}`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "sheaf.toml";

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub mode: Option<RenderModeSetting>,
    pub production: Option<bool>,
    pub parallel: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub render: RenderConfig,
    pub diagrams: DiagramsConfig,
    pub links: LinksConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// How the document is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderModeSetting {
    #[default]
    Server,
    Interactive,
}

/// `affordance = true` / `false`, or a list of type tags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AffordanceSetting {
    Enabled(bool),
    Types(Vec<String>),
}

impl Default for AffordanceSetting {
    fn default() -> Self {
        Self::Enabled(false)
    }
}

/// `[render]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub mode: RenderModeSetting,
    /// Hide unknown-block placeholders.
    pub production: bool,
    /// Render sibling subtrees in parallel.
    pub parallel: bool,
    pub max_depth: usize,
    pub affordance: AffordanceSetting,
    /// Node ids that never render.
    pub hidden: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderModeSetting::default(),
            production: false,
            parallel: false,
            max_depth: 256,
            affordance: AffordanceSetting::default(),
            hidden: Vec::new(),
        }
    }
}

/// What a diagram shows before its renderer has loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderSetting {
    #[default]
    Skeleton,
    Source,
}

/// `[diagrams]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagramsConfig {
    pub enabled: bool,
    pub priority: i32,
    /// Diagram languages to handle. `None` handles every supported language.
    pub languages: Option<Vec<String>>,
    pub placeholder: PlaceholderSetting,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: 25,
            languages: None,
            placeholder: PlaceholderSetting::default(),
        }
    }
}

/// `[links]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinksConfig {
    pub wikilinks: bool,
    pub hashtags: bool,
    pub wikilink_base: String,
    pub hashtag_base: String,
    pub priority: i32,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            wikilinks: true,
            hashtags: true,
            wikilink_base: "/".to_owned(),
            hashtag_base: "/tags/".to_owned(),
            priority: 50,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`links.wikilink_base`").
        field: String,
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration with optional CLI settings.
    ///
    /// Loads `config_path` if given, otherwise the nearest `sheaf.toml` in the
    /// current directory or its parents, otherwise defaults. CLI settings are
    /// applied last and take precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, or if reading,
    /// parsing, expansion or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(mode) = settings.mode {
            self.render.mode = mode;
        }
        if let Some(production) = settings.production {
            self.render.production = production;
        }
        if let Some(parallel) = settings.parallel {
            self.render.parallel = parallel;
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values. Called automatically after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.max_depth == 0 {
            return Err(ConfigError::Validation(
                "render.max_depth must be greater than 0".to_owned(),
            ));
        }
        if let AffordanceSetting::Types(types) = &self.render.affordance
            && types.iter().any(String::is_empty)
        {
            return Err(ConfigError::Validation(
                "render.affordance cannot contain an empty type".to_owned(),
            ));
        }
        if let Some(languages) = &self.diagrams.languages
            && languages.is_empty()
        {
            return Err(ConfigError::Validation(
                "diagrams.languages cannot be empty; set diagrams.enabled = false instead"
                    .to_owned(),
            ));
        }
        if self.links.wikilinks {
            require_non_empty(&self.links.wikilink_base, "links.wikilink_base")?;
        }
        if self.links.hashtags {
            require_non_empty(&self.links.hashtag_base, "links.hashtag_base")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.links.wikilink_base =
            expand::expand_env(&self.links.wikilink_base, "links.wikilink_base")?;
        self.links.hashtag_base =
            expand::expand_env(&self.links.hashtag_base, "links.hashtag_base")?;
        Ok(())
    }
}

/// Search for the config file in `start` and its parents.
fn discover_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
