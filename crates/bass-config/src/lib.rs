//! Configuration management for Bass.
//!
//! Parses `bass.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Path Expansion
//!
//! The `[paths]` values support `~` and environment variable references
//! (`$VAR`, `${VAR}`) before they are resolved against the directory that
//! contains the config file.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content directory.
    pub input: Option<PathBuf>,
    /// Override output directory.
    pub output: Option<PathBuf>,
    /// Override layout (template) directory.
    pub layout: Option<PathBuf>,
    /// Override URL prefix of generated pages.
    pub root_url: Option<String>,
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "bass.toml";

/// Ignore pattern that is always active: every dotfile and dot-directory.
pub const DEFAULT_IGNORE: &str = ".?*";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteSection,
    /// Project directories (relative strings from TOML).
    paths: PathsConfigRaw,
    /// Tree building settings.
    pub build: BuildConfig,
    /// Development server configuration.
    pub server: ServerConfig,
    /// Built-in handlers bound to event labels.
    pub hooks: Vec<HookConfig>,
    /// Table-of-contents pages.
    pub toc: Vec<TocConfig>,

    /// Resolved project directories (set after loading).
    #[serde(skip)]
    pub paths_resolved: PathsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site-wide settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Prefix of every generated URL.
    pub root_url: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            root_url: "/".to_owned(),
        }
    }
}

/// Raw project directories as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PathsConfigRaw {
    input: Option<String>,
    output: Option<String>,
    layout: Option<String>,
}

/// Resolved project directories with absolute paths.
#[derive(Debug, Default, Clone)]
pub struct PathsConfig {
    /// Project root (directory of the config file).
    pub project: PathBuf,
    /// Content files (pages and assets).
    pub input: PathBuf,
    /// Rendered site.
    pub output: PathBuf,
    /// Templates.
    pub layout: PathBuf,
}

/// Ignore patterns as written in TOML: a list or one whitespace-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum IgnoreRaw {
    Words(String),
    List(Vec<String>),
}

/// Tree building configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    #[serde(rename = "ignore")]
    ignore_raw: Option<IgnoreRaw>,
    /// Whether symbolic links in the input tree are followed.
    pub follow_links: bool,
    /// Delimiter for tag strings in front matter (empty: whitespace).
    pub tag_separator: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            ignore_raw: None,
            follow_links: false,
            tag_separator: String::new(),
        }
    }
}

impl BuildConfig {
    /// Effective ignore patterns.
    ///
    /// The configured patterns in their original order, followed by
    /// [`DEFAULT_IGNORE`] unless it was already listed.
    #[must_use]
    pub fn ignore(&self) -> Vec<String> {
        let mut patterns: Vec<String> = match &self.ignore_raw {
            Some(IgnoreRaw::Words(words)) => words.split_whitespace().map(str::to_owned).collect(),
            Some(IgnoreRaw::List(list)) => list.clone(),
            None => Vec::new(),
        };
        if !patterns.iter().any(|p| p == DEFAULT_IGNORE) {
            patterns.push(DEFAULT_IGNORE.to_owned());
        }
        patterns
    }
}

/// Development server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 8080,
        }
    }
}

/// Built-in handler that can be bound to an event label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookHandler {
    /// Rewrite `idref:` links to page URLs.
    ResolveIdref,
    /// Add `class="table"` to HTML tables.
    TableClass,
}

/// Binding of a built-in handler to an event label.
#[derive(Debug, Clone, Deserialize)]
pub struct HookConfig {
    /// Event label, e.g. `render:pre:page:any`.
    pub event: String,
    /// Handler to run.
    pub handler: HookHandler,
}

/// Page attribute used to order page listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Path,
    Title,
    Date,
    Time,
    Datetime,
    Url,
    Id,
}

/// Table-of-contents (index) page with optional pagination.
#[derive(Debug, Clone, Deserialize)]
pub struct TocConfig {
    /// Path of the index page relative to the input directory.
    pub page: String,
    /// Folder whose pages are listed; defaults to the index page's folder.
    #[serde(default)]
    pub folder: Option<String>,
    /// Only list pages carrying this tag.
    #[serde(default)]
    pub tag: Option<String>,
    /// Include pages of sub-folders.
    #[serde(default)]
    pub deep: bool,
    /// Attribute the listing is ordered by.
    #[serde(default)]
    pub sort: SortKey,
    /// Reverse the order.
    #[serde(default)]
    pub reverse: bool,
    /// Template rendering one entry.
    #[serde(default = "default_toc_item")]
    pub item: String,
    /// Separator between page name and sub-page number.
    #[serde(default = "default_toc_separator")]
    pub separator: String,
    /// Entries per page.
    #[serde(default = "default_toc_size")]
    pub size: usize,
}

fn default_toc_item() -> String {
    "item".to_owned()
}

fn default_toc_separator() -> String {
    "_".to_owned()
}

fn default_toc_size() -> usize {
    10
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`paths.input`").
        field: String,
        /// Error message (e.g., "${`SITE_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `bass.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Create default config with paths relative to given base directory.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteSection::default(),
            paths: PathsConfigRaw::default(),
            build: BuildConfig::default(),
            server: ServerConfig::default(),
            hooks: Vec::new(),
            toc: Vec::new(),
            paths_resolved: PathsConfig {
                project: base.to_path_buf(),
                input: base.join("input"),
                output: base.join("output"),
                layout: base.join("layout"),
            },
            config_path: None,
        }
    }

    /// Default `bass.toml` written for new projects.
    #[must_use]
    pub fn default_toml() -> &'static str {
        "[site]\n\
         root_url = \"/\"\n\
         \n\
         [paths]\n\
         input = \"input\"\n\
         output = \"output\"\n\
         layout = \"layout\"\n\
         \n\
         [build]\n\
         ignore = [\".?*\"]\n\
         follow_links = false\n\
         \n\
         [server]\n\
         host = \"localhost\"\n\
         port = 8080\n"
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(input) = &settings.input {
            self.paths_resolved.input.clone_from(input);
        }
        if let Some(output) = &settings.output {
            self.paths_resolved.output.clone_from(output);
        }
        if let Some(layout) = &settings.layout {
            self.paths_resolved.layout.clone_from(layout);
        }
        if let Some(root_url) = &settings.root_url {
            self.site.root_url.clone_from(root_url);
        }
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
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

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_build()?;
        self.validate_server()?;
        self.validate_toc()?;
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        let root_url = &self.site.root_url;
        if !root_url.starts_with('/') || !root_url.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "site.root_url must start and end with '/', got '{root_url}'"
            )));
        }
        Ok(())
    }

    fn validate_build(&self) -> Result<(), ConfigError> {
        for pattern in self.build.ignore() {
            glob::Pattern::new(&pattern).map_err(|e| {
                ConfigError::Validation(format!("build.ignore pattern '{pattern}' is invalid: {e}"))
            })?;
        }
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_toc(&self) -> Result<(), ConfigError> {
        for toc in &self.toc {
            require_non_empty(&toc.page, "toc.page")?;
            require_non_empty(&toc.item, "toc.item")?;
            if toc.size == 0 {
                return Err(ConfigError::Validation(format!(
                    "toc.size for page '{}' must be greater than 0",
                    toc.page
                )));
            }
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let resolve = |value: Option<&str>, default: &str, field: &str| {
            expand::expand_path(value.unwrap_or(default), field).map(|p| config_dir.join(p))
        };

        self.paths_resolved = PathsConfig {
            project: config_dir.to_path_buf(),
            input: resolve(self.paths.input.as_deref(), "input", "paths.input")?,
            output: resolve(self.paths.output.as_deref(), "output", "paths.output")?,
            layout: resolve(self.paths.layout.as_deref(), "layout", "paths.layout")?,
        };

        Ok(())
    }
}
