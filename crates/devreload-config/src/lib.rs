//! Configuration management for devreload.
//!
//! Parses `devreload.toml` with serde and discovers the file in the current
//! directory or its parents. CLI settings are applied on top during load via
//! [`CliSettings`].
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 7878
//!
//! [serve]
//! root = "public"
//!
//! [live_reload]
//! enabled = true
//! status_path = "/dev/reload-check"
//! watch_paths = ["public", "styles"]
//! extensions = ["html", "css", "js"]
//! inject_without_content_type = true
//! ```
//!
//! `server.host` supports `${VAR}` and `${VAR:-default}` expansion.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override the static file root.
    pub root: Option<PathBuf>,
    /// Override watched directories.
    pub watch_paths: Option<Vec<PathBuf>>,
    /// Override watched extensions.
    pub extensions: Option<Vec<String>>,
    /// Override live reload enabled flag.
    pub live_reload_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "devreload.toml";

/// Default path of the reload status endpoint.
pub const DEFAULT_STATUS_PATH: &str = "/dev/reload-check";

/// Default watched extensions.
const DEFAULT_EXTENSIONS: [&str; 3] = ["html", "css", "js"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Static file serving (paths are relative strings from TOML).
    serve: ServeConfigRaw,
    /// Live reload (paths are relative strings from TOML).
    live_reload: LiveReloadConfigRaw,

    /// Resolved serve configuration (set after loading).
    #[serde(skip)]
    pub serve_resolved: ServeConfig,
    /// Resolved live reload configuration (set after loading).
    #[serde(skip)]
    pub live_reload_resolved: LiveReloadConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
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
            host: "127.0.0.1".to_owned(),
            port: 7878,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ServeConfigRaw {
    root: Option<String>,
}

/// Resolved static file configuration.
#[derive(Debug, Default)]
pub struct ServeConfig {
    /// Directory served by the development server.
    pub root: PathBuf,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LiveReloadConfigRaw {
    enabled: Option<bool>,
    status_path: Option<String>,
    watch_paths: Option<Vec<String>>,
    extensions: Option<Vec<String>>,
    inject_without_content_type: Option<bool>,
}

/// Resolved live reload configuration.
#[derive(Debug)]
pub struct LiveReloadConfig {
    /// Whether the watcher runs and the script is injected.
    pub enabled: bool,
    /// Path of the status endpoint polled by the browser.
    pub status_path: String,
    /// Watched directories. Empty means "the serve root".
    pub watch_paths: Vec<PathBuf>,
    /// Extensions whose modification triggers a reload (no leading dot).
    pub extensions: Vec<String>,
    /// Treat responses without a `Content-Type` header as HTML.
    pub inject_without_content_type: bool,
}

impl Default for LiveReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            status_path: DEFAULT_STATUS_PATH.to_owned(),
            watch_paths: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.map(str::to_owned).to_vec(),
            inject_without_content_type: true,
        }
    }
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
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`DEV_HOST`} not set").
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
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `devreload.toml` in the current directory and its parents, falling
    /// back to defaults relative to the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing
    /// fails, or the final configuration is invalid.
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
        }

        config.validate()?;

        Ok(config)
    }

    /// Directories to watch: the configured list, or the serve root.
    #[must_use]
    pub fn watch_paths(&self) -> Vec<PathBuf> {
        if self.live_reload_resolved.watch_paths.is_empty() {
            vec![self.serve_resolved.root.clone()]
        } else {
            self.live_reload_resolved.watch_paths.clone()
        }
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(root) = &settings.root {
            self.serve_resolved.root.clone_from(root);
        }
        if let Some(watch_paths) = &settings.watch_paths {
            self.live_reload_resolved.watch_paths.clone_from(watch_paths);
        }
        if let Some(extensions) = &settings.extensions {
            self.live_reload_resolved.extensions.clone_from(extensions);
        }
        if let Some(enabled) = settings.live_reload_enabled {
            self.live_reload_resolved.enabled = enabled;
        }
    }

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

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            serve: ServeConfigRaw::default(),
            live_reload: LiveReloadConfigRaw::default(),
            serve_resolved: ServeConfig {
                root: base.join("public"),
            },
            live_reload_resolved: LiveReloadConfig::default(),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_live_reload()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 means "any free port", never what a dev server config wants
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_live_reload(&self) -> Result<(), ConfigError> {
        let live_reload = &self.live_reload_resolved;

        if !live_reload.status_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "live_reload.status_path must start with /".to_owned(),
            ));
        }

        if live_reload.enabled && live_reload.extensions.iter().all(String::is_empty) {
            return Err(ConfigError::Validation(
                "live_reload.extensions cannot be empty when live reload is enabled".to_owned(),
            ));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        Ok(())
    }

    /// Resolve relative paths against the config directory and fill in
    /// defaults for unset live reload fields.
    fn resolve(&mut self, config_dir: &Path) {
        self.serve_resolved = ServeConfig {
            root: config_dir.join(self.serve.root.as_deref().unwrap_or("public")),
        };

        let defaults = LiveReloadConfig::default();
        let raw = &self.live_reload;
        self.live_reload_resolved = LiveReloadConfig {
            enabled: raw.enabled.unwrap_or(defaults.enabled),
            status_path: raw.status_path.clone().unwrap_or(defaults.status_path),
            watch_paths: raw
                .watch_paths
                .iter()
                .flatten()
                .map(|p| config_dir.join(p))
                .collect(),
            extensions: raw.extensions.clone().unwrap_or(defaults.extensions),
            inject_without_content_type: raw
                .inject_without_content_type
                .unwrap_or(defaults.inject_without_content_type),
        };
    }
}
