//! Configuration loading and root folder resolution
//!
//! Values resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file never stops a run; it only means the defaults apply.
//! A file that exists but does not parse is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "CATALOG_ROOT_FOLDER";

/// Name of the SQLite database inside the root folder
pub const DATABASE_FILE: &str = "catalog.db";

/// Logging section of the TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset, e.g. "info" or "catalog_jamendo=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Per-provider API section (`[jamendo]`, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSection {
    pub client_id: Option<String>,
    pub request_delay_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub timeout_secs: Option<u64>,
}

/// Contents of `catalog.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub jamendo: ProviderSection,
    /// File this config was read from (None: defaults)
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the TOML file, falling back to defaults when it is missing
    ///
    /// An explicit path that cannot be read is an error; the default location
    /// being absent is not. Runs before logging is set up, so callers report
    /// `loaded_from` themselves.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let mut config = Self::from_file(&path)?;
        config.loaded_from = Some(path);
        Ok(config)
    }
}

/// Default configuration file path: `<config_dir>/catalog/catalog.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("catalog").join("catalog.toml"))
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("catalog"))
        .unwrap_or_else(|| PathBuf::from("./catalog_data"))
}

/// Resolve the root folder (CLI → ENV → TOML → default)
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Some(path) = non_empty_env(ROOT_FOLDER_ENV) {
        return PathBuf::from(path);
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Resolve a provider API key (CLI → ENV → TOML)
///
/// `provider` is only used to build the error message.
pub fn resolve_api_key(
    provider: &str,
    cli_arg: Option<&str>,
    env_var_name: &str,
    toml_value: Option<&str>,
) -> Result<String> {
    if let Some(key) = cli_arg.filter(|k| is_valid_key(k)) {
        info!("{} API key taken from command line", provider);
        return Ok(key.trim().to_string());
    }

    if let Some(key) = non_empty_env(env_var_name) {
        info!("{} API key loaded from environment variable", provider);
        return Ok(key);
    }

    if let Some(key) = toml_value.filter(|k| is_valid_key(k)) {
        info!("{} API key loaded from TOML config", provider);
        return Ok(key.trim().to_string());
    }

    Err(Error::Config(format!(
        "{provider} API key not configured. Please configure using one of:\n\
         1. Command line: --client-id your-key\n\
         2. Environment: {env_var_name}=your-key\n\
         3. TOML config: [{section}] client_id = \"your-key\"",
        provider = provider,
        env_var_name = env_var_name,
        section = provider.to_ascii_lowercase(),
    )))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// User agent sent with every provider request
pub fn get_user_agent() -> String {
    format!("catalog-ingester/{}", env!("CARGO_PKG_VERSION"))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_toml() {
        let config: TomlConfig = toml::from_str(
            r#"
            root_folder = "/srv/catalog"

            [logging]
            level = "debug"

            [jamendo]
            client_id = "abc123"
            request_delay_ms = 500
            max_retries = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.root_folder, Some(PathBuf::from("/srv/catalog")));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.jamendo.client_id.as_deref(), Some("abc123"));
        assert_eq!(config.jamendo.request_delay_ms, Some(500));
        assert_eq!(config.jamendo.max_retries, Some(5));
        assert_eq!(config.jamendo.timeout_secs, None);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert!(config.root_folder.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.jamendo.client_id.is_none());
    }

    #[test]
    fn test_user_agent_carries_version() {
        let ua = get_user_agent();
        assert!(ua.starts_with("catalog-ingester/"));
        assert!(ua.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }
}
