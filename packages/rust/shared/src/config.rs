//! Application configuration for the mfnf converter.
//!
//! User config lives at `~/.mfnf/mfnf.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{MfnfError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "mfnf.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".mfnf";

// ---------------------------------------------------------------------------
// Config structs (matching mfnf.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Wiki endpoints.
    #[serde(default)]
    pub mediawiki: MediaWikiConfig,

    /// Memoizing cache for content-service calls.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Rewrite pipeline switches.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// `[mediawiki]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaWikiConfig {
    /// Action API endpoint used to fetch article source.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// REST API root used to render wikitext to HTML.
    #[serde(default = "default_rest_url")]
    pub rest_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MediaWikiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            rest_url: default_rest_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "https://de.wikibooks.org/w/api.php".into()
}
fn default_rest_url() -> String {
    "https://de.wikibooks.org/api/rest_v1".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[cache]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether content-service calls are memoized at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Location of the cache database (`~/` is expanded).
    #[serde(default = "default_cache_path")]
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_cache_path(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_cache_path() -> String {
    "~/.mfnf/cache.db".into()
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Delete secondary elements of an already deincluded transclusion
    /// (elements still carrying the transclusion group's `about` marker).
    #[serde(default)]
    pub strip_transclusion_fragments: bool,
}

impl MediaWikiConfig {
    /// Check that both endpoints are absolute URLs.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("api_url", &self.api_url), ("rest_url", &self.rest_url)] {
            Url::parse(value).map_err(|e| {
                MfnfError::config(format!("mediawiki.{field} '{value}' is not a URL: {e}"))
            })?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.mfnf/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| MfnfError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.mfnf/mfnf.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Resolve a leading `~/` against the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| MfnfError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MfnfError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| MfnfError::config(format!("failed to parse {}: {e}", path.display())))?;
    config.mediawiki.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MfnfError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| MfnfError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MfnfError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("api_url"));
        assert!(toml_str.contains("strip_transclusion_fragments = false"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.mediawiki.timeout_secs, 30);
        assert!(parsed.cache.enabled);
        assert!(!parsed.pipeline.strip_transclusion_fragments);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[cache]
enabled = false

[pipeline]
strip_transclusion_fragments = true
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.path, "~/.mfnf/cache.db");
        assert!(config.pipeline.strip_transclusion_fragments);
        assert_eq!(config.mediawiki.api_url, "https://de.wikibooks.org/w/api.php");
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let config = MediaWikiConfig {
            api_url: "not a url".into(),
            ..MediaWikiConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mediawiki.api_url"));
    }

    #[test]
    fn load_config_from_file() {
        let path = std::env::temp_dir().join(format!("mfnf-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[mediawiki]\ntimeout_secs = 5\n").unwrap();
        let config = load_config_from(&path).expect("load");
        assert_eq!(config.mediawiki.timeout_secs, 5);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/tmp/cache.db").unwrap(), PathBuf::from("/tmp/cache.db"));
        if dirs::home_dir().is_some() {
            assert!(expand_home("~/x.db").unwrap().ends_with("x.db"));
        }
    }
}
