use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub base_url: String,
    pub collection: String,
    pub session_cookie_command: Option<String>,
}

#[derive(Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub log_path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config file: {}", e),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    server: Option<RawServerConfig>,
    #[serde(default)]
    log: RawLogConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawServerConfig {
    base_url: Option<String>,
    #[serde(default = "default_collection")]
    collection: String,
    #[serde(default)]
    session_cookie_command: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLogConfig {
    #[serde(default)]
    path: Option<PathBuf>,
}

fn default_collection() -> String {
    "messages".to_string()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let server = raw
            .server
            .ok_or_else(|| ConfigError::Parse("missing [server] section".to_string()))?;
        let base_url = server
            .base_url
            .ok_or_else(|| ConfigError::Parse("missing base_url in [server]".to_string()))?;

        let url_pattern = Regex::new(r"^https?://[^/\s]+(/\S*)?$")
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        if !url_pattern.is_match(&base_url) {
            return Err(ConfigError::Parse(format!(
                "base_url '{}' must be an http:// or https:// URL",
                base_url
            )));
        }

        let collection_pattern =
            Regex::new(r"^[A-Za-z0-9_.~-]+$").map_err(|e| ConfigError::Parse(e.to_string()))?;
        if !collection_pattern.is_match(&server.collection) {
            return Err(ConfigError::Parse(format!(
                "collection '{}' must be a single path segment",
                server.collection
            )));
        }

        Ok(Config {
            server: ServerConfig {
                base_url,
                collection: server.collection,
                session_cookie_command: server.session_cookie_command,
            },
            log_path: raw.log.path,
        })
    }
}
