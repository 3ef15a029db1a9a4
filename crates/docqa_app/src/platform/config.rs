use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use docqa_core::QueryPolicy;
use docqa_engine::{ClientSettings, EngineConfig};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

const CONFIG_FILENAME: &str = "docqa.ron";
const CONFIG_PATH_ENV: &str = "DOCQA_CONFIG";
const API_URL_ENV: &str = "DOCQA_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryPolicySetting {
    #[default]
    AllowOverlap,
    RejectWhileInFlight,
}

impl From<QueryPolicySetting> for QueryPolicy {
    fn from(value: QueryPolicySetting) -> Self {
        match value {
            QueryPolicySetting::AllowOverlap => QueryPolicy::AllowOverlap,
            QueryPolicySetting::RejectWhileInFlight => QueryPolicy::RejectWhileInFlight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub connect_timeout_secs: u64,
    /// No client-side timeout unless set.
    pub request_timeout_secs: Option<u64>,
    pub top_k: u32,
    pub download_dir: PathBuf,
    pub log_destination: LogDestination,
    pub verbose: bool,
    pub query_policy: QueryPolicySetting,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            api_url: client.base_url,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: None,
            top_k: client.top_k,
            download_dir: PathBuf::from("downloads"),
            log_destination: LogDestination::File,
            verbose: false,
            query_policy: QueryPolicySetting::AllowOverlap,
        }
    }
}

impl AppConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            client: ClientSettings {
                base_url: self.api_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: self.request_timeout_secs.map(Duration::from_secs),
                top_k: self.top_k,
                ..ClientSettings::default()
            },
            download_dir: self.download_dir.clone(),
        }
    }
}

/// Loads the config from `DOCQA_CONFIG` or `./docqa.ron`, then applies the
/// `DOCQA_API_URL` override. Problems are returned alongside the defaults
/// because logging is not up yet when this runs.
pub fn load() -> (AppConfig, Option<ConfigError>) {
    let path = env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    let (mut config, problem) = match load_from(&path) {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    if let Ok(url) = env::var(API_URL_ENV) {
        if !url.trim().is_empty() {
            config.api_url = url.trim().to_string();
        }
    }
    (config, problem)
}

/// `Ok(None)` when the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    ron::from_str(&content)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from(&dir.path().join("docqa.ron")).unwrap().is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docqa.ron");
        fs::write(
            &path,
            r#"(api_url: "http://rag.internal:9000", query_policy: RejectWhileInFlight)"#,
        )
        .unwrap();

        let config = load_from(&path).unwrap().unwrap();
        assert_eq!(
            config,
            AppConfig {
                api_url: "http://rag.internal:9000".to_string(),
                query_policy: QueryPolicySetting::RejectWhileInFlight,
                ..AppConfig::default()
            }
        );
        assert_eq!(
            QueryPolicy::from(config.query_policy),
            QueryPolicy::RejectWhileInFlight
        );
    }

    #[test]
    fn broken_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docqa.ron");
        fs::write(&path, "(api_url: ").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn engine_config_maps_timeouts() {
        let config = AppConfig {
            request_timeout_secs: Some(30),
            ..AppConfig::default()
        };
        let engine = config.engine_config();
        assert_eq!(engine.client.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(engine.client.connect_timeout, Duration::from_secs(10));
        assert_eq!(engine.client.base_url, "http://127.0.0.1:8000");
        assert_eq!(AppConfig::default().engine_config().client.request_timeout, None);
    }
}
