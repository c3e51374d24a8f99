use crate::domain::DEFAULT_CELL_WIDTH_PX;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str =
    "https://admin-backend-docker-india-306034828043.asia-south2.run.app/nlp/api/chat_sessions";

pub const API_URL_ENV: &str = "CHATVIEW_API_URL";
pub const ASSETS_ENV: &str = "CHATVIEW_ASSETS";
pub const LOG_FILE_ENV: &str = "CHATVIEW_LOG_FILE";

#[derive(Debug, Error)]
pub enum ResolveLogPathError {
    #[error("cache directory not found (set {LOG_FILE_ENV} or pass --log-file)")]
    CacheDirNotFound,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub api_url: String,
    /// Base URL that static images (avatars) are resolved against.
    pub assets_base: String,
    pub log_file: Option<PathBuf>,
    pub cell_width_px: u16,
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            assets_base: String::new(),
            log_file: None,
            cell_width_px: DEFAULT_CELL_WIDTH_PX,
            timeout: None,
        }
    }
}

/// Values given on the command line; they win over the environment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub assets_base: Option<String>,
    pub log_file: Option<PathBuf>,
    pub cell_width_px: Option<u16>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(API_URL_ENV).filter(|value| !value.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }
        if let Some(base) = lookup(ASSETS_ENV) {
            config.assets_base = base.trim().to_string();
        }
        if let Some(path) = lookup(LOG_FILE_ENV).filter(|value| !value.trim().is_empty()) {
            config.log_file = Some(PathBuf::from(path));
        }
        config
    }

    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(url) = &overrides.api_url {
            self.api_url = url.clone();
        }
        if let Some(base) = &overrides.assets_base {
            self.assets_base = base.clone();
        }
        if let Some(path) = &overrides.log_file {
            self.log_file = Some(path.clone());
        }
        if let Some(width) = overrides.cell_width_px {
            self.cell_width_px = width;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout = Some(Duration::from_secs(secs));
        }
        self
    }

    pub fn resolve_log_path(&self) -> Result<PathBuf, ResolveLogPathError> {
        if let Some(path) = &self.log_file {
            return Ok(path.clone());
        }

        let Some(cache) = dirs::cache_dir() else {
            return Err(ResolveLogPathError::CacheDirNotFound);
        };

        Ok(cache.join(env!("CARGO_PKG_NAME")).join("chatview.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.cell_width_px, 8);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn environment_then_flags() {
        let config = Config::from_lookup(lookup_from(&[
            (API_URL_ENV, " http://localhost:9000/api/chat_sessions "),
            (ASSETS_ENV, "/static"),
            (LOG_FILE_ENV, "/tmp/env.log"),
        ]));
        assert_eq!(config.api_url, "http://localhost:9000/api/chat_sessions");
        assert_eq!(config.assets_base, "/static");

        let overrides = ConfigOverrides {
            log_file: Some(PathBuf::from("/tmp/flag.log")),
            timeout_secs: Some(5),
            ..ConfigOverrides::default()
        };
        let config = config.with_overrides(&overrides);
        assert_eq!(config.api_url, "http://localhost:9000/api/chat_sessions");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/flag.log")));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn blank_api_url_keeps_default() {
        let config = Config::from_lookup(lookup_from(&[(API_URL_ENV, "  ")]));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn explicit_log_file_wins() {
        let config = Config {
            log_file: Some(PathBuf::from("/var/tmp/x.log")),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_log_path().expect("path"),
            PathBuf::from("/var/tmp/x.log")
        );
    }
}
