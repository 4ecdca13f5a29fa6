/// Scanner configuration
///
/// Settings are read from a JSON file in the user's config directory:
/// - Linux: ~/.config/deepfake-scanner/config.json
/// - macOS: ~/Library/Application Support/deepfake-scanner/config.json
/// - Windows: %APPDATA%\deepfake-scanner\config.json
///
/// A missing file means "use defaults". Environment variables override
/// whatever the file says.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Env var overriding `base_url`
pub const ENV_BASE_URL: &str = "DEEPFAKE_SCANNER_URL";
/// Env var overriding `request_timeout_secs`
pub const ENV_TIMEOUT_SECS: &str = "DEEPFAKE_SCANNER_TIMEOUT_SECS";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Origin of the detection service, e.g. `http://127.0.0.1:5000`
    pub base_url: String,
    /// Path of the detection route, appended to `base_url`
    pub detect_path: String,
    /// Whole-request timeout for the upload
    pub request_timeout_secs: u64,
    /// Extensions offered by the file picker and accepted on drop
    pub image_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            detect_path: "/api/detect/image".to_string(),
            request_timeout_secs: 30,
            image_extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
        }
    }
}

impl Config {
    /// Load the config from the default location, then apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match Self::default_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Where `config.json` lives, if a config directory can be determined
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("deepfake-scanner");
        path.push("config.json");
        Some(path)
    }

    /// Read a config file. A file that doesn't exist yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Self::default().normalized();
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("📁 Config loaded from {}", path.display());
        config.normalized()
    }

    /// Apply env overrides through `lookup` (injectable for tests).
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENV_BASE_URL) {
            log::info!("🔧 {} overrides base URL", ENV_BASE_URL);
            self.base_url = url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs =
                secs.trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                        key: ENV_TIMEOUT_SECS,
                        reason: e.to_string(),
                    })?;
        }
        self.normalized()
    }

    /// Validate and canonicalise the fields
    fn normalized(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&trimmed).map_err(|e| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }
        self.base_url = trimmed;

        if !self.detect_path.starts_with('/') {
            self.detect_path.insert(0, '/');
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        self.image_extensions = self
            .image_extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        Ok(self)
    }

    /// Full URL of the detection route
    pub fn detect_url(&self) -> String {
        format!("{}{}", self.base_url, self.detect_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether a dropped path has one of the accepted extensions
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.image_extensions.iter().any(|e| *e == ext))
    }
}
