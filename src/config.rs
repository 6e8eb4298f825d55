//! Client configuration loaded from `vibracore.toml`.
//!
//! [`VibraCoreConfig`] holds the endpoint, credentials and polling settings.
//! Values missing from the file fall back to defaults. The environment
//! variables `NUCLEI_TOKEN` and `VIBRACORE_URL` take precedence over the file.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::api::PollConfig;
use crate::error::Result;
use crate::input::vibration::BAG_WFS_URL;

/// Top-level configuration loaded from `vibracore.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct VibraCoreConfig {
    /// Base URL of the RPC gateway that hosts the VibraCore service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every RPC call.
    #[serde(default)]
    pub token: String,

    /// Ticket polling behaviour.
    #[serde(default)]
    pub poll: PollSettings,

    /// Building register WFS endpoint.
    #[serde(default = "default_wfs_url")]
    pub wfs_url: String,

    /// Request timeout for the WFS call in seconds.
    #[serde(default = "default_wfs_timeout_secs")]
    pub wfs_timeout_secs: u64,
}

/// Backoff settings for [`wait_until_ticket_is_ready`](crate::api::wait_until_ticket_is_ready).
#[derive(Debug, Clone, Deserialize)]
pub struct PollSettings {
    /// Sleep before doubling, in milliseconds.
    #[serde(default = "default_initial_sleep_ms")]
    pub initial_sleep_ms: u64,

    /// Upper bound of a single sleep, in milliseconds.
    #[serde(default = "default_max_sleep_ms")]
    pub max_sleep_ms: u64,

    /// Give up after this many seconds. Unset means wait forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "https://crux-nuclei.com/api".to_string()
}

fn default_wfs_url() -> String {
    BAG_WFS_URL.to_string()
}

fn default_wfs_timeout_secs() -> u64 {
    5
}

fn default_initial_sleep_ms() -> u64 {
    50
}

fn default_max_sleep_ms() -> u64 {
    10_000
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_sleep_ms: default_initial_sleep_ms(),
            max_sleep_ms: default_max_sleep_ms(),
            timeout_secs: None,
        }
    }
}

impl From<&PollSettings> for PollConfig {
    fn from(settings: &PollSettings) -> Self {
        PollConfig {
            initial_sleep: Duration::from_millis(settings.initial_sleep_ms),
            max_sleep: Duration::from_millis(settings.max_sleep_ms),
            timeout: settings.timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Default for VibraCoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            poll: PollSettings::default(),
            wfs_url: default_wfs_url(),
            wfs_timeout_secs: default_wfs_timeout_secs(),
        }
    }
}

impl VibraCoreConfig {
    /// Loads `vibracore.toml` from the current directory.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("vibracore.toml"))
    }

    /// Loads the given file, or the defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<VibraCoreConfig>(&contents)?
        } else {
            Self::default()
        };

        if let Ok(token) = std::env::var("NUCLEI_TOKEN")
            && !token.is_empty()
        {
            config.token = token;
        }
        if let Ok(url) = std::env::var("VIBRACORE_URL")
            && !url.is_empty()
        {
            config.base_url = url;
        }

        Ok(config)
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig::from(&self.poll)
    }

    pub fn wfs_timeout(&self) -> Duration {
        Duration::from_secs(self.wfs_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = VibraCoreConfig::default();
        assert_eq!(config.base_url, "https://crux-nuclei.com/api");
        assert_eq!(config.poll.initial_sleep_ms, 50);
        assert_eq!(config.poll.max_sleep_ms, 10_000);
        assert!(config.poll.timeout_secs.is_none());
        assert_eq!(config.wfs_url, BAG_WFS_URL);
        assert_eq!(config.wfs_timeout_secs, 5);
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            token = "secret"

            [poll]
            timeout_secs = 600
        "#;
        let config: VibraCoreConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.token, "secret");
        assert_eq!(config.poll.timeout_secs, Some(600));
        assert_eq!(config.poll.initial_sleep_ms, 50);
        assert_eq!(config.base_url, "https://crux-nuclei.com/api");
    }

    #[test]
    fn poll_config_converts_units() {
        let settings = PollSettings {
            initial_sleep_ms: 10,
            max_sleep_ms: 200,
            timeout_secs: Some(3),
        };
        let poll = PollConfig::from(&settings);
        assert_eq!(poll.initial_sleep, Duration::from_millis(10));
        assert_eq!(poll.max_sleep, Duration::from_millis(200));
        assert_eq!(poll.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn load_from_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "wfs_timeout_secs = 30").unwrap();
        let config = VibraCoreConfig::load_from(file.path()).unwrap();
        assert_eq!(config.wfs_timeout_secs, 30);
    }

    #[test]
    fn load_from_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = VibraCoreConfig::load_from(&dir.path().join("vibracore.toml")).unwrap();
        assert_eq!(config.poll.max_sleep_ms, 10_000);
    }
}
