use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Origin (optionally with a path prefix) the `/api/...` routes live under
    pub base_url: String,
    pub timeout_secs: u64,
    /// Forget the stored key as soon as the backend rejects it
    #[serde(default = "ApiConfig::default_clear_on_unauthorized")]
    pub clear_credentials_on_unauthorized: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub credentials_path: PathBuf,
    #[serde(default = "StorageConfig::default_ttl_secs")]
    pub credential_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "PollingConfig::default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub backoff: bool,
    #[serde(default = "PollingConfig::default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

impl ApiConfig {
    const fn default_clear_on_unauthorized() -> bool {
        true
    }
}

impl StorageConfig {
    /// Sessions last a day
    const fn default_ttl_secs() -> u64 {
        86_400
    }

    pub fn credential_ttl(&self) -> Duration {
        Duration::from_secs(self.credential_ttl_secs)
    }
}

impl PollingConfig {
    const fn default_interval_secs() -> u64 {
        10
    }

    const fn default_max_backoff_secs() -> u64 {
        160
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Backoff ceiling, or `None` when backoff is disabled
    pub fn max_backoff(&self) -> Option<Duration> {
        self.backoff
            .then(|| Duration::from_secs(self.max_backoff_secs.max(self.interval_secs)))
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: Self::default_interval_secs(),
            backoff: true,
            max_backoff_secs: Self::default_max_backoff_secs(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("LAZYUP_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
        let timeout_secs = std::env::var("LAZYUP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("LAZYUP_TIMEOUT_SECS must be a whole number of seconds")?;
        let clear_credentials_on_unauthorized = std::env::var("LAZYUP_KEEP_REJECTED_KEY")
            .map(|v| !parse_flag(&v))
            .unwrap_or_else(|_| ApiConfig::default_clear_on_unauthorized());

        let credentials_path = match std::env::var("LAZYUP_CREDENTIALS_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_credentials_path()?,
        };
        let credential_ttl_secs = std::env::var("LAZYUP_CREDENTIAL_TTL_SECS")
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("LAZYUP_CREDENTIAL_TTL_SECS must be a whole number of seconds")?
            .unwrap_or_else(StorageConfig::default_ttl_secs);

        let interval_secs = std::env::var("LAZYUP_POLL_INTERVAL_SECS")
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("LAZYUP_POLL_INTERVAL_SECS must be a whole number of seconds")?
            .unwrap_or_else(PollingConfig::default_interval_secs);
        let backoff = std::env::var("LAZYUP_POLL_BACKOFF")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);
        let max_backoff_secs = std::env::var("LAZYUP_POLL_MAX_BACKOFF_SECS")
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("LAZYUP_POLL_MAX_BACKOFF_SECS must be a whole number of seconds")?
            .unwrap_or_else(PollingConfig::default_max_backoff_secs);

        let config = Config {
            api: ApiConfig {
                base_url,
                timeout_secs,
                clear_credentials_on_unauthorized,
            },
            storage: StorageConfig {
                credentials_path,
                credential_ttl_secs,
            },
            polling: PollingConfig {
                interval_secs,
                backoff,
                max_backoff_secs,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every request or poll misbehave
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api.timeout_secs == 0 {
            anyhow::bail!("LAZYUP_TIMEOUT_SECS must be greater than zero");
        }
        if self.polling.interval_secs == 0 {
            anyhow::bail!("LAZYUP_POLL_INTERVAL_SECS must be greater than zero");
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn default_credentials_path() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("gg", "lazyup", "lazyup")
        .context("could not determine a config directory; set LAZYUP_CREDENTIALS_PATH")?;
    Ok(dirs.config_dir().join("credentials.json"))
}
