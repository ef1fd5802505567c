use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub poll_interval_secs: u64,
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub page_size: usize,
    pub hashtag_cards_per_page: usize,
    pub default_limit: u32,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl SessionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Reject settings the client cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = Url::parse(&self.api.base_url) {
            return Err(ConfigError::InvalidUrl {
                url: self.api.base_url.clone(),
                reason: e.to_string(),
            });
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.view.page_size == 0 || self.view.hashtag_cards_per_page == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("TRENDWATCH_API_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(v) = env::var("TRENDWATCH_TIMEOUT_MS") {
            self.api.timeout_ms = v.parse().unwrap_or(self.api.timeout_ms);
        }

        if let Ok(v) = env::var("TRENDWATCH_POLL_SECS") {
            self.session.poll_interval_secs = v.parse().unwrap_or(self.session.poll_interval_secs);
        }
        if let Ok(v) = env::var("TRENDWATCH_CONFIG_DIR") {
            self.session.config_dir = Some(PathBuf::from(v));
        }

        if let Ok(v) = env::var("TRENDWATCH_PAGE_SIZE") {
            self.view.page_size = v.parse().ok().filter(|n| *n > 0).unwrap_or(self.view.page_size);
        }
        if let Ok(v) = env::var("TRENDWATCH_DEFAULT_LIMIT") {
            self.view.default_limit = v.parse().unwrap_or(self.view.default_limit);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                timeout_ms: 1000,
            },
            session: SessionConfig {
                poll_interval_secs: 10,
                config_dir: None,
            },
            view: ViewConfig {
                page_size: 10,
                hashtag_cards_per_page: 5,
                default_limit: 10,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "http://localhost:80".to_string(),
                timeout_ms: 1000,
            },
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "http://localhost:80".to_string(),
                timeout_ms: 1000,
            },
            session: SessionConfig {
                poll_interval_secs: 10,
                config_dir: None,
            },
            view: ViewConfig {
                page_size: 10,
                hashtag_cards_per_page: 5,
                default_limit: 10,
            },
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::development()
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

pub fn config() -> &'static ClientConfig {
    &CONFIG
}
