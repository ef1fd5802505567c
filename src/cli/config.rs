use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::config;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub url: String,
    pub added_at: DateTime<Utc>,
    pub last_ping: Option<DateTime<Utc>>,
    pub status: ServerStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Up,
    Down,
    Unknown,
}

/// Contents of `server.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server: Option<ServerInfo>,
}

impl ServerInfo {
    pub fn new(url: String) -> Self {
        Self {
            url,
            added_at: Utc::now(),
            last_ping: None,
            status: ServerStatus::Unknown,
        }
    }

    pub fn update_ping(&mut self, status: ServerStatus) {
        self.last_ping = Some(Utc::now());
        self.status = status;
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = match &config().session.config_dir {
        Some(custom_dir) => custom_dir.clone(),
        None => {
            let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
            PathBuf::from(home).join(".config").join("trendwatch")
        }
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_server_config() -> anyhow::Result<ServerConfig> {
    let server_file = get_config_dir()?.join("server.json");

    if !server_file.exists() {
        return Ok(ServerConfig::default());
    }

    let content = fs::read_to_string(server_file)?;
    let config: ServerConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_server_config(config: &ServerConfig) -> anyhow::Result<()> {
    let server_file = get_config_dir()?.join("server.json");

    let content = serde_json::to_string_pretty(config)?;
    fs::write(server_file, content)?;
    Ok(())
}

/// `--url` beats `server.json`, which beats the environment default
pub fn resolve_base_url(flag: Option<&str>) -> anyhow::Result<String> {
    if let Some(url) = flag.map(str::trim).filter(|u| !u.is_empty()) {
        return Ok(normalize_url(url));
    }

    if let Some(server) = load_server_config()?.server {
        return Ok(server.url);
    }

    Ok(config().api.base_url.clone())
}

pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// Any HTTP answer counts as up; only transport failures count as down
pub async fn ping_server(url: &str) -> ServerStatus {
    let client = reqwest::Client::new();

    match client.get(url).timeout(Duration::from_secs(5)).send().await {
        Ok(_) => ServerStatus::Up,
        Err(e) => {
            tracing::debug!("Ping {} failed: {}", url, e);
            ServerStatus::Down
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_is_added_when_missing() {
        assert_eq!(normalize_url("localhost:8000/"), "http://localhost:8000");
        assert_eq!(normalize_url("https://api.example.com"), "https://api.example.com");
    }

    #[test]
    fn flag_wins() {
        let url = resolve_base_url(Some("http://10.0.0.5:9000/")).unwrap();
        assert_eq!(url, "http://10.0.0.5:9000");
    }
}
