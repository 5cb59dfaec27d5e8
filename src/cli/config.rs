use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

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

/// Login state kept between invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub tenant: Option<String>,
    pub user: Option<String>,
    pub token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ServerInfo {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let parsed = url::Url::parse(url).map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Server URL must use http or https");
        }
        Ok(Self {
            url: parsed.as_str().trim_end_matches('/').to_string(),
            added_at: Utc::now(),
            last_ping: None,
            status: ServerStatus::Unknown,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.url, path.trim_start_matches('/'))
    }

    pub fn update_ping(&mut self, status: ServerStatus) {
        self.last_ping = Some(Utc::now());
        self.status = status;
    }
}

impl SessionConfig {
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("OPSDESK_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("opsdesk").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

fn load_json<T: for<'de> Deserialize<'de>>(file: &str) -> anyhow::Result<Option<T>> {
    let path = get_config_dir()?.join(file);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

fn save_json<T: Serialize>(file: &str, value: &T) -> anyhow::Result<()> {
    let path = get_config_dir()?.join(file);
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn load_server() -> anyhow::Result<Option<ServerInfo>> {
    load_json("server.json")
}

/// The configured server, or an error telling the user how to set one.
pub fn require_server() -> anyhow::Result<ServerInfo> {
    load_server()?.ok_or_else(|| anyhow::anyhow!("No server configured; run `opsdesk server set <url>`"))
}

pub fn save_server(server: &ServerInfo) -> anyhow::Result<()> {
    save_json("server.json", server)
}

pub fn load_session() -> anyhow::Result<SessionConfig> {
    Ok(load_json("session.json")?.unwrap_or_default())
}

pub fn save_session(session: &SessionConfig) -> anyhow::Result<()> {
    save_json("session.json", session)
}

pub async fn ping_server(server: &ServerInfo) -> ServerStatus {
    let client = reqwest::Client::new();

    match client
        .get(server.endpoint("/health"))
        .timeout(std::time::Duration::from_secs(5))
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => ServerStatus::Up,
        _ => ServerStatus::Down,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_url_is_normalised() {
        let server = ServerInfo::new("http://localhost:3000/").unwrap();
        assert_eq!(server.url, "http://localhost:3000");
        assert_eq!(server.endpoint("/health"), "http://localhost:3000/health");
        assert_eq!(server.endpoint("api/assets"), "http://localhost:3000/api/assets");
    }

    #[test]
    fn server_url_must_be_http() {
        assert!(ServerInfo::new("ftp://example.com").is_err());
        assert!(ServerInfo::new("not a url").is_err());
    }
}
