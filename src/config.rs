use std::{env, net::SocketAddr, path::PathBuf, time::Duration};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub webhook_url: String,
    pub mention: Option<String>,
    pub feed_base_url: String,
    pub sqlite_path: PathBuf,
    pub poll_interval: Duration,
    pub liveness_addr: SocketAddr,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing env var: {0}")]
    MissingEnv(String),
    #[error("invalid socket address in env var {name}: {source}")]
    InvalidAddr {
        name: String,
        source: std::net::AddrParseError,
    },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let webhook_url = resolve_webhook_url()?;
        let mention = env::var("STATUS_MIRROR_MENTION")
            .ok()
            .filter(|raw| !raw.is_empty());
        let feed_base_url = read_required("STATUS_MIRROR_FEED_BASE_URL")?;
        let sqlite_path = PathBuf::from(
            env::var("STATUS_MIRROR_SQLITE_PATH")
                .unwrap_or_else(|_| "statuspage-mirror.sqlite".to_owned()),
        );

        let poll_seconds = env::var("STATUS_MIRROR_POLL_SECONDS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(4);

        let liveness_addr = read_addr("STATUS_MIRROR_LIVENESS_ADDR", "0.0.0.0:8080")?;

        Ok(Self {
            webhook_url,
            mention,
            feed_base_url,
            sqlite_path,
            poll_interval: Duration::from_secs(poll_seconds),
            liveness_addr,
        })
    }
}

/// The webhook URL is the one fatal startup requirement. The id/token pair
/// is a deprecated spelling kept for existing deployments.
fn resolve_webhook_url() -> Result<String, ConfigError> {
    if let Ok(url) = env::var("STATUS_MIRROR_WEBHOOK_URL") {
        if !url.is_empty() {
            return Ok(url);
        }
    }

    let id = env::var("STATUS_MIRROR_WEBHOOK_ID").ok();
    let token = env::var("STATUS_MIRROR_WEBHOOK_TOKEN").ok();
    if let (Some(id), Some(token)) = (id, token) {
        warn!(
            "STATUS_MIRROR_WEBHOOK_ID/STATUS_MIRROR_WEBHOOK_TOKEN are deprecated, \
             set STATUS_MIRROR_WEBHOOK_URL instead"
        );
        return Ok(format!("https://discord.com/api/webhooks/{id}/{token}"));
    }

    Err(ConfigError::MissingEnv("STATUS_MIRROR_WEBHOOK_URL".to_owned()))
}

fn read_required(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnv(name.to_owned()))
}

fn read_addr(name: &str, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_owned());
    raw.parse::<SocketAddr>().map_err(|source| ConfigError::InvalidAddr {
        name: name.to_owned(),
        source,
    })
}
