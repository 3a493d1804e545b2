//! Environment configuration for the server and the display client

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{QueueError, QueueResult};
use crate::types::Topic;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_RECONNECT_DELAY_MS: u64 = 2000;

/// Server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// JSON array of polyclinics loaded at startup
    pub polyclinics_file: Option<PathBuf>,
    /// Outbound queue size per WebSocket connection
    pub subscriber_buffer: usize,
}

impl ServerConfig {
    /// Read `QUEUE_BIND_ADDR`, `QUEUE_POLYCLINICS_FILE` and `QUEUE_SUBSCRIBER_BUFFER`
    pub fn from_env() -> QueueResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> QueueResult<Self> {
        let bind_addr = parse_or(&lookup, "QUEUE_BIND_ADDR", DEFAULT_BIND_ADDR)?;
        let polyclinics_file = lookup("QUEUE_POLYCLINICS_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let subscriber_buffer: usize = match lookup("QUEUE_SUBSCRIBER_BUFFER") {
            Some(raw) => parse_value("QUEUE_SUBSCRIBER_BUFFER", &raw)?,
            None => DEFAULT_SUBSCRIBER_BUFFER,
        };
        if subscriber_buffer == 0 {
            return Err(QueueError::Config(
                "QUEUE_SUBSCRIBER_BUFFER must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            bind_addr,
            polyclinics_file,
            subscriber_buffer,
        })
    }
}

/// Display client settings
///
/// One base URL selects both the REST origin and the WebSocket origin.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    pub topic: Topic,
    pub reconnect_delay: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str, topic: Topic, reconnect_delay: Duration) -> QueueResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(QueueError::Config(format!(
                "QUEUE_BASE_URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }
        Ok(Self {
            base_url,
            topic,
            reconnect_delay,
        })
    }

    /// Read `QUEUE_BASE_URL`, `QUEUE_TOPIC` and `QUEUE_RECONNECT_DELAY_MS`
    pub fn from_env() -> QueueResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> QueueResult<Self> {
        let base_url = lookup("QUEUE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let topic = parse_or(&lookup, "QUEUE_TOPIC", "display")?;
        let delay_ms = parse_or(&lookup, "QUEUE_RECONNECT_DELAY_MS", &DEFAULT_RECONNECT_DELAY_MS.to_string())?;
        Self::new(&base_url, topic, Duration::from_millis(delay_ms))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// REST snapshot URL
    pub fn display_url(&self) -> String {
        format!("{}/api/queue/display", self.base_url)
    }

    /// WebSocket URL on the same origin
    pub fn ws_url(&self) -> String {
        let origin = match self.base_url.strip_prefix("https://") {
            Some(rest) => format!("wss://{}", rest),
            None => format!("ws://{}", self.base_url.trim_start_matches("http://")),
        };
        format!("{}/ws", origin)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> QueueResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    parse_value(key, &raw)
}

fn parse_value<T>(key: &str, raw: &str) -> QueueResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| QueueError::Config(format!("{}='{}': {}", key, raw, e)))
}
