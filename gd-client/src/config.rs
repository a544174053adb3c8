use std::time::Duration;

use url::Url;
use uuid::Uuid;
use wire::{ActionRoute, DEFAULT_TOPICS, Subscription};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1";
pub const DEFAULT_PUSH_PORT: u16 = 8080;
pub const DEFAULT_THERMOSTAT_DEBOUNCE_MS: u64 = 6_000;
pub const DEFAULT_PUSH_BACKOFF_MIN_MS: u64 = 1_000;
pub const DEFAULT_PUSH_BACKOFF_MAX_MS: u64 = 30_000;

/// Session configuration, built once at startup and shared read-only.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    /// Explicit push endpoint base; defaults to `base_url` on `push_port`.
    pub push_url: Option<String>,
    pub push_port: u16,
    pub push_enabled: bool,
    pub push_reconnect: bool,
    pub push_backoff_min_ms: u64,
    pub push_backoff_max_ms: u64,
    pub channel_id: String,
    pub topics: Vec<String>,
    pub thermostat_debounce_ms: u64,
    pub request_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            push_url: None,
            push_port: DEFAULT_PUSH_PORT,
            push_enabled: false,
            push_reconnect: true,
            push_backoff_min_ms: DEFAULT_PUSH_BACKOFF_MIN_MS,
            push_backoff_max_ms: DEFAULT_PUSH_BACKOFF_MAX_MS,
            channel_id: Uuid::new_v4().to_string(),
            topics: DEFAULT_TOPICS.iter().map(|topic| topic.to_string()).collect(),
            thermostat_debounce_ms: DEFAULT_THERMOSTAT_DEBOUNCE_MS,
            request_timeout_ms: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidUrl { field: &'static str, value: String },
    EmptyChannelId,
    InvalidBackoff { min_ms: u64, max_ms: u64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidUrl { field, value } => {
                write!(f, "{field} is not a valid http(s) url: {value}")
            }
            ConfigError::EmptyChannelId => write!(f, "channel id cannot be empty"),
            ConfigError::InvalidBackoff { min_ms, max_ms } => write!(
                f,
                "push backoff bounds are inverted or zero (min={min_ms}ms max={max_ms}ms)"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_http_url("base_url", &self.base_url)?;
        if let Some(push_url) = &self.push_url {
            parse_http_url("push_url", push_url)?;
        }
        if self.channel_id.trim().is_empty() {
            return Err(ConfigError::EmptyChannelId);
        }
        if self.push_backoff_min_ms == 0 || self.push_backoff_min_ms > self.push_backoff_max_ms {
            return Err(ConfigError::InvalidBackoff {
                min_ms: self.push_backoff_min_ms,
                max_ms: self.push_backoff_max_ms,
            });
        }
        Ok(())
    }

    pub fn subscription(&self) -> Subscription {
        Subscription::new(self.channel_id.clone(), self.topics.iter().cloned())
    }

    pub fn action_url(&self, route: &ActionRoute) -> String {
        format!(
            "{}{}",
            normalize_base_url(&self.base_url),
            route.path_and_query(&self.channel_id)
        )
    }

    /// Full `/sse` endpoint for a subscription.
    pub fn push_endpoint(&self, subscription: &Subscription) -> Result<String, ConfigError> {
        let mut url = match &self.push_url {
            Some(push_url) => parse_http_url("push_url", push_url)?,
            None => {
                let mut url = parse_http_url("base_url", &self.base_url)?;
                url.set_port(Some(self.push_port))
                    .map_err(|_| ConfigError::InvalidUrl {
                        field: "base_url",
                        value: self.base_url.clone(),
                    })?;
                url
            }
        };
        let path = format!("{}/sse", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.query_pairs_mut()
            .clear()
            .append_pair("id", &subscription.channel_id)
            .append_pair("subscribe", &subscription.subscribe_param());
        Ok(url.to_string())
    }

    pub fn thermostat_debounce(&self) -> Duration {
        Duration::from_millis(self.thermostat_debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

fn normalize_base_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

fn parse_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
    };
    let url = Url::parse(value).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url)
}
