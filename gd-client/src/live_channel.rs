use std::{sync::Arc, time::Duration};

use rand::Rng;
use reqwest::header::ACCEPT;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wire::{PushMessage, Subscription};

use crate::{
    action::PanelActionClient,
    config::{ClientConfig, ConfigError},
    logging::{category_push, status_label},
    metrics::SyncMetrics,
    thermostat::ThermostatReconciler,
    ui::{PanelClass, UiPort},
};

/// Longest unterminated line kept while waiting for its newline.
pub const MAX_PENDING_LINE_BYTES: usize = 64 * 1024;

#[derive(Debug)]
pub enum PushError {
    Config(ConfigError),
    Connect(reqwest::Error),
    Status(u16),
    Stream(reqwest::Error),
    LineTooLong { limit: usize },
}

impl std::fmt::Display for PushError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushError::Config(err) => write!(f, "invalid push endpoint: {err}"),
            PushError::Connect(err) => write!(f, "failed to connect: {err}"),
            PushError::Status(status) => {
                write!(f, "server answered {}", status_label(*status))
            }
            PushError::Stream(err) => write!(f, "stream interrupted: {err}"),
            PushError::LineTooLong { limit } => {
                write!(f, "stream line exceeded {limit} bytes")
            }
        }
    }
}

impl std::error::Error for PushError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PushError::Config(err) => Some(err),
            PushError::Connect(err) | PushError::Stream(err) => Some(err),
            PushError::Status(_) | PushError::LineTooLong { .. } => None,
        }
    }
}

/// Turns server push notifications into targeted panel refreshes.
#[derive(Clone)]
pub struct LiveInvalidationChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
    actions: PanelActionClient,
    thermostat: ThermostatReconciler,
    ui: Arc<dyn UiPort>,
    metrics: Arc<SyncMetrics>,
}

impl LiveInvalidationChannel {
    pub fn new(
        config: Arc<ClientConfig>,
        http: reqwest::Client,
        actions: PanelActionClient,
        thermostat: ThermostatReconciler,
        ui: Arc<dyn UiPort>,
        metrics: Arc<SyncMetrics>,
    ) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                config,
                http,
                actions,
                thermostat,
                ui,
                metrics,
            }),
        }
    }

    pub fn start(&self, subscription: Subscription) -> JoinHandle<()> {
        let channel = self.clone();
        tokio::spawn(async move { channel.run(subscription).await })
    }

    /// Streams the subscription until the server goes away for good.
    ///
    /// Lost connections are retried with exponential backoff unless
    /// reconnecting is disabled, in which case push stays off.
    pub async fn run(&self, subscription: Subscription) {
        let endpoint = match self.inner.config.push_endpoint(&subscription) {
            Ok(endpoint) => endpoint,
            Err(err) => {
                warn!("{} {}", category_push(), PushError::Config(err));
                return;
            }
        };
        let config = &self.inner.config;
        let mut backoff = ReconnectBackoff::new(
            Duration::from_millis(config.push_backoff_min_ms),
            Duration::from_millis(config.push_backoff_max_ms),
        );
        info!("{} subscribing to {endpoint}", category_push());

        loop {
            match self.stream_once(&endpoint, &mut backoff).await {
                Ok(()) => info!("{} stream closed by server", category_push()),
                Err(err) => warn!("{} {err}", category_push()),
            }
            if !config.push_reconnect {
                warn!(
                    "{} live updates stay off until restart",
                    category_push()
                );
                return;
            }
            let delay = backoff.next_delay();
            debug!(
                "{} reconnecting in {}ms",
                category_push(),
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn stream_once(
        &self,
        endpoint: &str,
        backoff: &mut ReconnectBackoff,
    ) -> Result<(), PushError> {
        let mut response = self
            .inner
            .http
            .get(endpoint)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(PushError::Connect)?;
        if !response.status().is_success() {
            return Err(PushError::Status(response.status().as_u16()));
        }
        self.inner.metrics.record_push_connect();
        backoff.reset();
        debug!("{} connected", category_push());

        let mut reader = SseReader::default();
        let result = loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    reader.push(&chunk);
                    while let Some(event) = reader.next_event() {
                        if event.is_message() {
                            self.handle_message(&event.data);
                        } else {
                            debug!(
                                "{} ignoring event '{}'",
                                category_push(),
                                event.event.as_deref().unwrap_or_default()
                            );
                        }
                    }
                    if reader.pending_len() > MAX_PENDING_LINE_BYTES {
                        break Err(PushError::LineTooLong {
                            limit: MAX_PENDING_LINE_BYTES,
                        });
                    }
                }
                Ok(None) => break Ok(()),
                Err(err) => break Err(PushError::Stream(err)),
            }
        };
        self.inner.metrics.record_push_disconnect();
        result
    }

    /// Reacts to one push payload; returns how many refreshes it issued.
    pub fn handle_message(&self, payload: &str) -> usize {
        self.inner.metrics.record_push_message();
        match PushMessage::parse(payload) {
            PushMessage::Hello => {
                debug!("{} server hello", category_push());
                0
            }
            PushMessage::SensorDataChanged => self.refresh_class(PanelClass::Sensor),
            PushMessage::ThermostatDataChanged => {
                if self.inner.thermostat.is_suppressed() {
                    self.inner.metrics.record_push_suppressed();
                    debug!(
                        "{} thermostat refresh held back by pending edit",
                        category_push()
                    );
                    0
                } else {
                    self.refresh_class(PanelClass::Thermostat)
                }
            }
            PushMessage::RefreshIds(ids) => {
                let mut issued = 0;
                for panel_id in ids {
                    if self.inner.ui.panel_exists(&panel_id) {
                        self.inner.actions.refresh_panel(&panel_id);
                        issued += 1;
                    } else {
                        debug!(
                            "{} panel {panel_id} is not on this page",
                            category_push()
                        );
                    }
                }
                issued
            }
            PushMessage::Other(payload) => {
                debug!("{} unhandled message '{payload}'", category_push());
                0
            }
        }
    }

    fn refresh_class(&self, class: PanelClass) -> usize {
        let panels = self.inner.ui.panels(class);
        for panel_id in &panels {
            self.inner.actions.refresh_panel(panel_id);
        }
        debug!(
            "{} refreshing {} {} panel(s)",
            category_push(),
            panels.len(),
            class.as_str()
        );
        panels.len()
    }
}

/// Reconnect delays: doubling from `min` up to `max`, plus up to 20% jitter.
#[derive(Clone, Debug)]
pub struct ReconnectBackoff {
    min: Duration,
    max: Duration,
    current: Duration,
}

impl ReconnectBackoff {
    pub fn new(min: Duration, max: Duration) -> Self {
        let max = max.max(min);
        Self {
            min,
            max,
            current: min,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let base = self.current;
        self.current = (self.current * 2).min(self.max);
        let jitter_ms = (base.as_millis() / 5) as u64;
        if jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }

    pub fn reset(&mut self) {
        self.current = self.min;
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct SseEvent {
    event: Option<String>,
    data: String,
}

impl SseEvent {
    fn is_message(&self) -> bool {
        matches!(self.event.as_deref(), None | Some("message"))
    }
}

/// Incremental `text/event-stream` decoder.
#[derive(Default)]
struct SseReader {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseReader {
    fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Bytes buffered after the last complete line.
    fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    fn next_event(&mut self) -> Option<SseEvent> {
        loop {
            let newline = self.buffer.iter().position(|&b| b == b'\n')?;
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.is_empty() {
                if self.event.is_none() && self.data.is_empty() {
                    continue;
                }
                return Some(SseEvent {
                    event: self.event.take(),
                    data: std::mem::take(&mut self.data).join("\n"),
                });
            }
            if line.starts_with(b":") {
                continue;
            }
            let (field, value) = match line.iter().position(|&b| b == b':') {
                Some(colon) => (&line[..colon], &line[colon + 1..]),
                None => (&line[..], &[][..]),
            };
            let value = value.strip_prefix(b" ").unwrap_or(value);
            let value = String::from_utf8_lossy(value).into_owned();
            match field {
                b"event" => self.event = Some(value.trim().to_string()),
                b"data" => self.data.push(value),
                _ => {}
            }
        }
    }
}
