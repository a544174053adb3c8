use std::sync::Arc;

use tracing::{debug, warn};
use wire::{ActionEnvelope, ActionRoute};

use crate::{
    config::ClientConfig,
    interpreter::{BatchReport, CommandInterpreter},
    logging::{category_action, status_label},
    metrics::SyncMetrics,
    registry::{RequestHandle, RequestKey, RequestRegistry},
    transport::{HttpReply, Transport, TransportError},
    ui::UiPort,
};

/// How one action round-trip ended.
#[derive(Debug)]
pub enum ActionOutcome {
    Applied(BatchReport),
    Rejected(String),
    Empty,
    Status(u16),
    Failed(TransportError),
    Malformed(serde_json::Error),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionOutcome::Applied(_) => "applied",
            ActionOutcome::Rejected(_) => "rejected",
            ActionOutcome::Empty => "empty",
            ActionOutcome::Status(_) => "status",
            ActionOutcome::Failed(_) => "failed",
            ActionOutcome::Malformed(_) => "malformed",
        }
    }
}

/// Sends panel actions and applies the commands the server answers with.
#[derive(Clone)]
pub struct PanelActionClient {
    inner: Arc<ActionClientInner>,
}

struct ActionClientInner {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    registry: Arc<RequestRegistry>,
    interpreter: CommandInterpreter,
    ui: Arc<dyn UiPort>,
    metrics: Arc<SyncMetrics>,
}

impl PanelActionClient {
    pub fn new(
        config: Arc<ClientConfig>,
        transport: Arc<dyn Transport>,
        registry: Arc<RequestRegistry>,
        ui: Arc<dyn UiPort>,
        metrics: Arc<SyncMetrics>,
    ) -> Self {
        let interpreter = CommandInterpreter::new(ui.clone(), metrics.clone());
        Self {
            inner: Arc::new(ActionClientInner {
                config,
                transport,
                registry,
                interpreter,
                ui,
                metrics,
            }),
        }
    }

    pub fn registry(&self) -> &Arc<RequestRegistry> {
        &self.inner.registry
    }

    pub fn interpreter(&self) -> &CommandInterpreter {
        &self.inner.interpreter
    }

    /// `GET /action/<id>[-<suffix>]?otsseid=..[&<extra_query>]`.
    pub fn send_action(
        &self,
        id: &str,
        suffix: Option<&str>,
        extra_query: Option<&str>,
    ) -> RequestHandle<ActionOutcome> {
        let mut route = ActionRoute::new(id);
        if let Some(suffix) = suffix {
            route = route.with_suffix(suffix);
        }
        if let Some(query) = extra_query {
            route = route.with_query(query);
        }
        self.send(route)
    }

    pub fn refresh_panel(&self, panel_id: &str) -> RequestHandle<ActionOutcome> {
        self.send(ActionRoute::update(panel_id))
    }

    pub fn send(&self, route: ActionRoute) -> RequestHandle<ActionOutcome> {
        let url = self.inner.config.action_url(&route);
        let key = RequestKey::from(&route);
        debug!("{} GET {url} key={key}", category_action());

        let transport = self.inner.transport.clone();
        let request_url = url.clone();
        let client = self.clone();
        self.inner.registry.issue(
            key,
            async move { transport.get(&request_url).await },
            move |reply| client.handle_reply(&url, reply),
        )
    }

    /// Asks every freshly rendered moving shade for its position.
    pub fn sync_moving_panels(&self) -> usize {
        let panels = self.inner.ui.moving_panels();
        for panel_id in &panels {
            self.send(ActionRoute::moving_update(panel_id));
        }
        panels.len()
    }

    fn handle_reply(&self, url: &str, reply: Result<HttpReply, TransportError>) -> ActionOutcome {
        let metrics = &self.inner.metrics;
        let reply = match reply {
            Ok(reply) => reply,
            Err(err) => {
                metrics.record_response_failed();
                debug!("{} {url} dropped: {err}", category_action());
                return ActionOutcome::Failed(err);
            }
        };
        if reply.status != 200 {
            metrics.record_response_failed();
            debug!(
                "{} {url} dropped with status {}",
                category_action(),
                status_label(reply.status)
            );
            return ActionOutcome::Status(reply.status);
        }
        if reply.body.trim().is_empty() {
            metrics.record_response_empty();
            return ActionOutcome::Empty;
        }

        let envelope = match ActionEnvelope::parse(&reply.body) {
            Ok(envelope) => envelope,
            Err(err) => {
                metrics.record_response_malformed();
                warn!("{} {url} returned malformed json: {err}", category_action());
                return ActionOutcome::Malformed(err);
            }
        };
        if !envelope.is_ok() {
            metrics.record_response_rejected();
            debug!(
                "{} {url} rejected with result '{}'",
                category_action(),
                envelope.result
            );
            return ActionOutcome::Rejected(envelope.result);
        }

        let report = self.inner.interpreter.execute_batch(&envelope.cmds);
        metrics.record_response_applied();
        debug!(
            "{} {url} applied={} skipped={}",
            category_action(),
            report.applied,
            report.skipped
        );
        if report.html_replaced {
            self.sync_moving_panels();
        }
        ActionOutcome::Applied(report)
    }
}
