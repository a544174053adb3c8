use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};
use wire::ActionRoute;

use crate::{
    action::{ActionOutcome, PanelActionClient},
    config::{ClientConfig, ConfigError},
    controls::Control,
    live_channel::LiveInvalidationChannel,
    logging::{category_action, category_push},
    metrics::{MetricsSnapshot, SyncMetrics},
    registry::{RequestHandle, RequestRegistry},
    thermostat::ThermostatReconciler,
    transport::{HttpTransport, Transport},
    ui::UiPort,
};

/// One dashboard session: owns the registry, the reconciler and the push
/// channel, and routes control gestures to them.
#[derive(Clone)]
pub struct Dashboard {
    config: Arc<ClientConfig>,
    metrics: Arc<SyncMetrics>,
    registry: Arc<RequestRegistry>,
    actions: PanelActionClient,
    thermostat: ThermostatReconciler,
    live: LiveInvalidationChannel,
}

impl Dashboard {
    /// Builds a session on top of an arbitrary action transport.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        ui: Arc<dyn UiPort>,
    ) -> Result<Self, ConfigError> {
        Self::assemble(config, transport, reqwest::Client::new(), ui)
    }

    /// Builds a session that talks HTTP for both actions and push.
    pub fn connect(config: ClientConfig, ui: Arc<dyn UiPort>) -> Result<Self, ConfigError> {
        let http = reqwest::Client::new();
        let transport = Arc::new(HttpTransport::with_client(
            http.clone(),
            config.request_timeout(),
        ));
        Self::assemble(config, transport, http, ui)
    }

    fn assemble(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        http: reqwest::Client,
        ui: Arc<dyn UiPort>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let config = Arc::new(config);
        let metrics = Arc::new(SyncMetrics::default());
        let registry = Arc::new(RequestRegistry::new(metrics.clone()));
        let actions = PanelActionClient::new(
            config.clone(),
            transport,
            registry.clone(),
            ui.clone(),
            metrics.clone(),
        );
        let thermostat =
            ThermostatReconciler::new(actions.clone(), ui.clone(), config.thermostat_debounce());
        let live = LiveInvalidationChannel::new(
            config.clone(),
            http,
            actions.clone(),
            thermostat.clone(),
            ui,
            metrics.clone(),
        );
        Ok(Self {
            config,
            metrics,
            registry,
            actions,
            thermostat,
            live,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<RequestRegistry> {
        &self.registry
    }

    pub fn actions(&self) -> &PanelActionClient {
        &self.actions
    }

    pub fn thermostat(&self) -> &ThermostatReconciler {
        &self.thermostat
    }

    pub fn live_channel(&self) -> &LiveInvalidationChannel {
        &self.live
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Dispatches a gesture. Thermostat steps are debounced and return no
    /// handle; everything else starts a request right away.
    pub fn activate(&self, control: Control) -> Option<RequestHandle<ActionOutcome>> {
        match control {
            Control::Action(route) => Some(self.actions.send(route)),
            Control::ShadingMove { group, direction } => {
                self.cancel_group(&group);
                Some(
                    self.actions
                        .send(ActionRoute::new(group).with_suffix(direction.suffix())),
                )
            }
            Control::ShadingStop { group } => {
                self.cancel_group(&group);
                Some(self.actions.send(ActionRoute::new(group).with_suffix("stop")))
            }
            Control::ThermostatStep { panel_id, step } => {
                self.thermostat.click(&panel_id, step);
                None
            }
            Control::Clock { panel_id, value } => Some(self.actions.send(ActionRoute::clock(
                &panel_id,
                value.hour(),
                value.minute(),
            ))),
        }
    }

    /// Requests a fresh rendering of each panel; returns how many were asked.
    pub fn refresh_panels<I, S>(&self, panel_ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut count = 0;
        for panel_id in panel_ids {
            self.actions.refresh_panel(panel_id.as_ref());
            count += 1;
        }
        count
    }

    /// Starts the push subscription when enabled.
    pub fn start_live_channel(&self) -> Option<JoinHandle<()>> {
        if !self.config.push_enabled {
            info!("{} live updates disabled", category_push());
            return None;
        }
        Some(self.live.start(self.config.subscription()))
    }

    /// Cancels outstanding work; pending thermostat edits are dropped.
    pub fn shutdown(&self) {
        let abandoned = self.thermostat.abandon_all();
        debug!(
            "{} shutting down with {} pending request(s) and {abandoned} unconfirmed edit(s)",
            category_action(),
            self.registry.pending_count()
        );
    }

    fn cancel_group(&self, group: &str) {
        let cancelled = self.registry.cancel_all(group);
        if cancelled > 0 {
            debug!(
                "{} {group}: cancelled {cancelled} outstanding request(s)",
                category_action()
            );
        }
    }
}
