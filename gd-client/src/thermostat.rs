use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::task::AbortHandle;
use tracing::{debug, info, warn};
use wire::ActionRoute;

use crate::{
    action::{ActionOutcome, PanelActionClient},
    gauge::{GaugeView, Setpoint, SetpointStep},
    logging::category_thermostat,
    registry::{RequestKey, RequestOutcome},
    ui::UiPort,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditPhase {
    /// Clicks are still coming in; the debounce timer is running.
    Editing,
    /// The final value was sent and its reply is outstanding.
    Confirming,
}

struct EditState {
    setpoint: Setpoint,
    seq: u64,
    phase: EditPhase,
    timer: AbortHandle,
    confirm: Option<(RequestKey, u64)>,
}

/// Debounces set-point clicks and keeps push refreshes away from panels
/// that are being edited.
#[derive(Clone)]
pub struct ThermostatReconciler {
    inner: Arc<ReconcilerInner>,
}

struct ReconcilerInner {
    actions: PanelActionClient,
    ui: Arc<dyn UiPort>,
    debounce: Duration,
    edits: Mutex<HashMap<String, EditState>>,
    sequence: AtomicU64,
}

impl ThermostatReconciler {
    pub fn new(actions: PanelActionClient, ui: Arc<dyn UiPort>, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(ReconcilerInner {
                actions,
                ui,
                debounce,
                edits: Mutex::new(HashMap::new()),
                sequence: AtomicU64::new(0),
            }),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.inner.debounce
    }

    /// Moves the displayed set-point one step and restarts the debounce.
    ///
    /// Returns the new local value, or `None` when the panel shows no
    /// readable set-point.
    pub fn click(&self, panel_id: &str, step: SetpointStep) -> Option<Setpoint> {
        let mut edits = self.inner.edits.lock().expect("thermostat edits lock poisoned");
        let base = match edits.get(panel_id) {
            Some(edit) => edit.setpoint,
            None => match self.inner.ui.thermostat_setpoint(panel_id) {
                Some(celsius) => Setpoint::from_celsius(celsius),
                None => {
                    warn!(
                        "{} panel {panel_id} has no readable set-point",
                        category_thermostat()
                    );
                    return None;
                }
            },
        };
        let next = base.step(step);
        self.inner.ui.show_setpoint(panel_id, &GaugeView::new(next));

        let seq = self.inner.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(previous) = edits.remove(panel_id) {
            previous.timer.abort();
            if let Some((key, ticket)) = previous.confirm {
                self.inner.actions.registry().cancel_ticket(&key, ticket);
                debug!(
                    "{} panel {panel_id} edited again while confirming",
                    category_thermostat()
                );
            }
        }

        let reconciler = self.clone();
        let timer_panel = panel_id.to_string();
        let debounce = self.inner.debounce;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            reconciler.confirm(timer_panel, seq).await;
        });
        edits.insert(
            panel_id.to_string(),
            EditState {
                setpoint: next,
                seq,
                phase: EditPhase::Editing,
                timer: timer.abort_handle(),
                confirm: None,
            },
        );
        debug!(
            "{} panel {panel_id} pending {} °C",
            category_thermostat(),
            next.label()
        );
        Some(next)
    }

    /// True while any thermostat has an unconfirmed edit.
    pub fn is_suppressed(&self) -> bool {
        !self
            .inner
            .edits
            .lock()
            .expect("thermostat edits lock poisoned")
            .is_empty()
    }

    pub fn phase(&self, panel_id: &str) -> Option<EditPhase> {
        self.inner
            .edits
            .lock()
            .expect("thermostat edits lock poisoned")
            .get(panel_id)
            .map(|edit| edit.phase)
    }

    pub fn pending(&self, panel_id: &str) -> Option<Setpoint> {
        self.inner
            .edits
            .lock()
            .expect("thermostat edits lock poisoned")
            .get(panel_id)
            .map(|edit| edit.setpoint)
    }

    /// Drops every edit without confirming it.
    pub fn abandon_all(&self) -> usize {
        let mut edits = self.inner.edits.lock().expect("thermostat edits lock poisoned");
        for edit in edits.values() {
            edit.timer.abort();
            if let Some((key, ticket)) = &edit.confirm {
                self.inner.actions.registry().cancel_ticket(key, *ticket);
            }
        }
        let count = edits.len();
        edits.clear();
        count
    }

    async fn confirm(&self, panel_id: String, seq: u64) {
        let (handle, setpoint) = {
            let mut edits = self.inner.edits.lock().expect("thermostat edits lock poisoned");
            let Some(edit) = edits.get_mut(&panel_id) else {
                return;
            };
            if edit.seq != seq {
                return;
            }
            edit.phase = EditPhase::Confirming;
            let handle = self
                .inner
                .actions
                .send(ActionRoute::setpoint(&panel_id, &edit.setpoint.label()));
            edit.confirm = Some((handle.key().clone(), handle.ticket()));
            (handle, edit.setpoint)
        };
        info!(
            "{} panel {panel_id} confirming {} °C",
            category_thermostat(),
            setpoint.label()
        );

        let outcome = handle.wait().await;
        self.finish(&panel_id, seq, &outcome);
    }

    fn finish(&self, panel_id: &str, seq: u64, outcome: &RequestOutcome<ActionOutcome>) {
        {
            let mut edits = self.inner.edits.lock().expect("thermostat edits lock poisoned");
            if edits.get(panel_id).is_some_and(|edit| edit.seq == seq) {
                edits.remove(panel_id);
            }
        }
        match outcome {
            RequestOutcome::Completed(ActionOutcome::Applied(_)) => {
                info!("{} panel {panel_id} confirmed", category_thermostat());
            }
            RequestOutcome::Completed(other) => {
                warn!(
                    "{} panel {panel_id} confirmation ended {}; releasing push",
                    category_thermostat(),
                    other.label()
                );
            }
            RequestOutcome::Cancelled => {
                debug!(
                    "{} panel {panel_id} confirmation cancelled",
                    category_thermostat()
                );
            }
        }
    }
}
