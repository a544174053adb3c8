use std::{
    collections::{BTreeMap, HashMap},
    sync::Mutex,
};

use tracing::info;
use wire::PANEL_CONTAINER_PREFIX;

use crate::{
    gauge::GaugeView,
    logging::category_ui,
    ui::{PanelClass, UiPort},
};

/// Markup marker of a shade rendered while it is still travelling.
const MOVING_MARKER: &str = "justmove";

/// Headless [`UiPort`] that logs every mutation and keeps a small panel
/// model for the sync engine to query.
#[derive(Default)]
pub struct ConsoleUi {
    state: Mutex<ConsoleState>,
}

#[derive(Default)]
struct ConsoleState {
    panels: BTreeMap<String, PanelClass>,
    setpoints: HashMap<String, f64>,
    moving: Vec<String>,
    location: Option<String>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_panel(&self, panel_id: impl Into<String>, class: PanelClass) {
        self.lock().panels.insert(panel_id.into(), class);
    }

    pub fn register_thermostat(&self, panel_id: impl Into<String>, celsius: f64) {
        let panel_id = panel_id.into();
        let mut state = self.lock();
        state.panels.insert(panel_id.clone(), PanelClass::Thermostat);
        state.setpoints.insert(panel_id, celsius);
    }

    /// Last page requested through `loadpage`.
    pub fn location(&self) -> Option<String> {
        self.lock().location.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ConsoleState> {
        self.state.lock().expect("console ui lock poisoned")
    }
}

impl UiPort for ConsoleUi {
    fn apply_html(&self, selector: &str, html: &str) {
        info!(
            "{} {selector} <- {} bytes",
            category_ui(),
            html.len()
        );
        let Some(panel_id) = selector
            .strip_prefix('#')
            .and_then(|id| id.strip_prefix(PANEL_CONTAINER_PREFIX))
        else {
            return;
        };
        let mut state = self.lock();
        state
            .panels
            .entry(panel_id.to_string())
            .or_insert(PanelClass::Other);
        if html.contains(MOVING_MARKER) && !state.moving.iter().any(|id| id == panel_id) {
            state.moving.push(panel_id.to_string());
        }
    }

    fn navigate(&self, url: &str) {
        info!("{} navigate to {url}", category_ui());
        self.lock().location = Some(url.to_string());
    }

    fn reload(&self) {
        info!("{} reload requested", category_ui());
    }

    fn reinitialize_widgets(&self) {}

    fn panel_exists(&self, panel_id: &str) -> bool {
        self.lock().panels.contains_key(panel_id)
    }

    fn panels(&self, class: PanelClass) -> Vec<String> {
        self.lock()
            .panels
            .iter()
            .filter(|(_, known)| **known == class)
            .map(|(panel_id, _)| panel_id.clone())
            .collect()
    }

    fn thermostat_setpoint(&self, panel_id: &str) -> Option<f64> {
        self.lock().setpoints.get(panel_id).copied()
    }

    fn show_setpoint(&self, panel_id: &str, gauge: &GaugeView) {
        info!(
            "{} thermostat {panel_id} shows {} °C ({})",
            category_ui(),
            gauge.label,
            gauge.color
        );
        self.lock()
            .setpoints
            .insert(panel_id.to_string(), gauge.setpoint.celsius());
    }

    fn moving_panels(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().moving)
    }
}
