#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use client::{
    ActionEnvelope, ClientConfig, Command, Dashboard, GaugeView, HttpReply, PanelClass, Transport,
    TransportError, UiPort,
};

pub const BASE_URL: &str = "http://dash.test";
pub const CHANNEL_ID: &str = "0b5c3f2e-7d1a-4c55-9a0e-2f7d6c1b8a90";

#[derive(Clone)]
enum Scripted {
    Reply { reply: HttpReply, delay: Duration },
    Unreachable,
}

/// Transport that answers from a per-path script and records every URL.
///
/// Each path holds a queue; the last entry keeps answering once the
/// queue is down to one. Unscripted paths get an empty 200.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, path: &str, reply: HttpReply) {
        self.reply_after(path, Duration::ZERO, reply);
    }

    pub fn reply_after(&self, path: &str, delay: Duration, reply: HttpReply) {
        self.script(path, Scripted::Reply { reply, delay });
    }

    pub fn unreachable(&self, path: &str) {
        self.script(path, Scripted::Unreachable);
    }

    /// Requested URLs with the base stripped, in issue order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|url| url.trim_start_matches(BASE_URL).to_string())
            .collect()
    }

    /// Requested paths without their query strings.
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|url| url.split('?').next().unwrap_or_default().to_string())
            .collect()
    }

    fn script(&self, path: &str, entry: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(entry);
    }

    fn next_entry(&self, path: &str) -> Option<Scripted> {
        let mut routes = self.routes.lock().unwrap();
        let queue = routes.get_mut(path)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> Result<HttpReply, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        let path = url
            .trim_start_matches(BASE_URL)
            .split('?')
            .next()
            .unwrap_or_default()
            .to_string();
        match self.next_entry(&path) {
            Some(Scripted::Reply { reply, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(reply)
            }
            Some(Scripted::Unreachable) => Err(TransportError::Unreachable(path)),
            None => Ok(HttpReply::ok("")),
        }
    }
}

#[derive(Default)]
struct UiState {
    panels: Vec<(String, PanelClass)>,
    setpoints: HashMap<String, f64>,
    moving: Vec<String>,
    html: Vec<(String, String)>,
    shown: Vec<(String, String)>,
    navigations: Vec<String>,
    reloads: usize,
    reinits: usize,
}

/// UI port that records every call for assertions.
#[derive(Default)]
pub struct RecordingUi {
    state: Mutex<UiState>,
}

impl RecordingUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_panel(self: Arc<Self>, panel_id: &str, class: PanelClass) -> Arc<Self> {
        self.state
            .lock()
            .unwrap()
            .panels
            .push((panel_id.to_string(), class));
        self
    }

    pub fn with_thermostat(self: Arc<Self>, panel_id: &str, celsius: f64) -> Arc<Self> {
        self.state
            .lock()
            .unwrap()
            .setpoints
            .insert(panel_id.to_string(), celsius);
        self.with_panel(panel_id, PanelClass::Thermostat)
    }

    pub fn mark_moving(&self, panel_id: &str) {
        self.state.lock().unwrap().moving.push(panel_id.to_string());
    }

    /// `(selector, html)` pairs in application order.
    pub fn html(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().html.clone()
    }

    /// `(panel id, label)` of every gauge redraw.
    pub fn shown(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().shown.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn reloads(&self) -> usize {
        self.state.lock().unwrap().reloads
    }

    pub fn reinits(&self) -> usize {
        self.state.lock().unwrap().reinits
    }
}

impl UiPort for RecordingUi {
    fn apply_html(&self, selector: &str, html: &str) {
        self.state
            .lock()
            .unwrap()
            .html
            .push((selector.to_string(), html.to_string()));
    }

    fn navigate(&self, url: &str) {
        self.state.lock().unwrap().navigations.push(url.to_string());
    }

    fn reload(&self) {
        self.state.lock().unwrap().reloads += 1;
    }

    fn reinitialize_widgets(&self) {
        self.state.lock().unwrap().reinits += 1;
    }

    fn panel_exists(&self, panel_id: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .panels
            .iter()
            .any(|(known, _)| known == panel_id)
    }

    fn panels(&self, class: PanelClass) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .panels
            .iter()
            .filter(|(_, known)| *known == class)
            .map(|(panel_id, _)| panel_id.clone())
            .collect()
    }

    fn thermostat_setpoint(&self, panel_id: &str) -> Option<f64> {
        self.state.lock().unwrap().setpoints.get(panel_id).copied()
    }

    fn show_setpoint(&self, panel_id: &str, gauge: &GaugeView) {
        let mut state = self.state.lock().unwrap();
        state
            .setpoints
            .insert(panel_id.to_string(), gauge.setpoint.celsius());
        state
            .shown
            .push((panel_id.to_string(), gauge.label.clone()));
    }

    fn moving_panels(&self) -> Vec<String> {
        std::mem::take(&mut self.state.lock().unwrap().moving)
    }
}

pub fn test_config() -> ClientConfig {
    let mut config = ClientConfig::new(BASE_URL);
    config.channel_id = CHANNEL_ID.to_string();
    config
}

pub fn dashboard(transport: &Arc<FakeTransport>, ui: &Arc<RecordingUi>) -> Dashboard {
    Dashboard::new(test_config(), transport.clone(), ui.clone())
        .expect("test config should be valid")
}

/// 200 reply carrying an `ok` envelope with the given commands.
pub fn ok_reply(commands: &[Command]) -> HttpReply {
    let envelope = ActionEnvelope::ok(commands.iter().map(Command::encode).collect());
    HttpReply::ok(serde_json::to_string(&envelope).expect("envelope should encode"))
}

pub fn set_html(selector: &str, content: &str) -> Command {
    Command::SetHtml {
        selector: selector.to_string(),
        content: content.to_string(),
    }
}
