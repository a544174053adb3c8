mod action;
mod config;
mod console;
mod controls;
mod dashboard;
mod gauge;
mod interpreter;
mod live_channel;
mod logging;
mod metrics;
mod registry;
mod thermostat;
mod transport;
mod ui;

pub use wire::{
    ActionEnvelope, ActionRoute, Command, CommandError, DEFAULT_TOPICS, Opcode, PushMessage,
    RequestKind, Subscription,
};

pub use action::{ActionOutcome, PanelActionClient};
pub use config::{
    ClientConfig, ConfigError, DEFAULT_BASE_URL, DEFAULT_PUSH_BACKOFF_MAX_MS,
    DEFAULT_PUSH_BACKOFF_MIN_MS, DEFAULT_PUSH_PORT, DEFAULT_THERMOSTAT_DEBOUNCE_MS,
};
pub use console::ConsoleUi;
pub use controls::{ClockField, ClockValue, Control, ShadingDirection, SpinDirection};
pub use dashboard::Dashboard;
pub use gauge::{
    CELSIUS_PER_STEP, GaugeView, MAX_CELSIUS, MAX_FRAGVAL, MIN_CELSIUS, Setpoint, SetpointStep,
    arc_path, band_color,
};
pub use interpreter::{BatchReport, CommandInterpreter};
pub use live_channel::{
    LiveInvalidationChannel, MAX_PENDING_LINE_BYTES, PushError, ReconnectBackoff,
};
pub use logging::init as init_logging;
pub use metrics::{MetricsSnapshot, SyncMetrics};
pub use registry::{RequestHandle, RequestKey, RequestOutcome, RequestRegistry};
pub use thermostat::{EditPhase, ThermostatReconciler};
pub use transport::{HttpReply, HttpTransport, Transport, TransportError};
pub use ui::{PanelClass, UiPort};
