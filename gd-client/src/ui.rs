use crate::gauge::GaugeView;

/// Panel families the push channel refreshes as a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelClass {
    Sensor,
    Thermostat,
    Shading,
    Other,
}

impl PanelClass {
    pub fn as_str(self) -> &'static str {
        match self {
            PanelClass::Sensor => "sensor",
            PanelClass::Thermostat => "thermostat",
            PanelClass::Shading => "shading",
            PanelClass::Other => "other",
        }
    }
}

/// Everything the sync engine needs from the rendering side.
///
/// Panel ids are bare ids (`7`), never action ids (`b-7`) or container ids
/// (`pc-7`). Implementations are called from tokio tasks and must not block.
pub trait UiPort: Send + Sync {
    /// Replaces the inner markup of every element matching `selector`.
    fn apply_html(&self, selector: &str, html: &str);

    fn navigate(&self, url: &str);

    fn reload(&self);

    /// Binds controls and widgets in freshly injected markup.
    fn reinitialize_widgets(&self);

    fn panel_exists(&self, panel_id: &str) -> bool;

    fn panels(&self, class: PanelClass) -> Vec<String>;

    /// Set-point currently displayed by a thermostat gauge, in °C.
    fn thermostat_setpoint(&self, panel_id: &str) -> Option<f64>;

    fn show_setpoint(&self, panel_id: &str, gauge: &GaugeView);

    /// Shading panels rendered in a moving state that have not been asked
    /// for a position update yet. Each id is reported once.
    fn moving_panels(&self) -> Vec<String> {
        Vec::new()
    }
}
