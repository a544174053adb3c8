use std::sync::Arc;

use tracing::debug;
use wire::Command;

use crate::{logging::category_ui, metrics::SyncMetrics, ui::UiPort};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub applied: usize,
    pub skipped: usize,
    pub html_replaced: bool,
}

/// Executes server UI commands against a [`UiPort`].
#[derive(Clone)]
pub struct CommandInterpreter {
    ui: Arc<dyn UiPort>,
    metrics: Arc<SyncMetrics>,
}

impl CommandInterpreter {
    pub fn new(ui: Arc<dyn UiPort>, metrics: Arc<SyncMetrics>) -> Self {
        Self { ui, metrics }
    }

    /// Decodes and applies one raw command. Undecodable input is skipped.
    pub fn execute(&self, raw: &str) -> Option<Command> {
        match Command::parse(raw) {
            Ok(command) => {
                self.apply(&command);
                self.metrics.record_command_applied();
                Some(command)
            }
            Err(err) => {
                self.metrics.record_command_skipped();
                debug!("{} skipped command: {err}", category_ui());
                None
            }
        }
    }

    pub fn apply(&self, command: &Command) {
        match command {
            Command::SetHtml { selector, content } => {
                self.ui.apply_html(selector, content);
                self.ui.reinitialize_widgets();
            }
            Command::LoadPage { url } => self.ui.navigate(url),
            Command::RefreshPage => self.ui.reload(),
        }
    }

    /// Runs a batch strictly in order; one bad entry never stops the rest.
    pub fn execute_batch<I, S>(&self, raw_commands: I) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = BatchReport::default();
        for raw in raw_commands {
            match self.execute(raw.as_ref()) {
                Some(command) => {
                    report.applied += 1;
                    if matches!(command, Command::SetHtml { .. }) {
                        report.html_replaced = true;
                    }
                }
                None => report.skipped += 1,
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{gauge::GaugeView, ui::PanelClass};

    #[derive(Default)]
    struct TraceUi {
        calls: Mutex<Vec<String>>,
    }

    impl TraceUi {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn push(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl UiPort for TraceUi {
        fn apply_html(&self, selector: &str, html: &str) {
            self.push(format!("html {selector} {html}"));
        }

        fn navigate(&self, url: &str) {
            self.push(format!("navigate {url}"));
        }

        fn reload(&self) {
            self.push("reload".to_string());
        }

        fn reinitialize_widgets(&self) {
            self.push("reinit".to_string());
        }

        fn panel_exists(&self, _panel_id: &str) -> bool {
            false
        }

        fn panels(&self, _class: PanelClass) -> Vec<String> {
            Vec::new()
        }

        fn thermostat_setpoint(&self, _panel_id: &str) -> Option<f64> {
            None
        }

        fn show_setpoint(&self, _panel_id: &str, _gauge: &GaugeView) {}
    }

    fn interpreter() -> (CommandInterpreter, Arc<TraceUi>, Arc<SyncMetrics>) {
        let ui = Arc::new(TraceUi::default());
        let metrics = Arc::new(SyncMetrics::default());
        (
            CommandInterpreter::new(ui.clone(), metrics.clone()),
            ui,
            metrics,
        )
    }

    #[test]
    fn sethtml_replaces_markup_then_reinitializes() {
        let (interpreter, ui, _) = interpreter();
        let command = Command::SetHtml {
            selector: "#pc-4".to_string(),
            content: "<b>Hőmérséklet: 21,5 °C</b>".to_string(),
        };
        interpreter.execute(&command.encode());
        assert_eq!(
            ui.calls(),
            vec!["html #pc-4 <b>Hőmérséklet: 21,5 °C</b>", "reinit"]
        );
    }

    #[test]
    fn garbage_is_a_silent_noop() {
        let (interpreter, ui, metrics) = interpreter();
        assert!(interpreter.execute("").is_none());
        assert!(interpreter.execute("launch:missiles").is_none());
        assert!(interpreter.execute("sethtml:%%%:%%%").is_none());
        assert!(ui.calls().is_empty());
        assert_eq!(metrics.snapshot().commands_skipped_total, 3);
    }

    #[test]
    fn batch_keeps_order_and_skips_bad_entries() {
        let (interpreter, ui, metrics) = interpreter();
        let batch = vec![
            Command::SetHtml {
                selector: "#pc-1".to_string(),
                content: "one".to_string(),
            }
            .encode(),
            "bogus".to_string(),
            Command::LoadPage {
                url: "/page/cellar".to_string(),
            }
            .encode(),
            Command::RefreshPage.encode(),
        ];
        let report = interpreter.execute_batch(&batch);
        assert_eq!(
            report,
            BatchReport {
                applied: 3,
                skipped: 1,
                html_replaced: true,
            }
        );
        assert_eq!(
            ui.calls(),
            vec!["html #pc-1 one", "reinit", "navigate /page/cellar", "reload"]
        );
        assert_eq!(metrics.snapshot().commands_applied_total, 3);
    }
}
