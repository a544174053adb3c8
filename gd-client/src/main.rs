use std::{env, sync::Arc};

use client::{
    ClientConfig, ConsoleUi, Control, Dashboard, PanelClass, init_logging,
};
use tracing::{info, warn};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = match parse_cli_args() {
        Ok(CliAction::Run(cli)) => *cli,
        Ok(CliAction::Help) => {
            print_cli_help();
            return Ok(());
        }
        Ok(CliAction::Version) => {
            println!("{}", binary_version_text());
            return Ok(());
        }
        Err(err) => {
            eprintln!("error: {err}\n");
            print_cli_help();
            return Err(err.into());
        }
    };

    init_logging()?;
    info!("{}", binary_version_text());

    let mut config = ClientConfig::default();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    config.push_enabled = cli.push || cli.push_url.is_some();
    config.push_url = cli.push_url;
    if let Some(port) = cli.push_port {
        config.push_port = port;
    }
    config.push_reconnect = !cli.no_reconnect;
    if let Some(channel_id) = cli.channel_id {
        config.channel_id = channel_id;
    }
    if !cli.topics.is_empty() {
        config.topics = cli.topics;
    }
    if let Some(debounce_ms) = cli.thermostat_debounce_ms {
        config.thermostat_debounce_ms = debounce_ms;
    }
    config.request_timeout_ms = cli.request_timeout_ms;

    let ui = Arc::new(ConsoleUi::new());
    for panel_id in cli.sensors {
        ui.register_panel(panel_id, PanelClass::Sensor);
    }
    for panel_id in cli.shadings {
        ui.register_panel(panel_id, PanelClass::Shading);
    }
    for panel_id in cli.panels {
        ui.register_panel(panel_id, PanelClass::Other);
    }
    for (panel_id, celsius) in cli.thermostats {
        ui.register_thermostat(panel_id, celsius);
    }

    let dashboard = Dashboard::connect(config, ui.clone())?;
    info!(
        "dashboard at {} channel_id={}",
        dashboard.config().base_url,
        dashboard.config().channel_id
    );

    let live = dashboard.start_live_channel();
    for button_id in &cli.presses {
        if let Some(handle) = dashboard.activate(Control::press(button_id)) {
            let outcome = handle.wait().await;
            info!("{button_id}: {outcome:?}");
        }
    }

    tokio::signal::ctrl_c().await?;
    if let Some(live) = live {
        live.abort();
    }
    dashboard.shutdown();
    if let Some(location) = ui.location() {
        info!("last page requested by the server: {location}");
    }
    match serde_json::to_string(&dashboard.metrics()) {
        Ok(snapshot) => info!("metrics {snapshot}"),
        Err(err) => warn!("failed to encode metrics: {err}"),
    }
    Ok(())
}

#[derive(Clone, Debug, Default)]
struct CliArgs {
    base_url: Option<String>,
    push: bool,
    push_url: Option<String>,
    push_port: Option<u16>,
    no_reconnect: bool,
    channel_id: Option<String>,
    topics: Vec<String>,
    thermostat_debounce_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    sensors: Vec<String>,
    thermostats: Vec<(String, f64)>,
    shadings: Vec<String>,
    panels: Vec<String>,
    presses: Vec<String>,
}

enum CliAction {
    Run(Box<CliArgs>),
    Help,
    Version,
}

fn parse_cli_args() -> Result<CliAction, String> {
    let mut args = env::args().skip(1).peekable();
    let mut cli = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliAction::Help),
            "-V" | "--version" => return Ok(CliAction::Version),
            "--base-url" => {
                cli.base_url = Some(next_arg_value("--base-url", &mut args)?);
            }
            "--push" => cli.push = true,
            "--push-url" => {
                cli.push_url = Some(next_arg_value("--push-url", &mut args)?);
            }
            "--push-port" => {
                let value = next_arg_value("--push-port", &mut args)?;
                cli.push_port = Some(
                    value
                        .parse::<u16>()
                        .map_err(|_| format!("invalid --push-port: {value}"))?,
                );
            }
            "--no-reconnect" => cli.no_reconnect = true,
            "--channel-id" => {
                let value = next_arg_value("--channel-id", &mut args)?;
                let parsed = Uuid::parse_str(&value)
                    .map_err(|_| format!("--channel-id must be a valid UUID, got: {value}"))?;
                cli.channel_id = Some(parsed.to_string());
            }
            "--topic" => {
                cli.topics.push(next_arg_value("--topic", &mut args)?);
            }
            "--thermostat-debounce-ms" => {
                let value = next_arg_value("--thermostat-debounce-ms", &mut args)?;
                cli.thermostat_debounce_ms = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("invalid --thermostat-debounce-ms: {value}"))?,
                );
            }
            "--request-timeout-ms" => {
                let value = next_arg_value("--request-timeout-ms", &mut args)?;
                cli.request_timeout_ms = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("invalid --request-timeout-ms: {value}"))?,
                );
            }
            "--sensor" => {
                cli.sensors.push(next_arg_value("--sensor", &mut args)?);
            }
            "--thermostat" => {
                let value = next_arg_value("--thermostat", &mut args)?;
                cli.thermostats.push(parse_thermostat(&value)?);
            }
            "--shading" => {
                cli.shadings.push(next_arg_value("--shading", &mut args)?);
            }
            "--panel" => {
                cli.panels.push(next_arg_value("--panel", &mut args)?);
            }
            "--press" => {
                cli.presses.push(next_arg_value("--press", &mut args)?);
            }
            _ => {
                return Err(format!("unknown argument: {arg}"));
            }
        }
    }
    Ok(CliAction::Run(Box::new(cli)))
}

/// `ID=CELSIUS`, or a bare `ID` starting at 20 °C.
fn parse_thermostat(value: &str) -> Result<(String, f64), String> {
    let (panel_id, celsius) = match value.split_once('=') {
        Some((panel_id, celsius)) => (
            panel_id,
            celsius
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid --thermostat temperature: {value}"))?,
        ),
        None => (value, 20.0),
    };
    let panel_id = panel_id.trim();
    if panel_id.is_empty() {
        return Err(format!("invalid --thermostat panel id: {value}"));
    }
    Ok((panel_id.to_string(), celsius))
}

fn next_arg_value(
    flag: &str,
    args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
) -> Result<String, String> {
    let value = args
        .next()
        .ok_or_else(|| format!("missing value for {flag}"))?;
    if value.trim().is_empty() {
        return Err(format!("value for {flag} cannot be empty"));
    }
    Ok(value)
}

fn print_cli_help() {
    eprintln!(concat!(
        "Usage: gd-client [options]\n\n",
        "Options:\n",
        "  --base-url <URL>                Dashboard server (default: http://127.0.0.1)\n",
        "  --push                          Subscribe to live updates\n",
        "  --push-url <URL>                Push server base URL (implies --push)\n",
        "  --push-port <PORT>              Push port on the dashboard host (default: 8080)\n",
        "  --no-reconnect                  Leave live updates off after a disconnect\n",
        "  --channel-id <UUID>             Session channel id (default: random)\n",
        "  --topic <NAME>                  Push topic, repeatable (default: thermostat, sensors, panelupd)\n",
        "  --thermostat-debounce-ms <MS>   Quiet period before a set-point is sent (default: 6000)\n",
        "  --request-timeout-ms <MS>       Per-request timeout for actions (default: none)\n",
        "  --sensor <ID>                   Register a sensor panel, repeatable\n",
        "  --thermostat <ID[=CELSIUS]>     Register a thermostat panel, repeatable\n",
        "  --shading <ID>                  Register a shading panel, repeatable\n",
        "  --panel <ID>                    Register any other panel, repeatable\n",
        "  --press <BUTTON_ID>             Press a button such as b-7-toggle at startup, repeatable\n",
        "  -V, --version                   Show version with git metadata\n",
        "  -h, --help                      Show this help\n"
    ));
}

fn binary_version_text() -> String {
    version_text(
        env!("CARGO_PKG_NAME"),
        option_env!("GD_BUILD_GIT_TAG").unwrap_or("untagged"),
        option_env!("GD_BUILD_GIT_COMMIT").unwrap_or("unknown"),
        option_env!("GD_BUILD_GIT_DIRTY").unwrap_or("false"),
        option_env!("GD_BUILD_TARGET").unwrap_or("unknown"),
    )
}

fn version_text(binary: &str, tag: &str, commit: &str, dirty: &str, target: &str) -> String {
    let dirty = matches!(dirty, "true" | "1" | "yes" | "dirty");
    if dirty {
        format!("{binary} {tag} [{target}] (dirty commit: {commit})")
    } else {
        format!("{binary} {tag} [{target}]")
    }
}
