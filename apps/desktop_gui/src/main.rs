mod backend_bridge;
mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use client_core::config::load_settings;
use crossbeam_channel::{bounded, unbounded};
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::DesktopGuiApp;

const COMMAND_QUEUE_DEPTH: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "car_roster_gui", about = "Desktop editor for the car database")]
struct StartupArgs {
    /// Base url of the car api; overrides config file and environment.
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = StartupArgs::parse();
    let settings = load_settings()
        .context("failed to load settings")?
        .with_api_base_url(args.api_url)
        .context("invalid --api-url")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(COMMAND_QUEUE_DEPTH);
    // Completions must never be dropped or the view state would wait forever.
    let (ui_tx, ui_rx) = unbounded::<UiEvent>();
    let api_base_url = settings.api_base_url.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Car CRUD App")
            .with_inner_size([720.0, 820.0])
            .with_min_inner_size([480.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Car CRUD App",
        options,
        Box::new(move |cc| {
            backend_bridge::runtime::launch(cmd_rx, ui_tx, settings, cc.egui_ctx.clone());
            Ok(Box::new(DesktopGuiApp::new(cmd_tx, ui_rx, api_base_url)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("desktop gui exited with error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_flag_is_optional() {
        let args = StartupArgs::try_parse_from(["car_roster_gui"]).expect("parse");
        assert_eq!(args.api_url, None);

        let args =
            StartupArgs::try_parse_from(["car_roster_gui", "--api-url", "http://127.0.0.1:8000"])
                .expect("parse");
        assert_eq!(args.api_url.as_deref(), Some("http://127.0.0.1:8000"));
    }
}
