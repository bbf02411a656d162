//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{config::Settings, HttpCarApi};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Starts the worker thread. It exits once every command sender is dropped.
pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: Settings,
    repaint: egui::Context,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let fail_startup = |message: String| {
            tracing::error!("{message}");
            let _ = ui_tx.send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                message,
            )));
            repaint.request_repaint();
        };

        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                fail_startup(format!(
                    "backend worker startup failure: failed to build backend runtime: {err}"
                ));
                return;
            }
        };

        let api = match HttpCarApi::from_settings(&settings) {
            Ok(api) => Arc::new(api),
            Err(err) => {
                fail_startup(format!("backend worker startup failure: {err}"));
                return;
            }
        };

        tracing::info!(api_base_url = %api.base_url(), "backend worker ready");
        let _ = ui_tx.send(UiEvent::Info(format!("Using car api at {}", api.base_url())));
        repaint.request_repaint();

        while let Ok(cmd) = cmd_rx.recv() {
            tracing::debug!(command = cmd.name(), "backend: received command");
            match cmd {
                BackendCommand::Execute(request) => {
                    let api = Arc::clone(&api);
                    let ui_tx = ui_tx.clone();
                    let repaint = repaint.clone();
                    runtime.spawn(async move {
                        let action = client_core::execute(api.as_ref(), request).await;
                        if ui_tx.send(UiEvent::Completed(action)).is_err() {
                            tracing::debug!("ui event channel closed; dropping completion");
                            return;
                        }
                        repaint.request_repaint();
                    });
                }
            }
        }

        tracing::info!("backend worker shutting down");
    })
}
