//! Command orchestration helpers from UI actions to backend command queue.

use client_core::Request;
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub const QUEUE_FULL: &str = "UI command queue is full; please retry";
pub const WORKER_DISCONNECTED: &str =
    "Backend command processor disconnected (possible startup/runtime failure)";

/// Queues `request` for the backend worker. When it cannot be queued the
/// request comes back so the caller can complete it as a failure.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    request: Request,
    status: &mut String,
) -> Result<(), (Request, &'static str)> {
    let cmd = BackendCommand::Execute(request);
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(BackendCommand::Execute(request))) => {
            *status = QUEUE_FULL.to_string();
            Err((request, QUEUE_FULL))
        }
        Err(TrySendError::Disconnected(BackendCommand::Execute(request))) => {
            *status = WORKER_DISCONNECTED.to_string();
            Err((request, WORKER_DISCONNECTED))
        }
    }
}
