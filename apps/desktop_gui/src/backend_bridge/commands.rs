//! Backend commands queued from UI to backend worker.

use client_core::Request;

#[derive(Debug)]
pub enum BackendCommand {
    /// Run one request; its completion comes back as `UiEvent::Completed`.
    Execute(Request),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Execute(request) => request.operation().as_str(),
        }
    }
}
