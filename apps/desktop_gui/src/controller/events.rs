//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{Action, Failure, FailureKind, Operation};

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    /// A request finished; feed it back through the view state.
    Completed(Action),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Server,
    Decode,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadCars,
    SaveCar,
    DeleteCar,
}

impl From<Operation> for UiErrorContext {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::List => UiErrorContext::LoadCars,
            Operation::Create | Operation::Update => UiErrorContext::SaveCar,
            Operation::Delete => UiErrorContext::DeleteCar,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_failure(failure: &Failure) -> Self {
        let category = match (failure.kind, failure.status) {
            (FailureKind::Transport, _) => UiErrorCategory::Transport,
            (FailureKind::Decode, _) => UiErrorCategory::Decode,
            (FailureKind::Status, Some(400 | 422)) => UiErrorCategory::Validation,
            (FailureKind::Status, _) => UiErrorCategory::Server,
            (FailureKind::Client, _) => UiErrorCategory::Unknown,
        };
        Self {
            category,
            context: failure.operation.into(),
            message: failure.summary(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("must use http")
            || message_lower.contains("required")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("disconnect")
            || message_lower.contains("queue is full")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// One line on what the user can do about it.
    pub fn hint(&self) -> &'static str {
        match (self.context, self.category) {
            (UiErrorContext::BackendStartup, _) => {
                "Backend worker failed to start; check the api url and restart."
            }
            (_, UiErrorCategory::Transport) => {
                "Car api unreachable; check the api url or network and retry."
            }
            (_, UiErrorCategory::Validation) => {
                "The car api rejected the values; fix the form and retry."
            }
            (_, UiErrorCategory::Decode) => "The car api answered with something unexpected.",
            (_, UiErrorCategory::Server) => "The car api reported an error.",
            (_, UiErrorCategory::Unknown) => "Something went wrong.",
        }
    }
}
