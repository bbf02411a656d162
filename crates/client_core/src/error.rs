use thiserror::Error;

use crate::{sink::FailureKind, state::FormField};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to car api failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("car api returned status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("unexpected car api response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("api base url '{0}' cannot carry the /cars path")]
    InvalidBaseUrl(String),
    #[error("{0} is required")]
    MissingField(FormField),
    #[error("a save request is already in flight")]
    Busy,
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Transport(_) => FailureKind::Transport,
            ClientError::Status { .. } => FailureKind::Status,
            ClientError::Decode(_) => FailureKind::Decode,
            ClientError::InvalidBaseUrl(_) | ClientError::MissingField(_) | ClientError::Busy => {
                FailureKind::Client
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
