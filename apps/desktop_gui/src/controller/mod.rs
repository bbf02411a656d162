//! Controller layer: UI events, error classification, and command orchestration.
//! State transitions live in `client_core::ViewState`.

pub mod events;
pub mod orchestration;
