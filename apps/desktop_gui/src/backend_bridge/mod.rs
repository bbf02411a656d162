//! Worker thread that runs car api requests off the UI thread.

pub mod commands;
pub mod runtime;
