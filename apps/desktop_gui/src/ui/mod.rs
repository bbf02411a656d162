//! UI layer for desktop GUI: app shell and the widgets it is built from.

pub mod app;
pub mod widgets;

pub use app::DesktopGuiApp;
