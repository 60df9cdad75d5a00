//! UI layer for the admin GUI: app shell, dialogs and small widgets.

pub mod app;
pub mod dialogs;
pub mod widgets;

pub use app::{PostsAdminApp, StartupConfig};
