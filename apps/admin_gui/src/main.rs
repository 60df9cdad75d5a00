use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{
    config::{normalize_api_base_url, SETTINGS_FILE_NAME},
    load_settings,
};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::app::{PersistedAdminSettings, SETTINGS_STORAGE_KEY};
use crate::ui::{PostsAdminApp, StartupConfig};

#[derive(Debug, Parser)]
#[command(name = "admin_gui", about = "Desktop admin for blog posts")]
struct Args {
    /// Overrides the configured API base URL.
    #[arg(long)]
    api_base_url: Option<String>,
    /// Start location, e.g. `?tag=love&skip=10`.
    #[arg(long)]
    location: Option<String>,
    /// Explicit settings file; otherwise the working and user config dirs are searched.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn settings_candidates(explicit: Option<PathBuf>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    candidates.extend(explicit);
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(SETTINGS_FILE_NAME));
    }
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("posts_admin").join(SETTINGS_FILE_NAME));
    }
    candidates
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut settings = load_settings(&settings_candidates(args.config));
    if let Some(url) = args.api_base_url {
        settings.api_base_url = normalize_api_base_url(&url);
    }
    tracing::info!(
        api_base_url = %settings.api_base_url,
        default_limit = settings.default_limit,
        "settings loaded"
    );

    let startup = StartupConfig {
        api_base_url: settings.api_base_url.clone(),
        default_limit: settings.default_limit,
        location: args.location,
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Posts Admin")
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([860.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Posts Admin",
        options,
        Box::new(|cc| {
            let persisted = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedAdminSettings>(&text).ok())
            });
            Ok(Box::new(PostsAdminApp::new(startup, cmd_tx, ui_rx, persisted)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("admin gui exited with error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_is_searched_first() {
        let candidates = settings_candidates(Some(PathBuf::from("/tmp/custom.toml")));
        assert_eq!(candidates[0], PathBuf::from("/tmp/custom.toml"));
        assert!(candidates
            .iter()
            .skip(1)
            .all(|path| path.ends_with(SETTINGS_FILE_NAME)));
    }

    #[test]
    fn parses_cli_overrides() {
        let args = Args::parse_from([
            "admin_gui",
            "--api-base-url",
            "localhost:3000",
            "--location",
            "?tag=love",
        ]);
        assert_eq!(args.api_base_url.as_deref(), Some("localhost:3000"));
        assert_eq!(args.location.as_deref(), Some("?tag=love"));
        assert!(args.config.is_none());
    }
}
