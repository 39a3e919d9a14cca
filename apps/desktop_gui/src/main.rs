use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{load_settings, HttpNarrationClient, SharedNarrationService};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{NarratorApp, PersistedNarratorSettings, SETTINGS_STORAGE_KEY};

#[derive(Parser, Debug)]
#[command(name = "narrator-gui", about = "Desktop front end for the narration service")]
struct Args {
    /// Settings file; defaults to ./narrator.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured narration endpoint.
    #[arg(long)]
    endpoint_url: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let settings =
        load_settings(args.config.as_deref())?.with_endpoint_override(args.endpoint_url);
    settings.validate().context("invalid endpoint override")?;
    tracing::info!(endpoint = %settings.endpoint_url, "starting narrator GUI");

    let service: SharedNarrationService = Arc::new(HttpNarrationClient::from_settings(&settings)?);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, service);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Book Narrator")
            .with_inner_size([900.0, 720.0])
            .with_min_inner_size([560.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Book Narrator",
        options,
        Box::new(move |cc| {
            let persisted = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedNarratorSettings>(&text).ok())
            });
            Ok(Box::new(NarratorApp::new(
                cmd_tx,
                ui_rx,
                &settings,
                persisted,
            )))
        }),
    )
    .map_err(|err| anyhow!("desktop GUI exited with error: {err}"))
}
