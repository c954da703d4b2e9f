//! Presenta desktop client entry point.
//!
//! `presenta-app` boots the session (validate → refresh → profile) and
//! runs the state-routed shell. `presenta-app --shared <id>` instead
//! opens a publicly shared presentation with no session at all.

mod app;
mod export;
mod tasks;

use app::PresentaApp;
use eframe::egui;
use presenta_client::{bootstrap, ApiClient, BootOutcome};
use presenta_core::{AppConfig, SessionStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[presenta-app] .env not loaded: {e} (using system environment)");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().expect("load app config");
    let store = Arc::new(
        SessionStore::open_path(config.session_store_path()).expect("open session store"),
    );
    let client = Arc::new(ApiClient::new(&config, store).expect("build api client"));
    let background = tasks::Background::new().expect("start background runtime");

    let shared_id = {
        let mut args = std::env::args().skip(1);
        match args.next().as_deref() {
            Some("--shared") => args.next(),
            _ => None,
        }
    };

    // A shared-view launch skips the session bootstrap entirely.
    let boot = if shared_id.is_none() {
        background.block_on(bootstrap(&client))
    } else {
        BootOutcome::Unauthenticated
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1080.0, 760.0])
            .with_title("Presenta"),
        ..Default::default()
    };

    let app = PresentaApp::new(client, config, background, boot, shared_id);
    eframe::run_native("Presenta", options, Box::new(move |_cc| Ok(Box::new(app))))
}
