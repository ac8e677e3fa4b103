//! A visual HTML form builder for `egui` written in Rust.

mod app;
mod codegen;
mod error;
mod field;
mod highlight;
mod project;
mod session;

use crate::app::FormBuilderApp;

use eframe::egui;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

const DEFAULT_LOG_FILTER: &str = "egui_form_builder=info";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

fn main() -> eframe::Result<()> {
    init_tracing();

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default()
        .with_title("egui Form Builder")
        .with_inner_size(egui::vec2(1280.0, 820.0))
        .with_min_inner_size(egui::vec2(900.0, 600.0))
        .with_resizable(true);

    tracing::info!("starting form builder");
    eframe::run_native(
        "egui Form Builder",
        native_options,
        Box::new(|_cc| Ok(Box::<FormBuilderApp>::default())),
    )
}
