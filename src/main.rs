mod app;

use std::path::PathBuf;

use anyhow::{Context, Result};
use canvas_notes::config::{default_config_path, load_config, Config};
use canvas_notes::{CanvasSession, Repository};
use clap::Parser;
use eframe::egui;

#[derive(Parser)]
#[command(name = "canvas-notes")]
#[command(about = "Notebooks of infinite canvases with text boxes and images")]
#[command(version)]
struct Args {
    /// Directory holding the notebooks
    #[arg(long)]
    root: Option<PathBuf>,

    /// Notebook to open at startup
    #[arg(long)]
    notebook: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("canvas_notes=info")),
        )
        .init();

    let args = Args::parse();

    let config = match args.config.clone().or_else(default_config_path) {
        Some(path) => load_config(&path).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "using default settings");
            Config::default()
        }),
        None => Config::default(),
    };

    let root = args.root.unwrap_or_else(|| config.notebooks_root());
    std::fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create notebook directory {}", root.display()))?;
    tracing::info!(root = %root.display(), "using notebook root");

    let (text_width, text_height) = config.text_size();
    let mut session =
        CanvasSession::new(Repository::new(root)).with_default_text_size(text_width, text_height);
    if let Some(name) = &args.notebook {
        session
            .open_notebook(name)
            .with_context(|| format!("Failed to open notebook {name:?}"))?;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("canvas-notes"),
        ..Default::default()
    };

    eframe::run_native(
        "canvas-notes",
        options,
        Box::new(move |_cc| Ok(Box::new(app::NotesApp::new(session)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run eframe: {e}"))
}
