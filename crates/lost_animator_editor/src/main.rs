// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lost Animator - sprite animation editor
//!
//! Headless entry point: loads the editor settings, opens the document
//! named on the command line (or starts an empty one) and reports what it
//! contains, including spritesheets whose images are missing.

use lost_animator_editor::config::{EditorConfig, CONFIG_FILE_NAME};
use lost_animator_editor::DocumentController;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_logging(default_directive: &str) {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    match default_directive.parse::<Directive>() {
        Ok(directive) => env_filter = env_filter.add_directive(directive),
        Err(e) => eprintln!("Ignoring log filter {default_directive:?}: {e}"),
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn report(doc: &DocumentController) {
    let file = doc.file();
    tracing::info!(
        "Document v{}: {} spritesheets, {} animations",
        file.version,
        file.spritesheets.len(),
        file.animations.len()
    );

    for sheet in &file.spritesheets {
        let grid = doc
            .spritesheet_image(&sheet.id)
            .map(|image| image.grid_dimensions(sheet));
        tracing::info!(
            "  spritesheet {} ({}x{} tiles) {:?} grid {:?}",
            sheet.name,
            sheet.tile_width,
            sheet.tile_height,
            sheet.image_path,
            grid
        );
    }

    for animation in &file.animations {
        let keys: usize = animation.tracks.iter().map(|t| t.keys.len()).sum();
        tracing::info!(
            "  animation {} ({:.2}s{}, {} tracks, {} keys)",
            animation.name,
            animation.duration,
            if animation.looping { ", looping" } else { "" },
            animation.tracks.len(),
            keys
        );
    }

    for broken in doc.broken_references() {
        tracing::warn!(
            "Spritesheet {} points at missing image {:?}",
            broken.name,
            broken.image_path
        );
    }
}

fn run(
    config: &EditorConfig,
    document: Option<&Path>,
) -> lost_animator_editor::file_service::Result<()> {
    let mut doc = DocumentController::with_config(config);
    match document {
        Some(path) => doc.open_path(path)?,
        None => doc.new_file(),
    }
    report(&doc);
    Ok(())
}

fn main() {
    let config_path = EditorConfig::file_path(Path::new("."));
    let config = EditorConfig::load_or_default(&config_path);
    init_logging(&config.log_filter);

    tracing::info!("Starting Lost Animator v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Settings from {CONFIG_FILE_NAME}: {config:?}");

    let document = std::env::args_os().nth(1).map(PathBuf::from);
    if let Err(e) = run(&config, document.as_deref()) {
        tracing::error!("Failed to open document: {e}");
        std::process::exit(1);
    }
}
