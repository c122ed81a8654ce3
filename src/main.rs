//! Umbra - headless OBJ scene viewer
//!
//! Loads the models listed in a scene manifest, prepares them for shading,
//! uploads them to the headless backend and walks one frame of draw lists.
//!
//! Usage: `umbra [scene.toml]`

mod backend;
mod manifest;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use umbra_assets::AssetServer;
use umbra_render::{RenderPass, Scene};

use crate::backend::HeadlessBackend;
use crate::manifest::SceneManifest;
use crate::settings::ViewerSettings;

fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

fn main() -> Result<()> {
    let settings = ViewerSettings::load();
    init_logging(&settings.logging.level)?;

    if !ViewerSettings::is_saved() {
        if let Err(e) = settings.save() {
            warn!("Could not write default settings: {}", e);
        }
    }

    info!("Starting Umbra viewer...");

    let manifest_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.assets.scene.clone());
    let manifest = SceneManifest::load(&manifest_path)?;

    let mut assets = AssetServer::new(&settings.assets.root);
    let mut backend = HeadlessBackend::new();
    let mut scene = Scene::with_normal_line_length(settings.debug.normal_line_length);

    scene
        .upload_builtins(&mut backend)
        .context("Failed to upload built-in meshes")?;

    for entry in &manifest.models {
        let placement = entry.placement(settings.debug.show_normals);
        match scene.load_model(&mut assets, &entry.path, placement, &mut backend) {
            Ok(handle) => info!("Loaded {} as {:?}", entry.path.display(), handle),
            // A missing or broken model doesn't stop the rest of the scene.
            Err(e) => warn!("Skipping {}: {}", entry.path.display(), e),
        }
    }

    info!(
        "Scene ready: {} models, {} buffers, {} bytes resident",
        scene.len(),
        backend.live_buffers(),
        backend.resident_bytes()
    );

    for pass in [RenderPass::Shadow, RenderPass::Color] {
        let items = scene.draw_list(pass);
        backend.submit(pass, &items);
    }

    scene.shutdown(&mut backend);
    info!(
        "Shut down after {} frame(s), {} buffers still alive",
        backend.frames(),
        backend.live_buffers()
    );

    Ok(())
}
