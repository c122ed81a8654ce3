//! Scene manifest: which models to load and where to put them
//!
//! ```toml
//! [[model]]
//! path = "wizard_hat.obj"
//! position = [0.0, 1.55, 0.0]
//! yaw_degrees = -45.0
//! color = [0.4, 0.0, 0.5]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use umbra_core::{Color, Transform, Vec3};
use umbra_render::Placement;

/// Parsed scene manifest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneManifest {
    #[serde(rename = "model", default)]
    pub models: Vec<ModelEntry>,
}

/// One model to load
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    #[serde(default)]
    pub yaw_degrees: f32,
    #[serde(default = "white")]
    pub color: [f32; 3],
    #[serde(default)]
    pub render_normals: bool,
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl SceneManifest {
    /// Parse a manifest from TOML text
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid scene manifest")
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene manifest {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("In {}", path.display()))
    }
}

impl ModelEntry {
    /// Scene placement for this entry. `force_normals` turns on normal lines
    /// even when the entry doesn't ask for them.
    pub fn placement(&self, force_normals: bool) -> Placement {
        Placement {
            transform: Transform::from_placement(
                Vec3::from(self.position),
                Vec3::from(self.scale),
                self.yaw_degrees,
            ),
            color: Color::from(self.color),
            render_normals: self.render_normals || force_normals,
        }
    }
}
