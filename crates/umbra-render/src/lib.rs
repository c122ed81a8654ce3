//! Umbra Render - Backend-independent mesh pipeline
//!
//! Turns parsed OBJ data into shading-ready meshes (recentred, rescaled, with
//! smooth per-vertex normals) and keeps track of which meshes a rendering
//! backend has uploaded. Nothing in this crate talks to a graphics API; the
//! backend plugs in through [`MeshUploader`].

pub mod error;
pub mod loader;
pub mod mesh;
pub mod primitives;
pub mod process;
pub mod scene;
pub mod upload;
pub mod vertex;

pub use error::MeshError;
pub use loader::{load_and_process, process_obj};
pub use mesh::{Bounds, Mesh, Topology};
pub use scene::{DrawItem, Model, ModelHandle, Placement, RenderPass, Scene, SceneError};
pub use upload::{BufferHandle, MeshUploader};
pub use vertex::{Vertex, VertexAttribute};
