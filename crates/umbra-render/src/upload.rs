//! Seam between the mesh model and a rendering backend

use crate::mesh::Topology;
use crate::vertex::Vertex;

/// Opaque id of device-side buffers created by a backend for one mesh.
///
/// The mesh only stores and returns it; what it refers to is up to the
/// backend that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(u64);

impl BufferHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Implemented by rendering backends to receive mesh data.
pub trait MeshUploader {
    type Error: std::error::Error + 'static;

    /// Create device buffers holding the given vertex and index data.
    fn upload(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        topology: Topology,
    ) -> Result<BufferHandle, Self::Error>;

    /// Free device buffers previously returned by [`MeshUploader::upload`].
    fn release(&mut self, buffers: BufferHandle);
}
