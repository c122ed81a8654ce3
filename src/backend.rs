//! Headless rendering backend
//!
//! Stands in for a graphics device: "buffers" are byte counts kept in a
//! table, and submitted draw lists are logged instead of executed. A mesh
//! needs at least one vertex; an empty index list is fine and simply draws
//! nothing.

use std::collections::HashMap;

use tracing::{debug, info};
use umbra_render::{BufferHandle, DrawItem, MeshUploader, RenderPass, Topology, Vertex};

/// Errors a device would report when creating buffers.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("cannot create a zero-sized {0} buffer")]
    EmptyBuffer(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BufferStats {
    vertex_bytes: usize,
    index_bytes: usize,
}

/// Backend that tracks buffer allocations without a GPU.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u64,
    buffers: HashMap<BufferHandle, BufferStats>,
    frames: u64,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffer pairs currently alive
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Total bytes held by live buffers
    pub fn resident_bytes(&self) -> usize {
        self.buffers
            .values()
            .map(|b| b.vertex_bytes + b.index_bytes)
            .sum()
    }

    /// "Execute" one pass of draw calls. Returns the number of primitives.
    pub fn submit(&mut self, pass: RenderPass, items: &[DrawItem]) -> usize {
        let mut primitives = 0;
        for item in items {
            let per_primitive = item.topology.indices_per_primitive();
            primitives += item.index_count as usize / per_primitive;
            debug!(
                "{:?} pass: draw {:?} ({:?}, {} indices, color {:?})",
                pass, item.buffers, item.topology, item.index_count, item.color
            );
        }
        if pass == RenderPass::Color {
            self.frames += 1;
        }
        info!("{:?} pass: {} draws, {} primitives", pass, items.len(), primitives);
        primitives
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl MeshUploader for HeadlessBackend {
    type Error = BackendError;

    fn upload(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        topology: Topology,
    ) -> Result<BufferHandle, BackendError> {
        if vertices.is_empty() {
            return Err(BackendError::EmptyBuffer("vertex"));
        }

        self.next_id += 1;
        let handle = BufferHandle::new(self.next_id);
        let stats = BufferStats {
            vertex_bytes: bytemuck::cast_slice::<Vertex, u8>(vertices).len(),
            index_bytes: bytemuck::cast_slice::<u32, u8>(indices).len(),
        };
        debug!("Created {:?} buffers {:?}: {:?}", topology, handle, stats);
        self.buffers.insert(handle, stats);
        Ok(handle)
    }

    fn release(&mut self, buffers: BufferHandle) {
        if self.buffers.remove(&buffers).is_some() {
            debug!("Released buffers {:?}", buffers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_render::{Mesh, Placement, Scene};

    #[test]
    fn upload_tracks_byte_sizes() {
        let mut backend = HeadlessBackend::new();
        let mut quad = Mesh::screen_quad();
        let handle = quad.materialize(&mut backend).expect("upload");

        // 4 vertices of 32 bytes plus 6 u32 indices
        assert_eq!(backend.resident_bytes(), 4 * 32 + 6 * 4);
        assert_eq!(backend.live_buffers(), 1);

        backend.release(handle);
        assert_eq!(backend.resident_bytes(), 0);
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let mut backend = HeadlessBackend::new();
        let mut mesh = Mesh::empty();
        assert!(matches!(
            mesh.materialize(&mut backend),
            Err(BackendError::EmptyBuffer("vertex"))
        ));
    }

    #[test]
    fn vertex_only_mesh_is_accepted() {
        let mut backend = HeadlessBackend::new();
        let mut scene = Scene::new();
        let points = Mesh::new(
            vec![Vertex::from_position([0.0, 0.0, 0.0]), Vertex::from_position([1.0, 2.0, 3.0])],
            Vec::new(),
            Topology::TriangleList,
        )
        .expect("valid mesh");

        scene
            .spawn("points", points, Placement::default(), &mut backend)
            .expect("spawn");
        // mesh plus its normal lines
        assert_eq!(backend.live_buffers(), 2);
        assert_eq!(backend.resident_bytes(), 2 * 32 + 4 * 32 + 4 * 4);
        assert_eq!(backend.submit(RenderPass::Shadow, &scene.draw_list(RenderPass::Shadow)), 0);
    }

    #[test]
    fn scene_lifecycle_leaves_no_buffers() {
        let mut backend = HeadlessBackend::new();
        let mut scene = Scene::new();
        scene.upload_builtins(&mut backend).expect("builtins");
        scene
            .spawn("quad", Mesh::screen_quad(), Placement::default(), &mut backend)
            .expect("spawn");
        assert_eq!(backend.live_buffers(), 4);

        let primitives = backend.submit(RenderPass::Color, &scene.draw_list(RenderPass::Color));
        // skybox 12 + quad model 2 + preview quad 2
        assert_eq!(primitives, 16);
        assert_eq!(backend.frames(), 1);

        scene.shutdown(&mut backend);
        assert_eq!(backend.live_buffers(), 0);
    }
}
