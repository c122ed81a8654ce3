//! Mesh buffer model

use glam::Vec3;
use tracing::debug;
use umbra_assets::ObjData;

use crate::error::MeshError;
use crate::upload::{BufferHandle, MeshUploader};
use crate::vertex::Vertex;

/// How the index list is assembled into primitives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Topology {
    /// Every three indices form a triangle
    #[default]
    TriangleList,
    /// Every two indices form a line segment
    LineList,
}

impl Topology {
    /// Indices consumed per primitive
    pub fn indices_per_primitive(&self) -> usize {
        match self {
            Topology::TriangleList => 3,
            Topology::LineList => 2,
        }
    }
}

/// Axis-aligned bounds of a set of positions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Size along each axis
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Vertex and index data for one drawable mesh.
///
/// Every index is smaller than the vertex count; this is checked on
/// construction and the index list cannot be changed afterwards. Vertex
/// values may be edited in place, but the vertex count is fixed.
///
/// The mesh also remembers the buffers a backend created for it, so that
/// uploading twice is a no-op and the owner can hand the buffers back when
/// the mesh goes away.
#[derive(Debug)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    topology: Topology,
    normal_lines: Option<NormalLines>,
    buffers: Option<BufferHandle>,
    // Buffers of derived meshes discarded after they were uploaded.
    orphaned: Vec<BufferHandle>,
}

#[derive(Debug)]
struct NormalLines {
    length: f32,
    mesh: Box<Mesh>,
}

impl Mesh {
    /// Build a mesh, checking that every index refers to a vertex.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, topology: Topology) -> Result<Self, MeshError> {
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }

        Ok(Self::from_parts_unchecked(vertices, indices, topology))
    }

    /// Create an empty triangle mesh
    pub fn empty() -> Self {
        Self::from_parts_unchecked(Vec::new(), Vec::new(), Topology::TriangleList)
    }

    /// Build a mesh from data that is in range by construction.
    pub(crate) fn from_parts_unchecked(vertices: Vec<Vertex>, indices: Vec<u32>, topology: Topology) -> Self {
        debug_assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        Self {
            vertices,
            indices,
            topology,
            normal_lines: None,
            buffers: None,
            orphaned: Vec::new(),
        }
    }

    /// Triangle mesh from parsed OBJ data. Normals and uvs start at zero.
    pub fn from_obj(obj: &ObjData) -> Result<Self, MeshError> {
        let vertices = obj.positions.iter().copied().map(Vertex::from_position).collect();
        Self::new(vertices, obj.indices.clone(), Topology::TriangleList)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Mutable access to vertex values. Drops any derived normal-line mesh.
    pub fn vertices_mut(&mut self) -> &mut [Vertex] {
        self.invalidate_derived();
        &mut self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of complete triangles (zero for line meshes)
    pub fn triangle_count(&self) -> usize {
        match self.topology {
            Topology::TriangleList => self.indices.len() / 3,
            Topology::LineList => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Bounds of all vertex positions, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.vertices.first()?.pos();
        let (min, max) = self
            .vertices
            .iter()
            .map(Vertex::pos)
            .fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Bounds { min, max })
    }

    /// Line-list mesh drawing each vertex normal as a segment from the
    /// vertex position to `position + normal * length`.
    ///
    /// Built on first use and cached until the vertices change or a
    /// different length is requested.
    pub fn normal_lines(&mut self, length: f32) -> &mut Mesh {
        let stale = self
            .normal_lines
            .as_ref()
            .map_or(true, |lines| lines.length != length);

        if stale {
            self.invalidate_derived();
        }

        let vertices = &self.vertices;
        let lines = self.normal_lines.get_or_insert_with(|| NormalLines {
            length,
            mesh: Box::new(build_normal_lines(vertices, length)),
        });
        &mut lines.mesh
    }

    /// The cached normal-line mesh, if one has been built
    pub fn cached_normal_lines(&self) -> Option<&Mesh> {
        self.normal_lines.as_ref().map(|lines| &*lines.mesh)
    }

    /// Hand the vertex and index data to a backend.
    ///
    /// Only the first call uploads; later calls return the stored handle
    /// until [`Mesh::release`] is called.
    pub fn materialize<U: MeshUploader>(&mut self, uploader: &mut U) -> Result<BufferHandle, U::Error> {
        if let Some(buffers) = self.buffers {
            return Ok(buffers);
        }

        let buffers = uploader.upload(&self.vertices, &self.indices, self.topology)?;
        debug!(
            "Uploaded mesh as {:?}: {} vertices, {} indices",
            buffers,
            self.vertices.len(),
            self.indices.len()
        );
        self.buffers = Some(buffers);
        Ok(buffers)
    }

    /// Buffers from the last [`Mesh::materialize`], if still held
    pub fn buffers(&self) -> Option<BufferHandle> {
        self.buffers
    }

    pub fn is_materialized(&self) -> bool {
        self.buffers.is_some()
    }

    /// Forget every buffer handle held by this mesh and its derived meshes,
    /// returning them so the backend can free the device resources.
    pub fn release(&mut self) -> Vec<BufferHandle> {
        let mut released = std::mem::take(&mut self.orphaned);
        if let Some(lines) = &mut self.normal_lines {
            released.extend(lines.mesh.release());
        }
        released.extend(self.buffers.take());
        released
    }

    /// Drop derived data that no longer matches the vertices.
    pub(crate) fn invalidate_derived(&mut self) {
        if let Some(mut lines) = self.normal_lines.take() {
            self.orphaned.extend(lines.mesh.release());
        }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::empty()
    }
}

fn build_normal_lines(vertices: &[Vertex], length: f32) -> Mesh {
    let mut line_vertices = Vec::with_capacity(vertices.len() * 2);
    let mut indices = Vec::with_capacity(vertices.len() * 2);

    for vertex in vertices {
        let start = vertex.pos();
        let end = start + vertex.norm() * length;

        indices.push(line_vertices.len() as u32);
        line_vertices.push(Vertex::from_position(start.into()));
        indices.push(line_vertices.len() as u32);
        line_vertices.push(Vertex::from_position(end.into()));
    }

    Mesh::from_parts_unchecked(line_vertices, indices, Topology::LineList)
}
