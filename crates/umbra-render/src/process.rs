//! Shading preparation: recentring/rescaling and smooth vertex normals

use glam::Vec3;
use tracing::trace;

use crate::mesh::Mesh;
use crate::vertex::Vertex;

impl Mesh {
    /// Move the mean vertex position to the origin and scale uniformly so
    /// the largest bounding-box extent becomes 2.
    ///
    /// The mean, not the box centre, ends up at the origin, so the result
    /// is not necessarily inside `[-1, 1]`. Extents are measured before the
    /// translation. Empty meshes are left alone; a mesh with zero extent
    /// (all positions equal) is translated but not scaled.
    pub fn normalize(&mut self) {
        let Some(bounds) = self.bounds() else {
            return;
        };

        let count = self.vertex_count() as f32;
        let mean = self.vertices().iter().map(Vertex::pos).sum::<Vec3>() / count;
        let max_diff = bounds.extent().max_element();
        let rescale = max_diff > 0.0 && max_diff.is_finite();

        trace!(
            "Normalizing mesh: mean {:?}, extent {:?}, rescale {}",
            mean,
            bounds.extent(),
            rescale
        );

        for vertex in self.vertices_mut() {
            let mut p = vertex.pos() - mean;
            if rescale {
                p = p / max_diff * 2.0;
            }
            vertex.position = p.into();
        }
    }

    /// Replace every vertex normal with the mean of the unit normals of the
    /// triangles that use the vertex.
    ///
    /// The mean is not renormalized, so where adjacent faces disagree the
    /// result is shorter than 1. Zero-area triangles contribute a zero
    /// vector. Vertices no triangle references get a zero normal. A trailing
    /// incomplete triple of indices is ignored.
    pub fn compute_vertex_normals(&mut self) {
        if self.is_empty() {
            return;
        }

        let vertices = self.vertices();
        let mut sums = vec![Vec3::ZERO; vertices.len()];
        let mut counts = vec![0u32; vertices.len()];

        for tri in self.indices().chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p0 = vertices[a].pos();
            let face = (vertices[b].pos() - p0).cross(vertices[c].pos() - p0);

            let contribution = if face.length_squared() == 0.0 {
                Vec3::ZERO
            } else {
                face.normalize()
            };

            for i in [a, b, c] {
                sums[i] += contribution;
                counts[i] += 1;
            }
        }

        for ((vertex, sum), count) in self.vertices_mut().iter_mut().zip(sums).zip(counts) {
            let normal = if count == 0 { Vec3::ZERO } else { sum / count as f32 };
            vertex.normal = normal.into();
        }
    }

    /// Normalize, then compute vertex normals: the order every loaded mesh
    /// goes through before upload.
    pub fn process(&mut self) {
        self.normalize();
        self.compute_vertex_normals();
    }
}
