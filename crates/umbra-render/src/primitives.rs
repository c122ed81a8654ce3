//! Built-in meshes that are not loaded from files

use glam::{Vec2, Vec3};

use crate::mesh::{Mesh, Topology};
use crate::vertex::Vertex;

impl Mesh {
    /// Unit quad in the XY plane facing +Z, used to draw a texture (the
    /// shadow map preview) on screen. UV (0, 0) is the upper left corner.
    pub fn screen_quad() -> Self {
        let vertices = vec![
            Vertex::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::Z, Vec2::new(0.0, 1.0)),
            Vertex::new(Vec3::new(1.0, -1.0, 0.0), Vec3::Z, Vec2::new(1.0, 1.0)),
            Vertex::new(Vec3::new(1.0, 1.0, 0.0), Vec3::Z, Vec2::new(1.0, 0.0)),
            Vertex::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::Z, Vec2::new(0.0, 0.0)),
        ];
        let indices = vec![0, 1, 2, 2, 3, 0];
        Self::from_parts_unchecked(vertices, indices, Topology::TriangleList)
    }

    /// Cube spanning `[-1, 1]` on every axis with all triangles facing
    /// inward, for drawing a skybox around the camera.
    pub fn inward_cube() -> Self {
        let corners = [
            [-1.0, -1.0, 1.0],  // left lower front
            [1.0, -1.0, 1.0],   // right lower front
            [1.0, -1.0, -1.0],  // right lower back
            [-1.0, -1.0, -1.0], // left lower back
            [-1.0, 1.0, 1.0],   // left upper front
            [1.0, 1.0, 1.0],    // right upper front
            [1.0, 1.0, -1.0],   // right upper back
            [-1.0, 1.0, -1.0],  // left upper back
        ];
        let vertices = corners.into_iter().map(Vertex::from_position).collect();

        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2, 2, 3, 0, // bottom
            6, 5, 4, 4, 7, 6, // top
            0, 3, 7, 7, 4, 0, // left
            2, 1, 5, 5, 6, 2, // right
            3, 2, 6, 6, 7, 3, // back
            5, 1, 0, 0, 4, 5, // front
        ];
        Self::from_parts_unchecked(vertices, indices, Topology::TriangleList)
    }
}
