//! Vertex layout shared with rendering backends

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use std::mem::{offset_of, size_of};

/// Mesh vertex with position, normal and texture coordinate.
///
/// OBJ-loaded meshes always carry a zero `uv`: face texture references are
/// not read.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// One member of the vertex layout, for building backend input descriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub offset: u32,
    /// Number of `f32` components.
    pub components: u32,
}

impl Vertex {
    /// Byte stride between consecutive vertices
    pub const STRIDE: u32 = size_of::<Self>() as u32;

    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.into(),
            normal: normal.into(),
            uv: uv.into(),
        }
    }

    /// Vertex with only a position; normal and uv are zero
    pub fn from_position(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn pos(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    pub fn norm(&self) -> Vec3 {
        Vec3::from(self.normal)
    }

    /// Attribute layout in declaration order
    pub fn attributes() -> [VertexAttribute; 3] {
        [
            VertexAttribute {
                name: "position",
                offset: offset_of!(Vertex, position) as u32,
                components: 3,
            },
            VertexAttribute {
                name: "normal",
                offset: offset_of!(Vertex, normal) as u32,
                components: 3,
            },
            VertexAttribute {
                name: "uv",
                offset: offset_of!(Vertex, uv) as u32,
                components: 2,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 32);
        let offsets: Vec<u32> = Vertex::attributes().iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24]);
    }

    #[test]
    fn vertices_cast_to_bytes() {
        let vertices = [Vertex::from_position([1.0, 2.0, 3.0]); 2];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 64);
    }
}
