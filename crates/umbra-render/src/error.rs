use umbra_assets::ParseError;

/// Errors that can occur while building or loading a mesh.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("index {index} out of range for mesh with {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}
