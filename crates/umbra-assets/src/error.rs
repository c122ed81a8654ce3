use std::path::PathBuf;

/// Errors that can occur while reading or parsing an OBJ file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("OBJ file not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error reading '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("'{record}' record starting on line {line} ends before all of its values")]
    Truncated { record: &'static str, line: usize },

    #[error("malformed number '{token}' on line {line}")]
    MalformedNumber { token: String, line: usize },

    #[error("face references position {obj_index} but only {vertex_count} positions are defined")]
    IndexOutOfRange { obj_index: u64, vertex_count: usize },
}
