//! Error type for scene export

use std::fmt;

/// Errors that can occur while exporting a scene.
#[derive(Debug)]
pub enum ExportError {
    /// Failed to serialize the glTF JSON document.
    Json(serde_json::Error),
    /// Failed to write the output file.
    Io(std::io::Error),
    /// A mesh has more vertices than 32-bit indices can address.
    MeshTooLarge { vertices: usize },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Json(e) => write!(f, "Failed to serialize scene description: {}", e),
            ExportError::Io(e) => write!(f, "Failed to write scene file: {}", e),
            ExportError::MeshTooLarge { vertices } => {
                write!(f, "Mesh with {} vertices exceeds 32-bit index range", vertices)
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Json(e) => Some(e),
            ExportError::Io(e) => Some(e),
            ExportError::MeshTooLarge { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Json(e)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}
