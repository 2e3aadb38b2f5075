use std::path::PathBuf;

/// Everything that can go wrong while browsing or filling the album.
///
/// None of these are fatal: the caller shows them as a transient notice and
/// the navigation state stays as it was before the failed operation.
#[derive(Debug, thiserror::Error)]
pub enum AlbumError {
    #[error("Storage permission denied")]
    PermissionDenied,
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Already exists: {0}")]
    AlreadyExists(PathBuf),
    #[error("Folder name cannot be empty")]
    EmptyName,
    #[error("Invalid folder name: {0:?}")]
    InvalidName(String),
    #[error("Not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No app can open {0}")]
    NoCapableHandler(PathBuf),
    #[error("Capture failed, nothing was written to {0}")]
    CaptureFailed(PathBuf),
}

impl AlbumError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AlbumError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = AlbumError::io(
            "/album/Trip/IMG_1.jpg",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("/album/Trip/IMG_1.jpg"));
        assert!(message.contains("denied"));
    }

    #[test]
    fn test_empty_name_message() {
        assert_eq!(
            AlbumError::EmptyName.to_string(),
            "Folder name cannot be empty"
        );
    }
}
