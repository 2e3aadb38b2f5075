//! Handing a folder over to whatever external app can show it.

use crate::error::AlbumError;
use crate::media_index::MediaIndexer;
use std::fs;
use std::path::Path;

/// MIME hint passed along with a folder: let the platform pick any viewer.
pub const FOLDER_MIME_HINT: &str = "*/*";

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("no installed app can handle the request")]
    NoHandler,
    #[error("platform error: {0}")]
    Platform(String),
}

/// The platform's generic "view this" request, offered through a chooser.
pub trait ContentViewer {
    fn view(&self, target: &Path, mime_hint: &str) -> Result<(), ViewError>;
}

/// Index every file in `folder`, then ask the platform to open it.
pub fn open_folder_externally(
    folder: &Path,
    indexer: &dyn MediaIndexer,
    viewer: &dyn ContentViewer,
) -> Result<(), AlbumError> {
    if !folder.exists() {
        return Err(AlbumError::NotFound(folder.to_path_buf()));
    }
    if !folder.is_dir() {
        return Err(AlbumError::NotADirectory(folder.to_path_buf()));
    }

    let entries = fs::read_dir(folder).map_err(|e| AlbumError::io(folder, e))?;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if path.is_file() {
            indexer.scan(&path);
        }
    }

    match viewer.view(folder, FOLDER_MIME_HINT) {
        Ok(()) => Ok(()),
        Err(ViewError::NoHandler) => Err(AlbumError::NoCapableHandler(folder.to_path_buf())),
        Err(ViewError::Platform(reason)) => {
            log::error!("Opening {} failed: {reason}", folder.display());
            Err(AlbumError::NoCapableHandler(folder.to_path_buf()))
        }
    }
}
