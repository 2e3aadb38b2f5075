use std::fs;
use std::path::{Path, PathBuf};

/// Extensions shown in the image strip, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// What the view shows for one directory.
///
/// Always derived from the directory on disk, never cached across operations.
/// Order is whatever the filesystem enumerates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub folders: Vec<String>,
    pub images: Vec<PathBuf>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.images.is_empty()
    }

    pub fn contains_folder(&self, name: &str) -> bool {
        self.folders.iter().any(|f| f == name)
    }
}

/// Read both listings for `dir`. An unreadable directory yields an empty listing.
pub fn read_listing(dir: &Path) -> Listing {
    Listing {
        folders: list_folders(dir),
        images: list_images(dir),
    }
}

/// Names of the immediate subdirectories of `dir`
pub fn list_folders(dir: &Path) -> Vec<String> {
    let Some(entries) = read_dir_logged(dir) else {
        return Vec::new();
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect()
}

/// Absolute paths of the image files directly inside `dir`
pub fn list_images(dir: &Path) -> Vec<PathBuf> {
    let Some(entries) = read_dir_logged(dir) else {
        return Vec::new();
    };

    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image(path))
        .collect()
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

fn read_dir_logged(dir: &Path) -> Option<fs::ReadDir> {
    if !dir.is_dir() {
        return None;
    }
    match fs::read_dir(dir) {
        Ok(entries) => Some(entries),
        Err(e) => {
            log::warn!("Cannot list {}: {e}", dir.display());
            None
        }
    }
}
