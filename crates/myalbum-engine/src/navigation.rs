//! Directory navigation bounded by the album root.
//!
//! [`Navigator`] owns the root, the current directory and the listing derived
//! from it. Every successful navigation or mutation recomputes the listing;
//! failures leave all three untouched.
//!
//! Boundary checks resolve symlinks on every call, since the root may only
//! come into existence after the navigator was built.

use crate::error::AlbumError;
use crate::listing::{Listing, read_listing};
use std::fs;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Navigator {
    root: PathBuf,
    current: PathBuf,
    listing: Listing,
}

impl Navigator {
    /// Start at `root` with an empty listing.
    ///
    /// Nothing is read from disk until [`Navigator::refresh`], so the caller
    /// can hold the first load back until storage access has been granted.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            current: root.clone(),
            root,
            listing: Listing::default(),
        }
    }

    /// Start at an existing root directory and load its listing
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AlbumError> {
        let root = root.into();
        if !root.exists() {
            return Err(AlbumError::NotFound(root));
        }
        if !root.is_dir() {
            return Err(AlbumError::NotADirectory(root));
        }
        let mut navigator = Self::new(root);
        navigator.refresh();
        Ok(navigator)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn current(&self) -> &Path {
        &self.current
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn is_at_root(&self) -> bool {
        canonical(&self.current) == canonical(&self.root)
    }

    /// Create the root directory if it is missing
    pub fn ensure_root(&self) -> Result<(), AlbumError> {
        if self.root.is_dir() {
            return Ok(());
        }
        if self.root.exists() {
            return Err(AlbumError::NotADirectory(self.root.clone()));
        }
        fs::create_dir_all(&self.root).map_err(|e| AlbumError::io(&self.root, e))?;
        log::info!("Created album root {}", self.root.display());
        Ok(())
    }

    /// Display name of the current folder
    pub fn title(&self) -> String {
        self.current
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.current.display().to_string())
    }

    /// Current folder relative to the root, empty at the root itself
    pub fn relative_current(&self) -> PathBuf {
        self.current
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Resolve a capture destination: the current folder, or one of its subfolders
    pub fn folder_path(&self, name: Option<&str>) -> Result<PathBuf, AlbumError> {
        let Some(name) = name else {
            return Ok(self.current.clone());
        };
        self.existing_subfolder(name)
    }

    /// Re-read the listing of the current folder
    pub fn refresh(&mut self) {
        self.listing = read_listing(&self.current);
    }

    /// Forget the listing, used when storage access is denied
    pub fn clear_listing(&mut self) {
        self.listing = Listing::default();
    }

    pub fn enter_folder(&mut self, name: &str) -> Result<(), AlbumError> {
        let candidate = self.existing_subfolder(name)?;

        log::debug!("Entering {}", candidate.display());
        self.current = candidate;
        self.refresh();
        Ok(())
    }

    /// Move one level up.
    ///
    /// Returns `false` without changing anything when already at the root or
    /// when the parent is unavailable; the back handler then falls through to
    /// its default behaviour.
    pub fn go_to_parent(&mut self) -> bool {
        if self.is_at_root() {
            return false;
        }
        let Some(parent) = self.current.parent() else {
            return false;
        };
        if !parent.exists() || !canonical(parent).starts_with(canonical(&self.root)) {
            return false;
        }

        self.current = parent.to_path_buf();
        self.refresh();
        true
    }

    pub fn create_folder(&mut self, name: &str) -> Result<PathBuf, AlbumError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AlbumError::EmptyName);
        }
        let new_folder = child_path(&self.current, name)?;
        if new_folder.exists() {
            return Err(AlbumError::AlreadyExists(new_folder));
        }

        fs::create_dir_all(&new_folder).map_err(|e| AlbumError::io(&new_folder, e))?;
        log::info!("Created folder {}", new_folder.display());
        self.refresh();
        Ok(new_folder)
    }

    pub fn delete_folder(&mut self, name: &str) -> Result<(), AlbumError> {
        let target = self.existing_subfolder(name)?;

        fs::remove_dir_all(&target).map_err(|e| AlbumError::io(&target, e))?;
        log::info!("Deleted folder {}", target.display());
        self.refresh();
        Ok(())
    }

    /// Delete one image of the current folder.
    ///
    /// Returns the removed path so the media index can be told about it.
    pub fn delete_image(&mut self, image: &Path) -> Result<PathBuf, AlbumError> {
        if image.parent() != Some(self.current.as_path()) || !image.is_file() {
            return Err(AlbumError::NotFound(image.to_path_buf()));
        }

        fs::remove_file(image).map_err(|e| AlbumError::io(image, e))?;
        log::info!("Deleted image {}", image.display());
        self.refresh();
        Ok(image.to_path_buf())
    }

    /// An existing directory `name` inside the current folder that, with
    /// symlinks resolved, still lies inside the root
    fn existing_subfolder(&self, name: &str) -> Result<PathBuf, AlbumError> {
        let folder = child_path(&self.current, name)?;
        if !folder.exists() {
            return Err(AlbumError::NotFound(folder));
        }
        if !folder.is_dir() {
            return Err(AlbumError::NotADirectory(folder));
        }
        if !canonical(&folder).starts_with(canonical(&self.root)) {
            log::warn!("{} resolves outside the album root", folder.display());
            return Err(AlbumError::InvalidName(name.to_string()));
        }
        Ok(folder)
    }
}

/// Join a single plain path component onto `dir`.
///
/// Anything that could climb out of `dir` (`..`, separators, absolute
/// paths) is rejected.
pub(crate) fn child_path(dir: &Path, name: &str) -> Result<PathBuf, AlbumError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(component)), None) => Ok(dir.join(component)),
        _ => Err(AlbumError::InvalidName(name.to_string())),
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
