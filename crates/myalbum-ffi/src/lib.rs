//! UniFFI bindings for the myalbum Android app
//!
//! The Kotlin activity owns the platform side (permission dialogs, camera
//! intents, the media scanner) and drives the Rust navigator through an
//! [`AlbumHandle`]. Capture is split into `prepare_capture`, which hands out
//! the destination file for the camera intent, and `finish_capture`, called
//! from the activity-result callback.

use chrono::Local;
use myalbum_engine::{
    AlbumError, CaptureNaming, CaptureOutcome, MediaIndexer, MediaKind, Navigator,
    PendingCapture, import_file,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

uniffi::setup_scaffolding!();

// ============ Errors ============

/// Errors that can cross the FFI boundary
/// Note: Field is named `reason` not `message` to avoid conflict with Throwable.message in Kotlin
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FfiError {
    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },
    #[error("Not a directory: {reason}")]
    NotADirectory { reason: String },
    #[error("Already exists: {reason}")]
    AlreadyExists { reason: String },
    #[error("Empty name: {reason}")]
    EmptyName { reason: String },
    #[error("Invalid name: {reason}")]
    InvalidName { reason: String },
    #[error("Not found: {reason}")]
    NotFound { reason: String },
    #[error("IO failure: {reason}")]
    IoFailure { reason: String },
    #[error("No capable handler: {reason}")]
    NoCapableHandler { reason: String },
    #[error("Capture failed: {reason}")]
    CaptureFailed { reason: String },
    #[error("No capture in progress: {reason}")]
    NoPendingCapture { reason: String },
}

impl From<AlbumError> for FfiError {
    fn from(err: AlbumError) -> Self {
        let reason = err.to_string();
        match err {
            AlbumError::PermissionDenied => FfiError::PermissionDenied { reason },
            AlbumError::NotADirectory(_) => FfiError::NotADirectory { reason },
            AlbumError::AlreadyExists(_) => FfiError::AlreadyExists { reason },
            AlbumError::EmptyName => FfiError::EmptyName { reason },
            AlbumError::InvalidName(_) => FfiError::InvalidName { reason },
            AlbumError::NotFound(_) => FfiError::NotFound { reason },
            AlbumError::Io { .. } => FfiError::IoFailure { reason },
            AlbumError::NoCapableHandler(_) => FfiError::NoCapableHandler { reason },
            AlbumError::CaptureFailed(_) => FfiError::CaptureFailed { reason },
        }
    }
}

// ============ Platform callbacks ============

/// Implemented in Kotlin on top of `MediaScannerConnection.scanFile`
#[uniffi::export(with_foreign)]
pub trait MediaScanner: Send + Sync {
    fn scan(&self, path: String);
}

struct ForeignIndexer(Arc<dyn MediaScanner>);

impl MediaIndexer for ForeignIndexer {
    fn scan(&self, path: &Path) {
        self.0.scan(path.to_string_lossy().to_string());
    }
}

// ============ Album Handle ============

/// A handle to the album navigator and the capture in flight, if any.
#[derive(uniffi::Object)]
pub struct AlbumHandle {
    navigator: Mutex<Navigator>,
    naming: CaptureNaming,
    pending: Mutex<Option<PendingCapture>>,
    indexer: ForeignIndexer,
}

impl AlbumHandle {
    fn navigator(&self) -> std::sync::MutexGuard<'_, Navigator> {
        // Recover from poisoned mutex (another thread panicked while holding lock)
        self.navigator.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, Option<PendingCapture>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[uniffi::export]
impl AlbumHandle {
    /// Create a handle rooted at `root_path`.
    ///
    /// The listing stays empty until `refresh` is called, which the activity
    /// does once storage access is granted.
    #[uniffi::constructor]
    pub fn new(root_path: String, scanner: Arc<dyn MediaScanner>) -> Self {
        Self::with_naming(root_path, scanner, CaptureNaming::default())
    }

    /// Create a handle with custom capture file prefixes.
    #[uniffi::constructor]
    pub fn with_prefixes(
        root_path: String,
        scanner: Arc<dyn MediaScanner>,
        image_prefix: String,
        video_prefix: String,
    ) -> Self {
        Self::with_naming(
            root_path,
            scanner,
            CaptureNaming {
                image_prefix,
                video_prefix,
            },
        )
    }

    /// Current folder and its listing.
    pub fn state(&self) -> AlbumStateDto {
        AlbumStateDto::from_navigator(&self.navigator())
    }

    pub fn refresh(&self) -> AlbumStateDto {
        let mut navigator = self.navigator();
        navigator.refresh();
        AlbumStateDto::from_navigator(&navigator)
    }

    /// Called when the permission request was denied.
    pub fn clear_listing(&self) -> AlbumStateDto {
        let mut navigator = self.navigator();
        navigator.clear_listing();
        AlbumStateDto::from_navigator(&navigator)
    }

    pub fn enter_folder(&self, name: String) -> Result<AlbumStateDto, FfiError> {
        let mut navigator = self.navigator();
        navigator.enter_folder(&name)?;
        Ok(AlbumStateDto::from_navigator(&navigator))
    }

    /// Returns `false` at the root so the activity can fall back to its default back behaviour.
    pub fn go_to_parent(&self) -> bool {
        self.navigator().go_to_parent()
    }

    pub fn create_folder(&self, name: String) -> Result<String, FfiError> {
        let created = self.navigator().create_folder(&name)?;
        Ok(path_string(&created))
    }

    pub fn delete_folder(&self, name: String) -> Result<(), FfiError> {
        Ok(self.navigator().delete_folder(&name)?)
    }

    pub fn delete_image(&self, path: String) -> Result<(), FfiError> {
        let removed = self.navigator().delete_image(Path::new(&path))?;
        self.indexer.scan(&removed);
        Ok(())
    }

    /// Pick the destination for a new capture.
    ///
    /// `folder_name` selects a subfolder of the current folder; `None` means
    /// the current folder itself. Replaces any capture still waiting for a
    /// result.
    pub fn prepare_capture(
        &self,
        folder_name: Option<String>,
        kind: MediaKindDto,
    ) -> Result<String, FfiError> {
        let folder = self.navigator().folder_path(folder_name.as_deref())?;

        let pending = PendingCapture::prepare(
            &folder,
            kind.into(),
            &self.naming,
            Local::now().naive_local(),
        )?;
        let target = path_string(pending.target());
        if let Some(previous) = self.pending().replace(pending) {
            log::warn!(
                "Dropping unanswered capture into {}",
                previous.target().display()
            );
        }
        Ok(target)
    }

    /// Settle the capture started by `prepare_capture`.
    ///
    /// Returns the captured file on success; the media scanner has already been asked to index it.
    pub fn finish_capture(&self, completed: bool) -> Result<String, FfiError> {
        let pending = self.pending().take().ok_or_else(|| FfiError::NoPendingCapture {
            reason: "finish_capture called without prepare_capture".to_string(),
        })?;
        let outcome = if completed {
            CaptureOutcome::Completed
        } else {
            CaptureOutcome::Cancelled
        };
        let captured = pending.complete(outcome, &self.indexer)?;
        self.navigator().refresh();
        Ok(path_string(&captured))
    }

    /// Move a file the camera app saved elsewhere into the current folder.
    pub fn import_captured(&self, source_path: String) -> Result<String, FfiError> {
        let mut navigator = self.navigator();
        let imported = import_file(Path::new(&source_path), navigator.current(), &self.indexer)?;
        navigator.refresh();
        Ok(path_string(&imported))
    }
}

impl AlbumHandle {
    fn with_naming(root_path: String, scanner: Arc<dyn MediaScanner>, naming: CaptureNaming) -> Self {
        Self {
            navigator: Mutex::new(Navigator::new(PathBuf::from(root_path))),
            naming,
            pending: Mutex::new(None),
            indexer: ForeignIndexer(scanner),
        }
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

// ============ DTOs ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum MediaKindDto {
    Image,
    Video,
}

impl From<MediaKindDto> for MediaKind {
    fn from(kind: MediaKindDto) -> Self {
        match kind {
            MediaKindDto::Image => MediaKind::Image,
            MediaKindDto::Video => MediaKind::Video,
        }
    }
}

/// UI-ready view of the navigator.
#[derive(Debug, uniffi::Record)]
pub struct AlbumStateDto {
    pub root_path: String,
    pub current_path: String,
    /// Name of the current folder, for the top bar
    pub title: String,
    /// Hide the back arrow when true
    pub at_root: bool,
    pub folders: Vec<String>,
    /// Absolute paths of the images in the current folder
    pub images: Vec<String>,
}

impl AlbumStateDto {
    fn from_navigator(navigator: &Navigator) -> Self {
        let listing = navigator.listing();
        Self {
            root_path: path_string(navigator.root()),
            current_path: path_string(navigator.current()),
            title: navigator.title(),
            at_root: navigator.is_at_root(),
            folders: listing.folders.clone(),
            images: listing.images.iter().map(|p| path_string(p)).collect(),
        }
    }
}
