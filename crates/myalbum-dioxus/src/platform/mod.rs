//! Platform-specific functionality
//!
//! Implements the engine's platform seams: the permission surface, the camera,
//! the media index and the external "open with" request. Android goes through
//! JNI; desktop builds grant everything, have no camera and open folders with
//! the system file manager.

#[cfg(target_os = "android")]
mod android;

#[cfg(target_os = "android")]
pub use android::*;

use myalbum_engine::{
    AlbumError, CameraLauncher, CaptureRequest, CaptureResolver, ContentViewer, MediaIndexer,
    MediaKind, Permission, PermissionRequest, PermissionSurface, ViewError,
};
use std::cell::RefCell;
use std::path::Path;

/// Handle to the host platform
#[derive(Debug, Default, Clone, Copy)]
pub struct Platform;

impl PermissionSurface for Platform {
    fn supports_manage_all_files(&self) -> bool {
        supports_manage_all_files()
    }

    fn is_granted(&self, permission: Permission) -> bool {
        is_permission_granted(permission)
    }

    fn request(&self, request: PermissionRequest) {
        request_permissions(request)
    }
}

impl MediaIndexer for Platform {
    fn scan(&self, path: &Path) {
        scan_media_file(path)
    }
}

impl ContentViewer for Platform {
    fn view(&self, target: &Path, mime_hint: &str) -> Result<(), ViewError> {
        view_content(target, mime_hint)
    }
}

/// Camera launcher that parks the request's resolver until the UI learns
/// the camera app has returned.
#[derive(Debug, Default)]
pub struct Camera {
    waiting: RefCell<Option<CaptureResolver>>,
}

impl Camera {
    pub fn take_waiting(&self) -> Option<CaptureResolver> {
        self.waiting.borrow_mut().take()
    }
}

impl CameraLauncher for Camera {
    fn launch(&self, request: CaptureRequest) -> Result<(), AlbumError> {
        if !launch_camera(Some(&request.output), request.kind) {
            return Err(AlbumError::NoCapableHandler(request.output));
        }
        *self.waiting.borrow_mut() = Some(request.resolver);
        Ok(())
    }
}

#[cfg(not(target_os = "android"))]
fn supports_manage_all_files() -> bool {
    false
}

/// Desktop processes already run with the user's own file access.
#[cfg(not(target_os = "android"))]
fn is_permission_granted(_permission: Permission) -> bool {
    true
}

#[cfg(not(target_os = "android"))]
fn request_permissions(request: PermissionRequest) {
    request.responder.respond(true);
}

#[cfg(not(target_os = "android"))]
fn scan_media_file(path: &Path) {
    myalbum_engine::LogIndexer.scan(path);
}

#[cfg(not(target_os = "android"))]
fn view_content(target: &Path, _mime_hint: &str) -> Result<(), ViewError> {
    open::that_detached(target).map_err(|e| {
        log::warn!("Could not open {}: {e}", target.display());
        ViewError::NoHandler
    })
}

/// Start the camera app.
///
/// With `output` the camera writes there directly; without it the camera
/// saves to its own folder. Desktop builds have no camera app to start.
#[cfg(not(target_os = "android"))]
pub fn launch_camera(output: Option<&Path>, kind: MediaKind) -> bool {
    log::info!(
        "No camera available for {kind:?} capture (output: {:?})",
        output.map(Path::display)
    );
    false
}
