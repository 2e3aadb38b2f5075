//! Capturing photos and videos straight into an album folder.
//!
//! The camera runs in another app, so a capture is a round trip: a
//! [`CaptureSession`] decides the destination file, hands a
//! [`CaptureRequest`] to the platform's [`CameraLauncher`] and waits for the
//! single [`CaptureOutcome`] the platform sends back through the request's
//! [`CaptureResolver`].

use crate::error::AlbumError;
use crate::media_index::MediaIndexer;
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// `yyyyMMdd_HHmmss`
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

/// File name prefixes for captured media
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureNaming {
    pub image_prefix: String,
    pub video_prefix: String,
}

impl Default for CaptureNaming {
    fn default() -> Self {
        Self {
            image_prefix: "IMG".to_string(),
            video_prefix: "VID".to_string(),
        }
    }
}

impl CaptureNaming {
    /// `PREFIX_yyyyMMdd_HHmmss.ext`.
    ///
    /// Two captures within the same second get the same name; the later one wins.
    pub fn file_name(&self, kind: MediaKind, at: NaiveDateTime) -> String {
        let prefix = match kind {
            MediaKind::Image => &self.image_prefix,
            MediaKind::Video => &self.video_prefix,
        };
        format!(
            "{prefix}_{}.{}",
            at.format(TIMESTAMP_FORMAT),
            kind.extension()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Completed,
    Cancelled,
}

/// Destination of a capture that has been requested but not yet answered
#[derive(Debug)]
pub struct PendingCapture {
    target: PathBuf,
    kind: MediaKind,
}

impl PendingCapture {
    pub fn prepare(
        folder: &Path,
        kind: MediaKind,
        naming: &CaptureNaming,
        at: NaiveDateTime,
    ) -> Result<Self, AlbumError> {
        if !folder.exists() {
            return Err(AlbumError::NotFound(folder.to_path_buf()));
        }
        if !folder.is_dir() {
            return Err(AlbumError::NotADirectory(folder.to_path_buf()));
        }
        Ok(Self {
            target: folder.join(naming.file_name(kind, at)),
            kind,
        })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Settle the capture; consumes the pending target.
    ///
    /// Success means the camera wrote the destination file. A cancelled
    /// capture may leave an empty placeholder behind, which is removed.
    pub fn complete(
        self,
        outcome: CaptureOutcome,
        indexer: &dyn MediaIndexer,
    ) -> Result<PathBuf, AlbumError> {
        match outcome {
            CaptureOutcome::Completed if self.target.is_file() => {
                log::info!("Captured {}", self.target.display());
                indexer.scan(&self.target);
                Ok(self.target)
            }
            CaptureOutcome::Completed => {
                log::warn!(
                    "Camera reported success but {} is missing",
                    self.target.display()
                );
                Err(AlbumError::CaptureFailed(self.target))
            }
            CaptureOutcome::Cancelled => {
                if fs::metadata(&self.target).is_ok_and(|m| m.is_file() && m.len() == 0)
                    && let Err(e) = fs::remove_file(&self.target)
                {
                    log::warn!(
                        "Could not remove empty capture placeholder {}: {e}",
                        self.target.display()
                    );
                }
                Err(AlbumError::CaptureFailed(self.target))
            }
        }
    }
}

/// The single answer channel of one capture request
#[derive(Debug)]
pub struct CaptureResolver {
    tx: oneshot::Sender<CaptureOutcome>,
}

impl CaptureResolver {
    pub fn resolve(self, outcome: CaptureOutcome) {
        if self.tx.send(outcome).is_err() {
            log::debug!("Capture outcome arrived after the session was dropped");
        }
    }
}

/// What the platform needs to run the camera
#[derive(Debug)]
pub struct CaptureRequest {
    pub output: PathBuf,
    pub kind: MediaKind,
    pub resolver: CaptureResolver,
}

/// The platform's camera surface
pub trait CameraLauncher {
    /// Start the camera app writing to `request.output`.
    ///
    /// The launcher keeps `request.resolver` and resolves it once the camera
    /// app returns. An error means the camera could not be started at all.
    fn launch(&self, request: CaptureRequest) -> Result<(), AlbumError>;
}

pub enum CapturePoll {
    Pending(CaptureSession),
    Finished(Result<PathBuf, AlbumError>),
}

/// One capture round trip in flight
#[derive(Debug)]
pub struct CaptureSession {
    pending: PendingCapture,
    rx: oneshot::Receiver<CaptureOutcome>,
}

impl CaptureSession {
    pub fn start(
        folder: &Path,
        kind: MediaKind,
        naming: &CaptureNaming,
        launcher: &dyn CameraLauncher,
    ) -> Result<Self, AlbumError> {
        Self::start_at(folder, kind, naming, launcher, Local::now().naive_local())
    }

    pub fn start_at(
        folder: &Path,
        kind: MediaKind,
        naming: &CaptureNaming,
        launcher: &dyn CameraLauncher,
        at: NaiveDateTime,
    ) -> Result<Self, AlbumError> {
        let pending = PendingCapture::prepare(folder, kind, naming, at)?;
        let (tx, rx) = oneshot::channel();
        launcher.launch(CaptureRequest {
            output: pending.target().to_path_buf(),
            kind,
            resolver: CaptureResolver { tx },
        })?;
        log::debug!("Capture started into {}", pending.target().display());
        Ok(Self { pending, rx })
    }

    pub fn target(&self) -> &Path {
        self.pending.target()
    }

    /// Wait for the platform's answer. A dropped resolver counts as cancelled.
    pub async fn wait(self, indexer: &dyn MediaIndexer) -> Result<PathBuf, AlbumError> {
        let outcome = self.rx.await.unwrap_or(CaptureOutcome::Cancelled);
        self.pending.complete(outcome, indexer)
    }

    /// Non-blocking check for UI loops that cannot await
    pub fn poll(mut self, indexer: &dyn MediaIndexer) -> CapturePoll {
        match self.rx.try_recv() {
            Ok(outcome) => CapturePoll::Finished(self.pending.complete(outcome, indexer)),
            Err(TryRecvError::Empty) => CapturePoll::Pending(self),
            Err(TryRecvError::Closed) => CapturePoll::Finished(
                self.pending.complete(CaptureOutcome::Cancelled, indexer),
            ),
        }
    }
}
