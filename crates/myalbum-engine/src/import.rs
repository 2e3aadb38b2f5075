//! Capture-then-move: pick up photos the camera app saved in its own
//! directory and move them into an album folder.
//!
//! This is the fallback for hosts that cannot hand the camera an output file.
//! Nothing ties a detected file to a particular capture request, so whatever
//! lands in the camera directory while the detector is running gets imported.

use crate::error::AlbumError;
use crate::media_index::MediaIndexer;
use notify::event::{AccessKind, AccessMode, CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::time::{Duration, Instant};

/// Extensions the camera app may produce
const CAPTURE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "heic", "mp4", "3gp"];

/// How long a file must stay untouched before it counts as written, on
/// platforms that do not report close-after-write.
const DEFAULT_SETTLE: Duration = Duration::from_millis(750);

/// Copy `source` into `target_dir`, then delete `source`.
///
/// The source is only deleted after the copy succeeded, so a failed import
/// never loses the photo. The new location is handed to the media index.
pub fn import_file(
    source: &Path,
    target_dir: &Path,
    indexer: &dyn MediaIndexer,
) -> Result<PathBuf, AlbumError> {
    if !source.is_file() {
        return Err(AlbumError::NotFound(source.to_path_buf()));
    }
    let file_name = source
        .file_name()
        .ok_or_else(|| AlbumError::NotFound(source.to_path_buf()))?;
    if source.parent().map(canonical) == Some(canonical(target_dir)) {
        log::debug!("{} is already in place", source.display());
        indexer.scan(source);
        return Ok(source.to_path_buf());
    }
    let dest = target_dir.join(file_name);
    if dest.exists() {
        return Err(AlbumError::AlreadyExists(dest));
    }

    if let Err(e) = fs::copy(source, &dest) {
        // fs::copy may leave a truncated destination behind
        let _ = fs::remove_file(&dest);
        return Err(AlbumError::io(&dest, e));
    }
    if let Err(e) = fs::remove_file(source) {
        log::warn!(
            "Imported {} but could not remove the original: {e}",
            source.display()
        );
    }

    log::info!("Imported {} into {}", source.display(), dest.display());
    indexer.scan(&dest);
    Ok(dest)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileState {
    Writing,
    Written,
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// What an event says about which of its paths.
///
/// A rename into place publishes a finished file: camera apps write to a
/// hidden pending name first. For a `Both` rename only the destination, the
/// last path, counts.
fn classify(event: &Event) -> Option<(FileState, &[PathBuf])> {
    let paths = event.paths.as_slice();
    match event.kind {
        EventKind::Access(AccessKind::Close(AccessMode::Write))
        | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Any)) => {
            Some((FileState::Written, paths))
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let dest = paths.last()?;
            Some((FileState::Written, std::slice::from_ref(dest)))
        }
        EventKind::Create(CreateKind::File | CreateKind::Any)
        | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => {
            Some((FileState::Writing, paths))
        }
        _ => None,
    }
}

fn is_capture_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'));
    let media = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| CAPTURE_EXTENSIONS.contains(&ext.as_str()));
    !hidden && media
}

/// Turns raw filesystem events into "this file is finished" notifications
pub struct CaptureDetector {
    events: Receiver<Event>,
    settle: Duration,
    writing: HashMap<PathBuf, Instant>,
}

impl CaptureDetector {
    pub fn new(events: Receiver<Event>) -> Self {
        Self::with_settle(events, DEFAULT_SETTLE)
    }

    pub fn with_settle(events: Receiver<Event>, settle: Duration) -> Self {
        Self {
            events,
            settle,
            writing: HashMap::new(),
        }
    }

    /// Wait up to `timeout` for the next finished media file
    pub fn next_capture(&mut self, timeout: Duration) -> Option<PathBuf> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(path) = self.take_settled() {
                return Some(path);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let wait = if self.writing.is_empty() {
                deadline - now
            } else {
                self.settle.min(deadline - now)
            };

            match self.events.recv_timeout(wait) {
                Ok(event) => {
                    if let Some(path) = self.observe(&event) {
                        return Some(path);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return self.take_settled_or_any();
                }
            }
        }
    }

    fn observe(&mut self, event: &Event) -> Option<PathBuf> {
        let (state, paths) = classify(event)?;
        for path in paths.iter().filter(|p| is_capture_file(p)) {
            match state {
                FileState::Written => {
                    self.writing.remove(path);
                    if path.is_file() {
                        return Some(path.clone());
                    }
                }
                FileState::Writing => {
                    self.writing.insert(path.clone(), Instant::now());
                }
            }
        }
        None
    }

    fn take_settled(&mut self) -> Option<PathBuf> {
        let settled = self
            .writing
            .iter()
            .find(|(_, seen)| seen.elapsed() >= self.settle)
            .map(|(path, _)| path.clone())?;
        self.writing.remove(&settled);
        settled.is_file().then_some(settled)
    }

    fn take_settled_or_any(&mut self) -> Option<PathBuf> {
        let path = self.writing.keys().find(|p| p.is_file()).cloned()?;
        self.writing.remove(&path);
        Some(path)
    }
}

/// Watches the camera app's output directory
pub struct CameraDirWatcher {
    _watcher: RecommendedWatcher,
    detector: CaptureDetector,
}

impl CameraDirWatcher {
    pub fn watch(camera_dir: &Path) -> Result<Self, AlbumError> {
        if !camera_dir.is_dir() {
            return Err(AlbumError::NotFound(camera_dir.to_path_buf()));
        }
        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(e) => log::warn!("Camera directory watch error: {e}"),
        })
        .map_err(|e| AlbumError::io(camera_dir, std::io::Error::other(e)))?;

        watcher
            .watch(camera_dir, RecursiveMode::NonRecursive)
            .map_err(|e| AlbumError::io(camera_dir, std::io::Error::other(e)))?;
        log::info!("Watching {} for new captures", camera_dir.display());

        Ok(Self {
            _watcher: watcher,
            detector: CaptureDetector::new(rx),
        })
    }

    pub fn next_capture(&mut self, timeout: Duration) -> Option<PathBuf> {
        self.detector.next_capture(timeout)
    }
}

/// Moves everything the camera app writes into one album folder
pub struct MediaImporter {
    watcher: CameraDirWatcher,
    target_dir: PathBuf,
}

impl MediaImporter {
    pub fn start(camera_dir: &Path, target_dir: impl Into<PathBuf>) -> Result<Self, AlbumError> {
        let target_dir = target_dir.into();
        if !target_dir.is_dir() {
            return Err(AlbumError::NotADirectory(target_dir));
        }
        Ok(Self {
            watcher: CameraDirWatcher::watch(camera_dir)?,
            target_dir,
        })
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Import the next capture, if one shows up within `timeout`
    pub fn import_next(
        &mut self,
        timeout: Duration,
        indexer: &dyn MediaIndexer,
    ) -> Option<Result<PathBuf, AlbumError>> {
        let source = self.watcher.next_capture(timeout)?;
        Some(import_file(&source, &self.target_dir, indexer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{RecordingIndexer, create_test_album};
    use rstest::rstest;
    use std::sync::mpsc::Sender;

    fn event(kind: EventKind, path: &Path) -> Event {
        Event::new(kind).add_path(path.to_path_buf())
    }

    fn detector() -> (Sender<Event>, CaptureDetector) {
        let (tx, rx) = channel();
        (tx, CaptureDetector::with_settle(rx, Duration::from_millis(20)))
    }

    #[test]
    fn test_import_moves_file() {
        // Given a photo in the camera directory
        let camera = create_test_album();
        let album = create_test_album();
        let source = camera.path().join("IMG_20240309_120507.jpg");
        fs::write(&source, "jpeg bytes").unwrap();
        let indexer = RecordingIndexer::default();

        // When importing it
        let dest = import_file(&source, album.path(), &indexer).unwrap();

        // Then it lives in the album only, and the index knows about it
        assert_eq!(dest, album.path().join("IMG_20240309_120507.jpg"));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "jpeg bytes");
        assert!(!source.exists());
        assert_eq!(indexer.scanned(), vec![dest]);
    }

    #[test]
    fn test_failed_copy_keeps_source() {
        // Given a target folder that does not exist
        let camera = create_test_album();
        let source = camera.path().join("IMG_1.jpg");
        fs::write(&source, "jpeg bytes").unwrap();
        let missing = camera.path().join("missing").join("deeper");
        let indexer = RecordingIndexer::default();

        // When importing
        let result = import_file(&source, &missing, &indexer);

        // Then the copy failure is reported and the source is intact
        assert!(matches!(result, Err(AlbumError::Io { .. })));
        assert_eq!(fs::read_to_string(&source).unwrap(), "jpeg bytes");
        assert!(indexer.scanned().is_empty());
    }

    #[test]
    fn test_import_refuses_to_overwrite() {
        let camera = create_test_album();
        let album = create_test_album();
        let source = camera.path().join("IMG_1.jpg");
        fs::write(&source, "new").unwrap();
        fs::write(album.path().join("IMG_1.jpg"), "old").unwrap();

        let result = import_file(&source, album.path(), &RecordingIndexer::default());

        assert!(matches!(result, Err(AlbumError::AlreadyExists(_))));
        assert!(source.exists());
        assert_eq!(
            fs::read_to_string(album.path().join("IMG_1.jpg")).unwrap(),
            "old"
        );
    }

    #[test]
    fn test_import_missing_source() {
        let album = create_test_album();
        let result = import_file(
            &album.path().join("gone.jpg"),
            album.path(),
            &RecordingIndexer::default(),
        );
        assert!(matches!(result, Err(AlbumError::NotFound(_))));
    }

    #[rstest]
    #[case("IMG_1.jpg", true)]
    #[case("VID_1.mp4", true)]
    #[case("PXL_1.HEIC", true)]
    #[case(".pending-1700000000-IMG_1.jpg", false)]
    #[case("thumbs.db", false)]
    fn test_capture_file_filter(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_capture_file(Path::new(name)), expected);
    }

    #[test]
    fn test_close_after_write_is_reported_immediately() {
        let camera = create_test_album();
        let photo = camera.path().join("IMG_1.jpg");
        fs::write(&photo, "x").unwrap();
        let (tx, mut detector) = detector();

        tx.send(event(EventKind::Create(CreateKind::File), &photo))
            .unwrap();
        tx.send(event(
            EventKind::Access(AccessKind::Close(AccessMode::Write)),
            &photo,
        ))
        .unwrap();

        assert_eq!(detector.next_capture(Duration::from_secs(1)), Some(photo));
    }

    #[test]
    fn test_created_file_is_reported_once_settled() {
        let camera = create_test_album();
        let photo = camera.path().join("IMG_2.jpg");
        fs::write(&photo, "x").unwrap();
        let (tx, mut detector) = detector();

        tx.send(event(EventKind::Create(CreateKind::File), &photo))
            .unwrap();

        assert_eq!(detector.next_capture(Duration::from_secs(2)), Some(photo));
    }

    #[test]
    fn test_ignores_temp_and_foreign_files() {
        let camera = create_test_album();
        let temp = camera.path().join(".pending-IMG_3.jpg");
        let text = camera.path().join("notes.txt");
        fs::write(&temp, "x").unwrap();
        fs::write(&text, "x").unwrap();
        let (tx, mut detector) = detector();

        tx.send(event(EventKind::Create(CreateKind::File), &temp))
            .unwrap();
        tx.send(event(EventKind::Create(CreateKind::File), &text))
            .unwrap();

        assert_eq!(detector.next_capture(Duration::from_millis(200)), None);
    }

    #[test]
    fn test_rename_into_place_is_reported() {
        // Given a camera app that publishes a pending file by renaming it
        let camera = create_test_album();
        let pending = camera.path().join(".pending-1700000000-IMG_4.jpg");
        let photo = camera.path().join("IMG_4.jpg");
        fs::write(&photo, "x").unwrap();
        let (tx, mut detector) = detector();

        // When only the rename is seen
        tx.send(event(EventKind::Create(CreateKind::File), &pending))
            .unwrap();
        tx.send(
            Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
                .add_path(pending.clone())
                .add_path(photo.clone()),
        )
        .unwrap();

        // Then the published name is reported
        assert_eq!(detector.next_capture(Duration::from_secs(1)), Some(photo));
    }

    #[test]
    fn test_rename_to_is_reported() {
        let camera = create_test_album();
        let photo = camera.path().join("IMG_5.jpg");
        fs::write(&photo, "x").unwrap();
        let (tx, mut detector) = detector();

        tx.send(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &photo,
        ))
        .unwrap();

        assert_eq!(detector.next_capture(Duration::from_secs(1)), Some(photo));
    }

    #[test]
    fn test_rename_away_is_ignored() {
        let camera = create_test_album();
        let gone = camera.path().join("IMG_6.jpg");
        let (tx, mut detector) = detector();

        tx.send(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            &gone,
        ))
        .unwrap();

        assert_eq!(detector.next_capture(Duration::from_millis(100)), None);
    }

    #[test]
    fn test_import_in_place_is_indexed() {
        let album = create_test_album();
        let photo = album.path().join("IMG_1.jpg");
        fs::write(&photo, "x").unwrap();
        let indexer = RecordingIndexer::default();

        let dest = import_file(&photo, album.path(), &indexer).unwrap();

        assert_eq!(dest, photo);
        assert!(photo.exists());
        assert_eq!(indexer.scanned(), vec![photo]);
    }

    #[cfg(unix)]
    #[test]
    fn test_import_in_place_through_symlinked_target() {
        use std::os::unix::fs::symlink;

        let storage = create_test_album();
        let album = storage.path().join("MyAlbum");
        fs::create_dir(&album).unwrap();
        symlink(&album, storage.path().join("link")).unwrap();
        let photo = album.join("IMG_1.jpg");
        fs::write(&photo, "x").unwrap();

        let dest = import_file(
            &photo,
            &storage.path().join("link"),
            &RecordingIndexer::default(),
        )
        .unwrap();

        assert_eq!(dest, photo);
        assert_eq!(fs::read_to_string(&photo).unwrap(), "x");
    }

    #[test]
    fn test_times_out_without_events() {
        let (_tx, mut detector) = detector();
        assert_eq!(detector.next_capture(Duration::from_millis(50)), None);
    }

    #[test]
    fn test_watch_requires_directory() {
        let result = CameraDirWatcher::watch(Path::new("/this/path/does/not/exist"));
        assert!(matches!(result, Err(AlbumError::NotFound(_))));
    }
}
