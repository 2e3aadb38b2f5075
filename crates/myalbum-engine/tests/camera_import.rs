//! Capture-then-move against a real watched camera directory.

use myalbum_engine::{MediaImporter, MediaIndexer};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct Indexer(Mutex<Vec<PathBuf>>);

impl MediaIndexer for Indexer {
    fn scan(&self, path: &Path) {
        self.0.lock().unwrap().push(path.to_path_buf());
    }
}

fn dirs() -> (tempfile::TempDir, PathBuf, PathBuf) {
    let storage = tempfile::tempdir().unwrap();
    let camera = storage.path().join("DCIM").join("Camera");
    let album = storage.path().join("MyAlbum").join("Trip");
    fs::create_dir_all(&camera).unwrap();
    fs::create_dir_all(&album).unwrap();
    (storage, camera, album)
}

#[test]
fn photo_written_in_camera_dir_is_moved_into_album() {
    // Given an importer watching the camera directory
    let (_storage, camera, album) = dirs();
    let mut importer = MediaImporter::start(&camera, &album).unwrap();
    let indexer = Indexer::default();

    // When the camera app writes a photo
    fs::write(camera.join("IMG_20240309_120507.jpg"), b"\xff\xd8\xff").unwrap();

    // Then it ends up in the album, gone from the camera directory
    let imported = importer.import_next(WAIT, &indexer).unwrap().unwrap();
    assert_eq!(imported, album.join("IMG_20240309_120507.jpg"));
    assert!(!camera.join("IMG_20240309_120507.jpg").exists());
    assert_eq!(*indexer.0.lock().unwrap(), vec![imported]);
}

#[test]
fn pending_photo_published_by_rename_is_moved_into_album() {
    // Given an importer watching the camera directory
    let (_storage, camera, album) = dirs();
    let mut importer = MediaImporter::start(&camera, &album).unwrap();

    // When the camera app writes a hidden pending file and renames it into place
    let pending = camera.join(".pending-1700000000-IMG_1.jpg");
    fs::write(&pending, b"\xff\xd8\xff").unwrap();
    fs::rename(&pending, camera.join("IMG_1.jpg")).unwrap();

    // Then the published photo is imported
    let imported = importer
        .import_next(WAIT, &Indexer::default())
        .unwrap()
        .unwrap();
    assert_eq!(imported, album.join("IMG_1.jpg"));
    assert!(!camera.join("IMG_1.jpg").exists());
    assert!(!pending.exists());
}

#[test]
fn photo_moved_in_from_elsewhere_is_imported() {
    let (storage, camera, album) = dirs();
    let staging = storage.path().join("staging.jpg");
    fs::write(&staging, b"\xff\xd8\xff").unwrap();
    let mut importer = MediaImporter::start(&camera, &album).unwrap();

    fs::rename(&staging, camera.join("IMG_2.jpg")).unwrap();

    let imported = importer
        .import_next(WAIT, &Indexer::default())
        .unwrap()
        .unwrap();
    assert_eq!(imported, album.join("IMG_2.jpg"));
}

#[test]
fn nothing_new_times_out() {
    let (_storage, camera, album) = dirs();
    fs::write(camera.join("IMG_old.jpg"), b"\xff\xd8\xff").unwrap();
    let mut importer = MediaImporter::start(&camera, &album).unwrap();

    fs::write(camera.join("notes.txt"), "not a photo").unwrap();

    assert!(
        importer
            .import_next(Duration::from_millis(300), &Indexer::default())
            .is_none()
    );
    assert!(camera.join("IMG_old.jpg").exists());
}
