use crate::media_index::MediaIndexer;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary album root
pub fn create_test_album() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a file directly inside the album root
pub fn create_test_file(album: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = album.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}

/// Media index that remembers what it was asked to scan
#[derive(Default)]
pub struct RecordingIndexer {
    scanned: Mutex<Vec<PathBuf>>,
}

impl RecordingIndexer {
    pub fn scanned(&self) -> Vec<PathBuf> {
        self.scanned.lock().unwrap().clone()
    }
}

impl MediaIndexer for RecordingIndexer {
    fn scan(&self, path: &Path) {
        self.scanned.lock().unwrap().push(path.to_path_buf());
    }
}
