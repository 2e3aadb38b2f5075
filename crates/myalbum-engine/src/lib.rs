pub mod capture;
pub mod error;
pub mod handoff;
pub mod import;
pub mod listing;
pub mod media_index;
pub mod navigation;
pub mod notice;
pub mod permission;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use capture::*;
pub use error::AlbumError;
pub use handoff::{ContentViewer, FOLDER_MIME_HINT, ViewError, open_folder_externally};
pub use import::{CameraDirWatcher, CaptureDetector, MediaImporter, import_file};
pub use listing::{IMAGE_EXTENSIONS, Listing, is_image, read_listing};
pub use media_index::{LogIndexer, MediaIndexer};
pub use navigation::Navigator;
pub use notice::{Notice, NoticeLevel};
pub use permission::*;
