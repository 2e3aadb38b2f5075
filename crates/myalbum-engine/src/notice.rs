//! Transient user-facing notifications.
//!
//! Every operation in the engine either succeeds with a short confirmation or
//! fails with an [`AlbumError`]; both end up as a [`Notice`] the view layer
//! shows for a few seconds.

use crate::error::AlbumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    pub fn folder_created() -> Self {
        Self::info("Folder created successfully")
    }

    pub fn folder_deleted() -> Self {
        Self::info("Folder deleted successfully")
    }

    pub fn image_deleted() -> Self {
        Self::info("Image deleted")
    }

    pub fn captured() -> Self {
        Self::info("Photo captured successfully")
    }

    pub fn imported() -> Self {
        Self::info("Photo moved into album")
    }

    pub fn permission_granted() -> Self {
        Self::info("Storage Permission Granted")
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl From<&AlbumError> for Notice {
    fn from(err: &AlbumError) -> Self {
        let text = match err {
            AlbumError::PermissionDenied => "Storage Permission Denied".to_string(),
            AlbumError::NotFound(_) => "Folder not found".to_string(),
            AlbumError::NoCapableHandler(_) => "No app found to open this folder".to_string(),
            other => other.to_string(),
        };
        Notice::error(text)
    }
}

impl From<AlbumError> for Notice {
    fn from(err: AlbumError) -> Self {
        Notice::from(&err)
    }
}
