mod capture_bar;
mod create_folder_dialog;
mod error_screen;
mod folder_item;
mod image_item;
mod notice_bar;
mod permission_screen;
mod top_bar;

pub use capture_bar::CaptureBar;
pub use create_folder_dialog::CreateFolderDialog;
pub use error_screen::ErrorScreen;
pub use folder_item::FolderItem;
pub use image_item::ImageItem;
pub use notice_bar::NoticeBar;
pub use permission_screen::PermissionScreen;
pub use top_bar::TopBar;
