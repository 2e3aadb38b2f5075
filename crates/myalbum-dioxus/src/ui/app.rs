use super::components::{
    CaptureBar, CreateFolderDialog, ErrorScreen, FolderItem, ImageItem, NoticeBar,
    PermissionScreen, TopBar,
};
use crate::platform::{Camera, Platform, launch_camera};
use dioxus::prelude::*;
use myalbum_config::{CaptureConfig, CaptureStrategy};
use myalbum_engine::{
    AlbumError, CaptureNaming, CaptureOutcome, CapturePoll, CaptureResolver, CaptureSession,
    GateStatus, Listing, MediaImporter, MediaIndexer, MediaKind, Navigator, Notice,
    PermissionAnswer, PermissionGate, PermissionSurface, open_album, open_folder_externally,
    required_permissions,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::oneshot;

const ALBUM_CSS: &str = include_str!("../assets/album.css");

/// How long a notice stays on screen
const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// How long the capture-then-move importer waits for the camera app
const IMPORT_TIMEOUT: Duration = Duration::from_secs(120);

/// Startup settings handed to the app through the launch context
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub root: PathBuf,
    pub capture: CaptureConfig,
}

impl AppSettings {
    fn naming(&self) -> CaptureNaming {
        CaptureNaming {
            image_prefix: self.capture.image_prefix.clone(),
            video_prefix: self.capture.video_prefix.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Checking,
    Granted,
    Denied,
}

/// A direct-output capture whose camera app is still open
struct WaitingCapture {
    session: CaptureSession,
    resolver: CaptureResolver,
}

/// All UI state, one signal per concern
#[derive(Clone, Copy)]
struct AlbumState {
    navigator: Signal<Navigator>,
    access: Signal<Access>,
    notice: Signal<Option<Notice>>,
    waiting: Signal<Option<WaitingCapture>>,
    importing: Signal<bool>,
}

impl AlbumState {
    fn notify(mut self, notice: Notice) {
        if notice.is_error() {
            log::warn!("{}", notice.text);
        }
        self.notice.set(Some(notice.clone()));

        let mut shown = self.notice;
        spawn(async move {
            tokio::time::sleep(NOTICE_DURATION).await;
            if shown.peek().as_ref() == Some(&notice) {
                shown.set(None);
            }
        });
    }

    fn report<T>(self, result: Result<T, AlbumError>, success: Notice) {
        match result {
            Ok(_) => self.notify(success),
            Err(e) => self.notify(e.into()),
        }
    }

    /// Ask the platform for storage access, requesting whatever is missing
    fn check_access(mut self) {
        match PermissionGate::check(&Platform) {
            GateStatus::Granted => self.apply_decision(Ok(()), true),
            GateStatus::Pending(mut ticket) => match settle(ticket.poll()) {
                Some((decision, announce)) => self.apply_decision(decision, announce),
                None => {
                    self.access.set(Access::Checking);
                    spawn(async move {
                        let decision = ticket.wait().await;
                        self.apply_decision(decision, true);
                    });
                }
            },
        }
    }

    /// Re-query without opening any settings page
    fn recheck_access(self) {
        let granted = required_permissions(&Platform)
            .into_iter()
            .all(|p| Platform.is_granted(p));
        let decision = if granted {
            Ok(())
        } else {
            Err(AlbumError::PermissionDenied)
        };
        self.apply_decision(decision, true);
    }

    fn apply_decision(mut self, decision: Result<(), AlbumError>, announce: bool) {
        let was_denied = *self.access.peek() == Access::Denied;
        let result = open_album(&mut self.navigator.write(), decision);
        match result {
            Ok(()) => {
                self.access.set(Access::Granted);
                if was_denied {
                    self.notify(Notice::permission_granted());
                }
            }
            Err(e) => {
                self.access.set(Access::Denied);
                if announce {
                    self.notify(e.into());
                }
            }
        }
    }

    fn enter_folder(mut self, name: &str) {
        let result = self.navigator.write().enter_folder(name);
        if let Err(e) = result {
            self.notify(e.into());
        }
    }

    fn go_back(mut self) {
        if !self.navigator.write().go_to_parent() {
            log::debug!("Already at the album root");
        }
    }

    fn create_folder(mut self, name: &str) {
        let result = self.navigator.write().create_folder(name);
        self.report(result, Notice::folder_created());
    }

    fn delete_folder(mut self, name: &str) {
        let result = self.navigator.write().delete_folder(name);
        self.report(result, Notice::folder_deleted());
    }

    fn delete_image(mut self, image: &Path) {
        let result = self.navigator.write().delete_image(image);
        if let Ok(removed) = &result {
            Platform.scan(removed);
        }
        self.report(result, Notice::image_deleted());
    }

    fn open_externally(self) {
        let folder = self.navigator.peek().current().to_path_buf();
        if let Err(e) = open_folder_externally(&folder, &Platform, &Platform) {
            self.notify(e.into());
        }
    }

    /// Capture into a subfolder of the current folder, or into the current
    /// folder itself when `folder_name` is `None`
    fn capture(self, folder_name: Option<&str>, kind: MediaKind, settings: &AppSettings) {
        if self.waiting.peek().is_some() || *self.importing.peek() {
            self.notify(Notice::info("The camera is already open"));
            return;
        }

        let folder = self.navigator.peek().folder_path(folder_name);
        let folder = match folder {
            Ok(folder) => folder,
            Err(e) => return self.notify(e.into()),
        };

        match (settings.capture.strategy, settings.capture.camera_dir.as_deref()) {
            (CaptureStrategy::CaptureThenMove, Some(camera_dir)) => {
                self.capture_then_move(camera_dir, folder, kind)
            }
            (CaptureStrategy::CaptureThenMove, None) => {
                log::warn!("No camera folder configured, capturing directly instead");
                self.capture_direct(&folder, kind, &settings.naming())
            }
            (CaptureStrategy::DirectOutput, _) => {
                self.capture_direct(&folder, kind, &settings.naming())
            }
        }
    }

    fn capture_direct(mut self, folder: &Path, kind: MediaKind, naming: &CaptureNaming) {
        let camera = Camera::default();
        match CaptureSession::start(folder, kind, naming, &camera) {
            Ok(session) => match camera.take_waiting() {
                Some(resolver) => self.waiting.set(Some(WaitingCapture { session, resolver })),
                None => log::error!("Camera started without keeping the capture request"),
            },
            Err(e) => self.notify(e.into()),
        }
    }

    /// Settle the open direct-output capture with the user's answer
    fn finish_capture(mut self, outcome: CaptureOutcome) {
        let Some(WaitingCapture { session, resolver }) = self.waiting.write().take() else {
            return;
        };
        resolver.resolve(outcome);

        match session.poll(&Platform) {
            CapturePoll::Finished(Ok(_)) => {
                self.navigator.write().refresh();
                self.notify(Notice::captured());
            }
            CapturePoll::Finished(Err(e)) => {
                if outcome == CaptureOutcome::Completed {
                    self.notify(e.into());
                } else {
                    log::info!("Capture cancelled");
                }
            }
            CapturePoll::Pending(_) => log::error!("Capture outcome was sent but not received"),
        }
    }

    fn capture_then_move(mut self, camera_dir: &Path, folder: PathBuf, kind: MediaKind) {
        let mut importer = match MediaImporter::start(camera_dir, &folder) {
            Ok(importer) => importer,
            Err(e) => return self.notify(e.into()),
        };
        if !launch_camera(None, kind) {
            return self.notify(AlbumError::NoCapableHandler(folder).into());
        }
        self.importing.set(true);

        let (tx, rx) = oneshot::channel();
        std::thread::spawn(move || {
            let imported = importer.import_next(IMPORT_TIMEOUT, &Platform);
            if tx.send(imported).is_err() {
                log::debug!("Import finished after the app stopped waiting");
            }
        });

        spawn(async move {
            let imported = rx.await.ok().flatten();
            self.importing.set(false);
            match imported {
                Some(Ok(path)) => {
                    log::info!("Imported {}", path.display());
                    self.navigator.write().refresh();
                    self.notify(Notice::imported());
                }
                Some(Err(e)) => self.notify(e.into()),
                None => self.notify(Notice::info("No new photo found")),
            }
        });
    }
}

/// Decision for an answered permission request, and whether a denial is
/// worth a notice. A request dropped unanswered (the settings page was
/// opened) stays quiet; `None` while the user is still deciding.
fn settle(answer: PermissionAnswer) -> Option<(Result<(), AlbumError>, bool)> {
    match answer {
        PermissionAnswer::Pending => None,
        PermissionAnswer::Granted => Some((Ok(()), true)),
        PermissionAnswer::Denied => Some((Err(AlbumError::PermissionDenied), true)),
        PermissionAnswer::Unanswered => Some((Err(AlbumError::PermissionDenied), false)),
    }
}

#[component]
pub fn App() -> Element {
    let settings = use_context::<AppSettings>();
    let root = settings.root.clone();

    let navigator = use_signal(|| Navigator::new(root));
    let access = use_signal(|| Access::Checking);
    let notice = use_signal(|| None::<Notice>);
    let waiting = use_signal(|| None::<WaitingCapture>);
    let importing = use_signal(|| false);
    let mut creating = use_signal(|| false);

    let state = AlbumState {
        navigator,
        access,
        notice,
        waiting,
        importing,
    };

    use_effect(move || state.check_access());

    let body = match *access.read() {
        Access::Checking => rsx! {
            div { class: "status", "Checking storage access…" }
        },
        Access::Denied => rsx! {
            PermissionScreen {
                scoped_storage: Platform.supports_manage_all_files(),
                on_open_settings: move |_| state.check_access(),
                on_recheck: move |_| state.recheck_access(),
            }
        },
        Access::Granted if !navigator.read().root().is_dir() => rsx! {
            ErrorScreen {
                title: "Album unavailable",
                message: "The album folder could not be found.",
                details: Some(navigator.read().root().display().to_string()),
            }
        },
        Access::Granted => {
            let nav = navigator.read();
            let Listing { folders, images } = nav.listing().clone();
            let empty = folders.is_empty() && images.is_empty();
            let breadcrumb = nav.relative_current().display().to_string();
            let title = nav.title();
            let can_go_back = !nav.is_at_root();
            drop(nav);

            rsx! {
                TopBar {
                    title,
                    breadcrumb,
                    can_go_back,
                    on_back: move |_| state.go_back(),
                    on_capture: {
                        let settings = settings.clone();
                        move |kind: MediaKind| state.capture(None, kind, &settings)
                    },
                    on_open_externally: move |_| state.open_externally(),
                }
                if let Some(capture) = waiting.read().as_ref() {
                    CaptureBar {
                        target: capture
                            .session
                            .target()
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        on_done: move |_| state.finish_capture(CaptureOutcome::Completed),
                        on_cancel: move |_| state.finish_capture(CaptureOutcome::Cancelled),
                    }
                }
                if *importing.read() {
                    div { class: "capture-bar", "Waiting for a new photo from the camera…" }
                }
                main {
                    class: "album",
                    if empty {
                        p { class: "empty", "This folder is empty" }
                    }
                    div {
                        class: "folder-list",
                        for name in folders {
                            FolderItem {
                                key: "{name}",
                                name: name.clone(),
                                on_open: move |name: String| state.enter_folder(&name),
                                on_capture: {
                                    let settings = settings.clone();
                                    move |name: String| {
                                        state.capture(Some(&name), MediaKind::Image, &settings)
                                    }
                                },
                                on_delete: move |name: String| state.delete_folder(&name),
                            }
                        }
                    }
                    div {
                        class: "image-grid",
                        for image in images {
                            ImageItem {
                                key: "{image.display()}",
                                path: image.clone(),
                                on_delete: move |path: PathBuf| state.delete_image(&path),
                            }
                        }
                    }
                }
                button {
                    class: "fab",
                    title: "New folder",
                    onclick: move |_| creating.set(true),
                    "+"
                }
                if *creating.read() {
                    CreateFolderDialog {
                        on_create: move |name: String| {
                            creating.set(false);
                            state.create_folder(&name);
                        },
                        on_cancel: move |_| creating.set(false),
                    }
                }
            }
        }
    };

    rsx! {
        style { {ALBUM_CSS} }
        div {
            class: "app-container",
            {body}
            if let Some(current) = notice.read().as_ref() {
                NoticeBar {
                    notice: current.clone(),
                    on_dismiss: {
                        let mut notice = notice;
                        move |_| notice.set(None)
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dioxus::dioxus_core::VirtualDom;
    use dioxus_ssr::render;
    use std::fs;
    use tempfile::TempDir;

    fn render_app(settings: AppSettings) -> String {
        let mut dom = VirtualDom::new(App).with_root_context(settings);
        dom.rebuild_in_place();
        render(&dom)
    }

    fn settings_for(root: &Path) -> AppSettings {
        AppSettings {
            root: root.to_path_buf(),
            capture: CaptureConfig::default(),
        }
    }

    #[test]
    fn test_app_renders_without_notice() {
        // Given an album with one folder
        let album = TempDir::new().unwrap();
        fs::create_dir(album.path().join("Trips")).unwrap();

        // When the app renders for the first time
        let html = render_app(settings_for(album.path()));

        // Then the shell is there and nothing has been reported yet
        assert!(html.contains("app-container"));
        assert!(!html.contains("notice-bar"));
    }

    #[test]
    fn test_unanswered_request_denies_quietly() {
        let (decision, announce) = settle(PermissionAnswer::Unanswered).unwrap();

        assert!(matches!(decision, Err(AlbumError::PermissionDenied)));
        assert!(!announce);
    }

    #[test]
    fn test_explicit_answers_are_announced() {
        assert!(settle(PermissionAnswer::Pending).is_none());

        let (granted, announce) = settle(PermissionAnswer::Granted).unwrap();
        assert!(granted.is_ok());
        assert!(announce);

        let (denied, announce) = settle(PermissionAnswer::Denied).unwrap();
        assert!(matches!(denied, Err(AlbumError::PermissionDenied)));
        assert!(announce);
    }

    #[test]
    fn test_settings_naming_uses_configured_prefixes() {
        let settings = AppSettings {
            root: PathBuf::from("/album"),
            capture: CaptureConfig {
                image_prefix: "MEDIA".to_string(),
                ..CaptureConfig::default()
            },
        };

        let naming = settings.naming();

        assert_eq!(naming.image_prefix, "MEDIA");
        assert_eq!(naming.video_prefix, "VID");
    }
}
