//! Storage and camera access gate.
//!
//! Every access-requiring action asks the platform afresh; nothing here
//! remembers an earlier answer. When access is missing the platform gets a
//! [`PermissionRequest`] and answers it once through its
//! [`PermissionResponder`], typically from an activity-result callback.

use crate::error::AlbumError;
use crate::navigation::Navigator;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// The single broad grant on scoped-storage systems (Android 11+)
    ManageAllFiles,
    ReadStorage,
    WriteStorage,
    Camera,
}

const DISCRETE_PERMISSIONS: [Permission; 3] = [
    Permission::ReadStorage,
    Permission::WriteStorage,
    Permission::Camera,
];

/// The platform's permission surface
pub trait PermissionSurface {
    /// Whether the system uses the single "manage all files" grant
    fn supports_manage_all_files(&self) -> bool;

    fn is_granted(&self, permission: Permission) -> bool;

    /// Ask the user. The surface keeps `request.responder` and answers once.
    fn request(&self, request: PermissionRequest);
}

#[derive(Debug)]
pub struct PermissionResponder {
    tx: oneshot::Sender<bool>,
}

impl PermissionResponder {
    pub fn respond(self, granted: bool) {
        if self.tx.send(granted).is_err() {
            log::debug!("Permission answer arrived after the gate was dropped");
        }
    }
}

#[derive(Debug)]
pub struct PermissionRequest {
    pub permissions: Vec<Permission>,
    pub responder: PermissionResponder,
}

/// An outstanding permission request
#[derive(Debug)]
pub struct PermissionTicket {
    rx: oneshot::Receiver<bool>,
}

impl PermissionTicket {
    /// Wait for the user's answer. A dropped responder counts as denial.
    pub async fn wait(self) -> Result<(), AlbumError> {
        decision(self.rx.await.unwrap_or(false))
    }

    /// `None` while the user has not answered yet
    pub fn try_resolve(&mut self) -> Option<Result<(), AlbumError>> {
        match self.poll() {
            PermissionAnswer::Pending => None,
            PermissionAnswer::Granted => Some(Ok(())),
            PermissionAnswer::Denied | PermissionAnswer::Unanswered => {
                Some(Err(AlbumError::PermissionDenied))
            }
        }
    }

    /// Like [`PermissionTicket::try_resolve`], but tells an explicit denial
    /// apart from a request the platform dropped without asking the user
    pub fn poll(&mut self) -> PermissionAnswer {
        match self.rx.try_recv() {
            Ok(true) => PermissionAnswer::Granted,
            Ok(false) => PermissionAnswer::Denied,
            Err(TryRecvError::Empty) => PermissionAnswer::Pending,
            Err(TryRecvError::Closed) => PermissionAnswer::Unanswered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionAnswer {
    Pending,
    Granted,
    Denied,
    /// The responder was dropped, e.g. the platform sent the user to a
    /// settings page whose result it never sees
    Unanswered,
}

fn decision(granted: bool) -> Result<(), AlbumError> {
    if granted {
        Ok(())
    } else {
        Err(AlbumError::PermissionDenied)
    }
}

#[derive(Debug)]
pub enum GateStatus {
    Granted,
    Pending(PermissionTicket),
}

pub fn required_permissions(surface: &dyn PermissionSurface) -> Vec<Permission> {
    if surface.supports_manage_all_files() {
        vec![Permission::ManageAllFiles]
    } else {
        DISCRETE_PERMISSIONS.to_vec()
    }
}

pub struct PermissionGate;

impl PermissionGate {
    /// Query the platform; request whatever is missing
    pub fn check(surface: &dyn PermissionSurface) -> GateStatus {
        let required = required_permissions(surface);
        let missing: Vec<Permission> = required
            .iter()
            .copied()
            .filter(|p| !surface.is_granted(*p))
            .collect();

        if missing.is_empty() {
            log::debug!("All permissions granted: {required:?}");
            return GateStatus::Granted;
        }

        log::info!("Requesting permissions: {missing:?}");
        let (tx, rx) = oneshot::channel();
        surface.request(PermissionRequest {
            permissions: missing,
            responder: PermissionResponder { tx },
        });
        GateStatus::Pending(PermissionTicket { rx })
    }
}

/// Apply the gate's decision to the navigator: load on grant, empty on denial.
///
/// A grant also creates the root when it is missing, since creating it
/// before access was granted may have failed.
pub fn open_album(
    navigator: &mut Navigator,
    decision: Result<(), AlbumError>,
) -> Result<(), AlbumError> {
    match decision.and_then(|()| navigator.ensure_root()) {
        Ok(()) => {
            navigator.refresh();
            Ok(())
        }
        Err(e) => {
            log::warn!("Album not loaded: {e}");
            navigator.clear_listing();
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::create_test_album;
    use std::cell::RefCell;
    use std::collections::HashSet;

    struct FakeSurface {
        scoped: bool,
        granted: HashSet<Permission>,
        requests: RefCell<Vec<PermissionRequest>>,
    }

    impl FakeSurface {
        fn new(scoped: bool, granted: &[Permission]) -> Self {
            Self {
                scoped,
                granted: granted.iter().copied().collect(),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn take(&self) -> PermissionRequest {
            self.requests.borrow_mut().pop().unwrap()
        }
    }

    impl PermissionSurface for FakeSurface {
        fn supports_manage_all_files(&self) -> bool {
            self.scoped
        }

        fn is_granted(&self, permission: Permission) -> bool {
            self.granted.contains(&permission)
        }

        fn request(&self, request: PermissionRequest) {
            self.requests.borrow_mut().push(request);
        }
    }

    #[test]
    fn test_scoped_storage_needs_one_permission() {
        let surface = FakeSurface::new(true, &[]);
        assert_eq!(
            required_permissions(&surface),
            vec![Permission::ManageAllFiles]
        );
    }

    #[test]
    fn test_legacy_storage_needs_three_permissions() {
        let surface = FakeSurface::new(false, &[]);
        assert_eq!(
            required_permissions(&surface),
            vec![
                Permission::ReadStorage,
                Permission::WriteStorage,
                Permission::Camera
            ]
        );
    }

    #[test]
    fn test_granted_proceeds_without_request() {
        let surface = FakeSurface::new(true, &[Permission::ManageAllFiles]);

        assert!(matches!(
            PermissionGate::check(&surface),
            GateStatus::Granted
        ));
        assert!(surface.requests.borrow().is_empty());
    }

    #[test]
    fn test_only_missing_permissions_are_requested() {
        let surface = FakeSurface::new(false, &[Permission::ReadStorage]);

        let status = PermissionGate::check(&surface);

        assert!(matches!(status, GateStatus::Pending(_)));
        assert_eq!(
            surface.take().permissions,
            vec![Permission::WriteStorage, Permission::Camera]
        );
    }

    #[test]
    fn test_grant_loads_album() {
        // Given an album with a folder and a gate waiting on the user
        let album = create_test_album();
        std::fs::create_dir(album.path().join("Trip")).unwrap();
        let mut navigator = Navigator::new(album.path());
        let surface = FakeSurface::new(true, &[]);
        let GateStatus::Pending(mut ticket) = PermissionGate::check(&surface) else {
            panic!("expected a pending request");
        };
        assert!(ticket.try_resolve().is_none());

        // When the user grants access
        surface.take().responder.respond(true);
        let decision = ticket.try_resolve().unwrap();

        // Then the listing is loaded
        open_album(&mut navigator, decision).unwrap();
        assert!(navigator.listing().contains_folder("Trip"));
    }

    #[test]
    fn test_denial_leaves_listing_empty() {
        let album = create_test_album();
        std::fs::create_dir(album.path().join("Trip")).unwrap();
        let mut navigator = Navigator::open(album.path()).unwrap();
        let surface = FakeSurface::new(false, &[]);
        let GateStatus::Pending(mut ticket) = PermissionGate::check(&surface) else {
            panic!("expected a pending request");
        };

        surface.take().responder.respond(false);
        let result = open_album(&mut navigator, ticket.try_resolve().unwrap());

        assert!(matches!(result, Err(AlbumError::PermissionDenied)));
        assert!(navigator.listing().is_empty());
    }

    #[test]
    fn test_grant_creates_missing_root() {
        // Given a root that could not be created before access was granted
        let storage = create_test_album();
        let root = storage.path().join("MyAlbum");
        let mut navigator = Navigator::new(&root);

        // When access is granted
        open_album(&mut navigator, Ok(())).unwrap();

        // Then the root exists and its listing is empty
        assert!(root.is_dir());
        assert!(navigator.listing().is_empty());
    }

    #[test]
    fn test_grant_with_unusable_root_reports_error() {
        let storage = create_test_album();
        let root = storage.path().join("MyAlbum");
        std::fs::write(&root, "x").unwrap();
        let mut navigator = Navigator::new(&root);

        let result = open_album(&mut navigator, Ok(()));

        assert!(matches!(result, Err(AlbumError::NotADirectory(_))));
        assert!(navigator.listing().is_empty());
    }

    #[test]
    fn test_poll_separates_denial_from_dropped_request() {
        let surface = FakeSurface::new(true, &[]);
        let GateStatus::Pending(mut denied) = PermissionGate::check(&surface) else {
            panic!("expected a pending request");
        };
        surface.take().responder.respond(false);
        assert_eq!(denied.poll(), PermissionAnswer::Denied);

        let GateStatus::Pending(mut dropped) = PermissionGate::check(&surface) else {
            panic!("expected a pending request");
        };
        assert_eq!(dropped.poll(), PermissionAnswer::Pending);
        drop(surface.take());
        assert_eq!(dropped.poll(), PermissionAnswer::Unanswered);
    }

    #[tokio::test]
    async fn test_dropped_request_counts_as_denied() {
        let surface = FakeSurface::new(true, &[]);
        let GateStatus::Pending(ticket) = PermissionGate::check(&surface) else {
            panic!("expected a pending request");
        };

        drop(surface.take());

        assert!(matches!(
            ticket.wait().await,
            Err(AlbumError::PermissionDenied)
        ));
    }
}
