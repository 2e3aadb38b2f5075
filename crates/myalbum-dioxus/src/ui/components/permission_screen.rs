use dioxus::prelude::*;

/// Shown while storage access is missing. Nothing from the album is listed
/// until access is granted.
#[component]
pub fn PermissionScreen(
    scoped_storage: bool,
    on_open_settings: EventHandler<()>,
    on_recheck: EventHandler<()>,
) -> Element {
    rsx! {
        div {
            class: "permission-notice",
            p {
                class: "permission-title",
                "Storage Permission Required"
            }
            p {
                "The album lives in shared storage, so the app needs permission to read and write files there."
            }
            p {
                class: "permission-instructions",
                if scoped_storage {
                    "On Android 11+, you need to enable 'All files access' in Settings."
                } else {
                    "Please grant storage and camera permission in Settings."
                }
            }
            div {
                class: "permission-buttons",
                button {
                    class: "secondary",
                    onclick: move |_| on_open_settings.call(()),
                    "Open Settings"
                }
                button {
                    class: "primary",
                    onclick: move |_| on_recheck.call(()),
                    "I've granted permission"
                }
            }
        }
    }
}
