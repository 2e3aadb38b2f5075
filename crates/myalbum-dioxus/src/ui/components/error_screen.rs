use dioxus::prelude::*;

/// Full-screen error display, used when the album root itself is unusable
#[component]
pub fn ErrorScreen(title: String, message: String, details: Option<String>) -> Element {
    rsx! {
        div {
            class: "error-screen",
            h1 { "{title}" }
            p { "{message}" }
            if let Some(ref detail_text) = details {
                pre { "{detail_text}" }
            }
        }
    }
}
