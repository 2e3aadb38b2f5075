use dioxus::prelude::*;
use std::path::PathBuf;

#[component]
pub fn ImageItem(path: PathBuf, on_delete: EventHandler<PathBuf>) -> Element {
    let src = path.display().to_string();
    let caption = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    rsx! {
        figure {
            class: "image-item",
            img { src: "{src}", alt: "{caption}", loading: "lazy" }
            figcaption {
                span { "{caption}" }
                button {
                    class: "danger",
                    title: "Delete image",
                    onclick: move |_| on_delete.call(path.clone()),
                    "✕"
                }
            }
        }
    }
}
