use dioxus::prelude::*;

/// One subfolder row. Deleting asks for confirmation first since the whole
/// subtree goes with it.
#[component]
pub fn FolderItem(
    name: String,
    on_open: EventHandler<String>,
    on_capture: EventHandler<String>,
    on_delete: EventHandler<String>,
) -> Element {
    let mut confirming = use_signal(|| false);

    rsx! {
        div {
            class: "folder-item",
            div {
                class: "folder-name",
                onclick: {
                    let name = name.clone();
                    move |_| on_open.call(name.clone())
                },
                span { class: "folder-icon", "📁" }
                span { "{name}" }
            }
            if *confirming.read() {
                div {
                    class: "folder-confirm",
                    span { "Delete \"{name}\" and everything in it?" }
                    button {
                        class: "danger",
                        onclick: {
                            let name = name.clone();
                            move |_| {
                                confirming.set(false);
                                on_delete.call(name.clone());
                            }
                        },
                        "Delete"
                    }
                    button {
                        onclick: move |_| confirming.set(false),
                        "Cancel"
                    }
                }
            } else {
                div {
                    class: "folder-actions",
                    button {
                        onclick: {
                            let name = name.clone();
                            move |_| on_capture.call(name.clone())
                        },
                        "Open Camera"
                    }
                    button {
                        class: "danger",
                        onclick: move |_| confirming.set(true),
                        "Delete"
                    }
                }
            }
        }
    }
}
