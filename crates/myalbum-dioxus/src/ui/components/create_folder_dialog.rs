use dioxus::prelude::*;

/// Modal asking for a new folder's name. Validation happens in the engine,
/// so whatever was typed is passed on unchanged.
#[component]
pub fn CreateFolderDialog(on_create: EventHandler<String>, on_cancel: EventHandler<()>) -> Element {
    let mut name = use_signal(String::new);

    rsx! {
        div {
            class: "dialog-backdrop",
            div {
                class: "dialog",
                h2 { "New folder" }
                input {
                    r#type: "text",
                    placeholder: "Folder name",
                    autofocus: true,
                    value: "{name}",
                    oninput: move |evt| name.set(evt.value()),
                }
                div {
                    class: "dialog-buttons",
                    button {
                        onclick: move |_| on_cancel.call(()),
                        "Cancel"
                    }
                    button {
                        class: "primary",
                        onclick: move |_| on_create.call(name.read().clone()),
                        "Create"
                    }
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

    #[test]
    fn test_dialog_starts_empty() {
        let mut dom = VirtualDom::new(|| {
            rsx! {
                CreateFolderDialog { on_create: |_| {}, on_cancel: |_| {} }
            }
        });
        dom.rebuild_in_place();
        let html = render(&dom);

        assert!(html.contains("New folder"));
        assert!(html.contains("Folder name"));
        assert!(html.contains("Create"));
    }
}
