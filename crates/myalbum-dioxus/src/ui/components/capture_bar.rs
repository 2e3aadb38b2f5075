use dioxus::prelude::*;

/// Shown while the camera app is open. The Dioxus activity never hears back
/// from the camera, so the user reports the outcome.
#[component]
pub fn CaptureBar(target: String, on_done: EventHandler<()>, on_cancel: EventHandler<()>) -> Element {
    rsx! {
        div {
            class: "capture-bar",
            span { "Waiting for the camera: {target}" }
            button {
                class: "primary",
                onclick: move |_| on_done.call(()),
                "Done"
            }
            button {
                onclick: move |_| on_cancel.call(()),
                "Cancel"
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
    fn test_capture_bar_names_target() {
        let mut dom = VirtualDom::new(|| {
            rsx! {
                CaptureBar {
                    target: "IMG_20240309_120507.jpg",
                    on_done: |_| {},
                    on_cancel: |_| {},
                }
            }
        });
        dom.rebuild_in_place();
        let html = render(&dom);

        assert!(html.contains("IMG_20240309_120507.jpg"));
        assert!(html.contains("Done"));
        assert!(html.contains("Cancel"));
    }
}
