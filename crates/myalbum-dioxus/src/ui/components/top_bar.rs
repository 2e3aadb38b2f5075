use dioxus::prelude::*;
use myalbum_engine::MediaKind;

/// Title of the current folder plus the actions that apply to it
#[component]
pub fn TopBar(
    title: String,
    breadcrumb: String,
    can_go_back: bool,
    on_back: EventHandler<()>,
    on_capture: EventHandler<MediaKind>,
    on_open_externally: EventHandler<()>,
) -> Element {
    rsx! {
        header {
            class: "top-bar",
            if can_go_back {
                button {
                    class: "top-bar-back",
                    title: "Back",
                    onclick: move |_| on_back.call(()),
                    "←"
                }
            }
            div {
                class: "top-bar-title",
                h1 { "{title}" }
                if !breadcrumb.is_empty() {
                    span { class: "breadcrumb", "{breadcrumb}" }
                }
            }
            div {
                class: "top-bar-actions",
                button {
                    onclick: move |_| on_capture.call(MediaKind::Image),
                    "Photo here"
                }
                button {
                    onclick: move |_| on_capture.call(MediaKind::Video),
                    "Video here"
                }
                button {
                    onclick: move |_| on_open_externally.call(()),
                    "Open in…"
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

    fn top_bar(can_go_back: bool) -> Element {
        rsx! {
            TopBar {
                title: "Trips",
                breadcrumb: "2024/Trips",
                can_go_back,
                on_back: |_| {},
                on_capture: |_| {},
                on_open_externally: |_| {},
            }
        }
    }

    fn render_component(root: fn() -> Element) -> String {
        let mut dom = VirtualDom::new(root);
        dom.rebuild_in_place();
        render(&dom)
    }

    #[test]
    fn test_top_bar_shows_title_and_breadcrumb() {
        let html = render_component(|| top_bar(true));

        assert!(html.contains("Trips"));
        assert!(html.contains("2024/Trips"));
        assert!(html.contains("Open in…"));
    }

    #[test]
    fn test_back_button_hidden_at_root() {
        assert!(render_component(|| top_bar(true)).contains("top-bar-back"));
        assert!(!render_component(|| top_bar(false)).contains("top-bar-back"));
    }
}
