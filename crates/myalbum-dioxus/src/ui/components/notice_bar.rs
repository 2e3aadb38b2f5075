use dioxus::prelude::*;
use myalbum_engine::Notice;

#[component]
pub fn NoticeBar(notice: Notice, on_dismiss: EventHandler<()>) -> Element {
    let class = if notice.is_error() {
        "notice-bar error"
    } else {
        "notice-bar"
    };

    rsx! {
        div {
            class: "{class}",
            role: "status",
            onclick: move |_| on_dismiss.call(()),
            "{notice.text}"
        }
    }
}
