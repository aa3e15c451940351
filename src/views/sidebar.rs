use crate::directory::sidebar_characters;
use crate::types::{Character, CharacterId, ThreadId};
use crate::ui::{AppContext, DirectoryResource, Page};
use dioxus::prelude::*;

#[component]
pub fn ChatSidebar(thread_id: ThreadId, character_id: CharacterId, page: Signal<Page>) -> Element {
    let context = use_context::<AppContext>();
    let directory = use_context::<DirectoryResource>();
    let chat_ids = use_resource(move || {
        let backend = context.backend.clone();
        let thread_id = thread_id.clone();
        async move { backend.chat_ids(&thread_id).await }
    });

    let ids = match &*chat_ids.read() {
        None => {
            return rsx! {
                div { class: "sidebar", div { class: "notice", "Loading chats…" } }
            };
        }
        Some(Ok(ids)) => ids.clone(),
        Some(Err(err)) => {
            tracing::warn!("chat list unavailable: {err}");
            Vec::new()
        }
    };

    let entries: Vec<(Character, bool)> = match &*directory.read() {
        Some(Ok(loaded)) => {
            sidebar_characters(loaded.characters().unwrap_or_default(), &ids, character_id)
                .into_iter()
                .map(|c| {
                    let active = c.id == character_id;
                    (c, active)
                })
                .collect()
        }
        _ => Vec::new(),
    };

    rsx! {
        div { class: "sidebar",
            div { class: "sidebar-title", "Chats" }
            for (character, active) in entries {
                SidebarItem { key: "{character.id}", character, active, page }
            }
        }
    }
}

#[component]
fn SidebarItem(character: Character, active: bool, page: Signal<Page>) -> Element {
    let mut page = page;
    let id = character.id;
    let name = character.display_name().to_string();
    let class = if active { "sidebar-item active" } else { "sidebar-item" };

    rsx! {
        div {
            class: class,
            onclick: move |_| {
                if !active {
                    page.set(Page::Chat(id));
                }
            },
            if let Some(url) = character.image_url.clone() {
                img { class: "avatar avatar-sm", src: "{url}", alt: "{name}" }
            }
            span { "{name}" }
        }
    }
}
