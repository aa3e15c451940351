use crate::directory::{SUMMARY_PREVIEW_CHARS, truncate_summary};
use crate::types::Character;
use crate::ui::{DirectoryResource, Page};
use dioxus::prelude::*;

#[component]
pub fn CharacterPicker(page: Signal<Page>) -> Element {
    let directory = use_context::<DirectoryResource>();

    let listing = match &*directory.read() {
        None => None,
        Some(Ok(loaded)) => Some(Ok(loaded.characters().unwrap_or_default().to_vec())),
        Some(Err(err)) => Some(Err(err.to_string())),
    };

    match listing {
        None => rsx! {
            div { class: "notice", "Loading characters…" }
        },
        Some(Err(err)) => rsx! {
            div { class: "notice error", "Could not load characters: {err}" }
        },
        Some(Ok(characters)) => rsx! {
            h2 { "Select a character" }
            div { class: "picker",
                for character in characters {
                    CharacterCard { key: "{character.id}", character, page }
                }
            }
        },
    }
}

#[component]
fn CharacterCard(character: Character, page: Signal<Page>) -> Element {
    let mut page = page;
    let id = character.id;
    let name = character.display_name().to_string();
    let summary = truncate_summary(
        character.summary.as_deref().unwrap_or_default(),
        SUMMARY_PREVIEW_CHARS,
    );

    rsx! {
        div { class: "picker-card", onclick: move |_| page.set(Page::Chat(id)),
            if let Some(url) = character.image_url.clone() {
                img { class: "avatar", src: "{url}", alt: "{name}" }
            }
            div {
                strong { "{name}" }
                p { "{summary}" }
            }
        }
    }
}
