use crate::api::{ChatBackend, HttpBackend};
use crate::config::ClientConfig;
use crate::directory::CharacterDirectory;
use crate::error::ChatResult;
use crate::storage::KeyValueStore;
use crate::theme::{ThemeMode, theme_css};
use crate::types::CharacterId;
use crate::views::{CharacterPicker, ChatPage};
use dioxus::prelude::*;
use std::sync::Arc;

const APP_CSS: &str = include_str!("../assets/narutoverse.css");

/// Backend, storage and configuration shared by every view.
#[derive(Clone)]
pub struct AppContext {
    pub backend: Arc<dyn ChatBackend>,
    pub store: Arc<dyn KeyValueStore>,
    pub config: ClientConfig,
}

impl AppContext {
    pub fn new(config: ClientConfig) -> Self {
        tracing::info!("using backend {}", config.backend_url);
        Self {
            backend: Arc::new(HttpBackend::from_config(&config)),
            store: Arc::new(config.store()),
            config,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Home,
    Chat(CharacterId),
}

/// The character list, fetched once per app launch.
pub type DirectoryResource = Resource<ChatResult<CharacterDirectory>>;

#[component]
pub fn App() -> Element {
    let context = use_context::<AppContext>();
    let page = use_signal(|| Page::Home);
    let theme = use_signal(ThemeMode::default);

    let directory: DirectoryResource = use_resource(move || {
        let backend = context.backend.clone();
        let query = context.config.character_query();
        async move {
            let mut directory = CharacterDirectory::new(query);
            let count = directory.load(backend.as_ref()).await.map(|c| c.len())?;
            tracing::info!("character directory ready ({count} entries)");
            Ok(directory)
        }
    });
    use_context_provider(|| directory);

    rsx! {
        ThemeStyles { theme }
        AppHeader { page, theme }
        div { class: "main-container",
            {match page() {
                Page::Home => rsx! { CharacterPicker { page } },
                Page::Chat(id) => rsx! { ChatPage { key: "{id}", character_id: id, page } },
            }}
        }
    }
}

#[component]
fn ThemeStyles(theme: Signal<ThemeMode>) -> Element {
    let palette = theme_css(theme());
    rsx! {
        style { dangerous_inner_html: "{palette}" }
        style { dangerous_inner_html: "{APP_CSS}" }
    }
}

#[component]
fn AppHeader(page: Signal<Page>, theme: Signal<ThemeMode>) -> Element {
    let mut page = page;
    let mut theme = theme;
    let label = theme().toggled().label();
    rsx! {
        div { class: "header",
            span { class: "header-title", onclick: move |_| page.set(Page::Home), "NarutoVerse Chatbot" }
            button {
                class: "btn",
                r#type: "button",
                onclick: move |_| {
                    let next = theme().toggled();
                    theme.set(next);
                },
                "{label}"
            }
        }
    }
}
