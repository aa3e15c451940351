use crate::session::{ChatSession, stream_reply};
use crate::thread::get_or_create_thread_id;
use crate::types::{Character, CharacterId, Sender, ThreadId};
use crate::ui::{AppContext, Page};
use crate::views::ChatSidebar;
use dioxus::events::Key;
use dioxus::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

fn sender_class(sender: Sender) -> &'static str {
    match sender {
        Sender::Human => "human",
        Sender::Agent => "agent",
    }
}

#[component]
pub fn ChatPage(character_id: CharacterId, page: Signal<Page>) -> Element {
    let context = use_context::<AppContext>();
    let store = context.store.clone();
    let thread_id = use_hook(move || get_or_create_thread_id(store.as_ref()));
    let character = use_resource(move || {
        let backend = context.backend.clone();
        async move { backend.get_character(character_id).await }
    });

    let character = match &*character.read() {
        None => None,
        Some(Ok(found)) => Some(Ok(found.clone())),
        Some(Err(err)) => Some(Err(err.to_string())),
    };

    match (character, thread_id) {
        (None, _) => rsx! {
            div { class: "notice", "Loading…" }
        },
        (Some(Err(err)), _) => rsx! {
            div { class: "notice error", "Could not load character: {err}" }
        },
        (Some(Ok(_)), None) => rsx! {
            div { class: "notice error", "Local storage is unavailable, so this chat cannot be opened." }
        },
        (Some(Ok(character)), Some(thread_id)) => rsx! {
            div { class: "chat-layout",
                ChatSidebar { thread_id: thread_id.clone(), character_id, page }
                ChatView { thread_id, character }
            }
        },
    }
}

/// Start streaming a reply for `text`. Does nothing when the session
/// rejects the input.
fn start_send(mut session: Signal<ChatSession>, in_flight: Rc<Cell<Option<Task>>>, text: String) {
    let Some(pending) = session.with_mut(|s| s.begin_send(&text)) else {
        return;
    };
    let backend = session.peek().backend();
    let slot = in_flight.clone();
    let task = spawn(async move {
        let result = stream_reply(backend.as_ref(), &pending, |reply| {
            session.with_mut(|s| s.apply_reply(reply))
        })
        .await;
        session.with_mut(|s| s.finish_send(result.as_ref().err()));
        slot.set(None);
    });
    in_flight.set(Some(task));
}

#[component]
pub fn ChatView(thread_id: ThreadId, character: Character) -> Element {
    let context = use_context::<AppContext>();
    let character_id = character.id;
    let mut session =
        use_signal(move || ChatSession::new(context.backend.clone(), Some(thread_id), character_id));
    let in_flight = use_hook(|| Rc::new(Cell::new(None::<Task>)));

    // history is fetched once per mount
    use_hook(move || {
        spawn(async move {
            let (backend, target) = {
                let s = session.peek();
                (s.backend(), s.history_target())
            };
            let Ok(target) = target else {
                return;
            };
            let fetched = target.fetch_history(backend.as_ref()).await;
            let _ = session.with_mut(|s| s.finish_history(fetched));
        })
    });

    use_drop({
        let in_flight = in_flight.clone();
        move || {
            if let Some(task) = in_flight.take() {
                tracing::debug!("chat view closed with a reply in flight; aborting");
                task.cancel();
            }
        }
    });

    let on_send = {
        let in_flight = in_flight.clone();
        move |_: MouseEvent| {
            let text = session.peek().draft().to_string();
            start_send(session, in_flight.clone(), text);
        }
    };

    let on_keydown = {
        let in_flight = in_flight.clone();
        move |ev: KeyboardEvent| {
            if ev.key() == Key::Enter && !ev.modifiers().shift() {
                ev.prevent_default();
                let text = session.peek().draft().to_string();
                start_send(session, in_flight.clone(), text);
            }
        }
    };

    let on_delete = move |_: MouseEvent| {
        let (backend, target) = {
            let s = session.peek();
            (s.backend(), s.begin_delete())
        };
        let target = match target {
            Ok(target) => target,
            Err(err) => {
                tracing::warn!("delete ignored: {err}");
                return;
            }
        };
        spawn(async move {
            let deleted = target.delete(backend.as_ref()).await;
            let _ = session.with_mut(|s| s.finish_delete(deleted));
        });
    };

    let (messages, loading, sending, draft, error) = {
        let s = session.read();
        (
            s.messages().to_vec(),
            s.is_loading(),
            s.is_sending(),
            s.draft().to_string(),
            s.last_error().map(str::to_string),
        )
    };
    let name = character.display_name().to_string();
    let can_send = !sending && !loading && !draft.trim().is_empty();

    rsx! {
        div { class: "chat-card",
            div { class: "chat-header",
                if let Some(url) = character.image_url.clone() {
                    img { class: "avatar", src: "{url}", alt: "{name}" }
                }
                div {
                    div { strong { "{name}" } }
                    div { class: "status",
                        if sending {
                            span { class: "writing", "Writing" }
                        }
                    }
                }
                div { class: "spacer" }
                button {
                    class: "btn btn-danger",
                    r#type: "button",
                    disabled: sending || messages.is_empty(),
                    onclick: on_delete,
                    "Delete chat"
                }
            }
            if loading {
                if let Some(err) = error.clone() {
                    div { class: "notice error", "History unavailable: {err}" }
                } else {
                    div { class: "notice", "Loading…" }
                }
            } else {
                div { class: "chat-list",
                    for (i, msg) in messages.iter().enumerate() {
                        div { key: "{i}", class: format_args!("bubble {}", sender_class(msg.sender)), "{msg.text}" }
                    }
                }
                if let Some(err) = error.clone() {
                    div { class: "notice error", "{err}" }
                }
            }
            div { class: "composer",
                input {
                    placeholder: "Type your message...",
                    value: "{draft}",
                    disabled: loading,
                    oninput: move |ev| session.with_mut(|s| s.set_draft(ev.value())),
                    onkeydown: on_keydown,
                }
                button {
                    class: "btn",
                    r#type: "button",
                    disabled: !can_send,
                    onclick: on_send,
                    "Send"
                }
            }
        }
    }
}
