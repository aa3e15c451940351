//! Streaming chat session
//!
//! One `ChatSession` backs one open chat view: it resolves the thread id,
//! loads the (thread, character) history once, and runs at most one
//! streaming send at a time.
//!
//! Drivers that can hold `&mut ChatSession` across awaits use [`ChatSession::send`].
//! UI drivers that keep the session in reactive state use the step API
//! (`begin_send`, `apply_reply`, `finish_send`) together with [`stream_reply`].

use crate::api::ChatBackend;
use crate::error::{ChatError, ChatResult};
use crate::storage::KeyValueStore;
use crate::stream::ReplyAccumulator;
use crate::thread::get_or_create_thread_id;
use crate::transcript::Transcript;
use crate::types::{CharacterId, ChatMessage, StreamRequest, ThreadId};
use futures::StreamExt;
use std::sync::Arc;

/// What a call to [`ChatSession::send`] did.
#[derive(Debug)]
pub enum SendOutcome {
    /// Blank input, a send already in flight, or no thread id yet.
    Rejected,
    Completed,
    /// The placeholder keeps whatever text arrived before the failure.
    Failed(ChatError),
}

impl SendOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, SendOutcome::Rejected)
    }
}

/// A send that has been committed to the transcript and awaits its reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSend {
    pub query: String,
    pub character_id: CharacterId,
    pub thread_id: ThreadId,
}

impl PendingSend {
    pub fn request(&self) -> StreamRequest<'_> {
        StreamRequest {
            query: &self.query,
            character_id: self.character_id,
            thread_id: self.thread_id.as_str(),
        }
    }
}

pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    thread_id: Option<ThreadId>,
    character_id: CharacterId,
    transcript: Transcript,
    loading: bool,
    sending: bool,
    draft: String,
    last_error: Option<String>,
}

impl ChatSession {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        thread_id: Option<ThreadId>,
        character_id: CharacterId,
    ) -> Self {
        Self {
            backend,
            thread_id,
            character_id,
            transcript: Transcript::new(),
            loading: true,
            sending: false,
            draft: String::new(),
            last_error: None,
        }
    }

    /// Create a session, resolving the thread id from `store`.
    pub fn open(
        backend: Arc<dyn ChatBackend>,
        store: &dyn KeyValueStore,
        character_id: CharacterId,
    ) -> Self {
        let thread_id = get_or_create_thread_id(store);
        Self::new(backend, thread_id, character_id)
    }

    pub fn backend(&self) -> Arc<dyn ChatBackend> {
        Arc::clone(&self.backend)
    }

    pub fn thread_id(&self) -> Option<&ThreadId> {
        self.thread_id.as_ref()
    }

    pub fn set_thread_id(&mut self, thread_id: ThreadId) {
        self.thread_id = Some(thread_id);
    }

    pub fn character_id(&self) -> CharacterId {
        self.character_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.transcript.messages()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Last history or send failure, for display.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ============================================
    // History
    // ============================================

    pub async fn load_history(&mut self) -> ChatResult<()> {
        let target = self.history_target()?;
        let fetched = target.fetch_history(self.backend.as_ref()).await;
        self.finish_history(fetched)
    }

    /// The chat whose history should be fetched, or `NotReady` while the
    /// thread id is unresolved.
    pub fn history_target(&self) -> ChatResult<ChatTarget> {
        self.target()
    }

    /// Apply a fetched history, or record why it could not be fetched.
    pub fn finish_history(&mut self, fetched: ChatResult<Vec<ChatMessage>>) -> ChatResult<()> {
        match fetched {
            Ok(messages) => {
                self.apply_history(messages);
                Ok(())
            }
            Err(err) => {
                self.record_history_failure(&err);
                Err(err)
            }
        }
    }

    pub fn apply_history(&mut self, messages: Vec<ChatMessage>) {
        tracing::debug!(
            "loaded {} messages for character {}",
            messages.len(),
            self.character_id
        );
        self.transcript = Transcript::from_messages(messages);
        self.loading = false;
        self.last_error = None;
    }

    pub fn record_history_failure(&mut self, err: &ChatError) {
        tracing::error!("history unavailable: {err}");
        self.last_error = Some(err.to_string());
    }

    // ============================================
    // Sending
    // ============================================

    /// Commit `text` to the transcript and enter the sending state.
    ///
    /// Appends the human message and an empty agent placeholder, clears the
    /// draft, and returns what to send. Returns `None` without touching
    /// anything when the input is blank, a send is already running, or the
    /// thread id is not resolved yet.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        let query = text.trim();
        if query.is_empty() || self.sending {
            return None;
        }
        let Some(thread_id) = self.thread_id.clone() else {
            tracing::warn!("send ignored: thread id not resolved");
            return None;
        };

        if let Err(err) = self.transcript.push(ChatMessage::human(query)) {
            tracing::error!("cannot append message: {err}");
            return None;
        }
        self.draft.clear();
        if let Err(err) = self.transcript.append_placeholder() {
            tracing::error!("cannot append placeholder: {err}");
            return None;
        }
        self.sending = true;
        self.last_error = None;

        Some(PendingSend {
            query: query.to_string(),
            character_id: self.character_id,
            thread_id,
        })
    }

    /// Show `text`, the reply accumulated so far, in the placeholder.
    pub fn apply_reply(&mut self, text: &str) -> ChatResult<()> {
        self.transcript.replace_last_message(text)
    }

    /// Leave the sending state. Safe to call more than once.
    pub fn finish_send(&mut self, error: Option<&ChatError>) {
        self.transcript.seal_placeholder();
        self.sending = false;
        if let Some(err) = error {
            tracing::error!("error streaming message: {err}");
            self.last_error = Some(err.to_string());
        }
    }

    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let Some(pending) = self.begin_send(text) else {
            return SendOutcome::Rejected;
        };

        let backend = self.backend();
        let in_flight = InFlight { session: self };
        let result = stream_reply(backend.as_ref(), &pending, |reply| {
            in_flight.session.apply_reply(reply)
        })
        .await;

        match result {
            Ok(reply) => {
                tracing::debug!("reply complete ({} bytes)", reply.len());
                in_flight.session.finish_send(None);
                SendOutcome::Completed
            }
            Err(err) => {
                in_flight.session.finish_send(Some(&err));
                SendOutcome::Failed(err)
            }
        }
    }

    // ============================================
    // Deletion
    // ============================================

    /// Delete this chat on the backend; only a confirmed success clears the
    /// local transcript.
    pub async fn delete_chat(&mut self) -> ChatResult<()> {
        let target = self.begin_delete()?;
        let deleted = target.delete(self.backend.as_ref()).await;
        self.finish_delete(deleted)
    }

    /// The chat to delete. Refused while a reply is streaming or before the
    /// thread id is resolved.
    pub fn begin_delete(&self) -> ChatResult<ChatTarget> {
        if self.sending {
            return Err(ChatError::InvalidState(
                "cannot delete while a reply is streaming",
            ));
        }
        self.target()
    }

    pub fn finish_delete(&mut self, deleted: ChatResult<()>) -> ChatResult<()> {
        match deleted {
            Ok(()) => {
                self.apply_deleted();
                Ok(())
            }
            Err(err) => {
                tracing::error!("failed to delete chat: {err}");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn apply_deleted(&mut self) {
        tracing::info!("deleted chat with character {}", self.character_id);
        self.transcript.clear();
        self.last_error = None;
    }

    fn target(&self) -> ChatResult<ChatTarget> {
        let thread_id = self
            .thread_id
            .clone()
            .ok_or(ChatError::NotReady("thread id not resolved"))?;
        Ok(ChatTarget {
            thread_id,
            character_id: self.character_id,
        })
    }
}

/// The (thread, character) pair a history fetch or delete applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatTarget {
    pub thread_id: ThreadId,
    pub character_id: CharacterId,
}

impl ChatTarget {
    pub async fn fetch_history(&self, backend: &dyn ChatBackend) -> ChatResult<Vec<ChatMessage>> {
        backend.chat_history(&self.thread_id, self.character_id).await
    }

    pub async fn delete(&self, backend: &dyn ChatBackend) -> ChatResult<()> {
        backend.delete_chat(&self.thread_id, self.character_id).await
    }
}

/// Clears the sending state if a send future is dropped before it finishes.
struct InFlight<'a> {
    session: &'a mut ChatSession,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.session.sending {
            tracing::debug!("send abandoned before the stream ended");
            self.session.finish_send(None);
        }
    }
}

/// Open the reply stream for `pending` and feed the accumulated text to
/// `on_text` after every chunk. Returns the full reply on stream end.
pub async fn stream_reply<F>(
    backend: &dyn ChatBackend,
    pending: &PendingSend,
    mut on_text: F,
) -> ChatResult<String>
where
    F: FnMut(&str) -> ChatResult<()>,
{
    let mut stream = backend.open_stream(pending.request()).await?;
    let mut reply = ReplyAccumulator::new();

    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        on_text(reply.push(&bytes))?;
    }

    let before = reply.text().len();
    if reply.finish().len() != before {
        on_text(reply.text())?;
    }
    Ok(reply.into_text())
}
