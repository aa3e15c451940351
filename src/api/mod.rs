/// Backend module for the NarutoVerse client
///
/// This module defines the seam between the chat session and the character
/// backend. The session only ever talks to a `ChatBackend`; `HttpBackend` is
/// the reqwest implementation used by the app.
///
/// # Usage
///
/// ```rust,no_run
/// use narutoverse::api::{ChatBackend, HttpBackend};
/// use narutoverse::directory::CharacterQuery;
///
/// # async fn example() -> narutoverse::error::ChatResult<()> {
/// let backend = HttpBackend::new("http://localhost:8080");
/// let characters = backend.list_characters(&CharacterQuery::default()).await?;
/// # Ok(())
/// # }
/// ```
mod http;

pub use http::HttpBackend;

use crate::directory::CharacterQuery;
use crate::error::ChatResult;
use crate::types::{Character, CharacterId, ChatMessage, StreamRequest, ThreadId};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Deserialize;

/// Raw response body chunks, in transport order.
pub type ByteStream = BoxStream<'static, ChatResult<Vec<u8>>>;

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn list_characters(&self, query: &CharacterQuery) -> ChatResult<Vec<Character>>;

    async fn get_character(&self, id: CharacterId) -> ChatResult<Character>;

    async fn chat_history(
        &self,
        thread_id: &ThreadId,
        character_id: CharacterId,
    ) -> ChatResult<Vec<ChatMessage>>;

    /// Ids of the characters this thread already has a chat with.
    async fn chat_ids(&self, thread_id: &ThreadId) -> ChatResult<Vec<CharacterId>>;

    /// Send a message and hand back the reply body as it arrives.
    async fn open_stream(&self, request: StreamRequest<'_>) -> ChatResult<ByteStream>;

    async fn delete_chat(&self, thread_id: &ThreadId, character_id: CharacterId)
    -> ChatResult<()>;
}

/// List endpoints answer either with a bare array or with `{"data": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Wrapped { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Wrapped { data } => data,
            Listing::Bare(items) => items,
        }
    }
}
