//! Scripted in-memory backend shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use futures::{StreamExt, stream};
use narutoverse::api::{ByteStream, ChatBackend};
use narutoverse::directory::CharacterQuery;
use narutoverse::error::{ChatError, ChatResult};
use narutoverse::types::{Character, CharacterId, ChatMessage, StreamRequest, ThreadId};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub enum Step {
    Chunk(Vec<u8>),
    Fail(&'static str),
}

pub fn text(chunk: &str) -> Step {
    Step::Chunk(chunk.as_bytes().to_vec())
}

#[derive(Default)]
pub struct ScriptedBackend {
    pub characters: Vec<Character>,
    pub history: Vec<ChatMessage>,
    pub history_status: Option<u16>,
    pub chat_ids: Vec<CharacterId>,
    pub reply: Vec<Step>,
    pub open_status: Option<u16>,
    /// Keep the reply stream open after the scripted steps.
    pub hold_open: bool,
    pub delete_status: Option<u16>,

    pub list_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub requests: Mutex<Vec<serde_json::Value>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_reply(mut self, reply: Vec<Step>) -> Self {
        self.reply = reply;
        self
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub fn character(id: CharacterId, name: &str) -> Character {
    Character {
        id,
        name: Some(name.to_string()),
        href: None,
        image_url: Some(format!("https://img.example.test/{id}.png")),
        summary: Some(format!("{name} of the Hidden Leaf")),
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn list_characters(&self, query: &CharacterQuery) -> ChatResult<Vec<Character>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.characters.iter().take(query.limit).cloned().collect())
    }

    async fn get_character(&self, id: CharacterId) -> ChatResult<Character> {
        self.characters
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ChatError::bad_response(404, "not found"))
    }

    async fn chat_history(
        &self,
        _thread_id: &ThreadId,
        _character_id: CharacterId,
    ) -> ChatResult<Vec<ChatMessage>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        match self.history_status {
            Some(status) => Err(ChatError::bad_response(status, "history failed")),
            None => Ok(self.history.clone()),
        }
    }

    async fn chat_ids(&self, _thread_id: &ThreadId) -> ChatResult<Vec<CharacterId>> {
        Ok(self.chat_ids.clone())
    }

    async fn open_stream(&self, request: StreamRequest<'_>) -> ChatResult<ByteStream> {
        self.requests
            .lock()
            .unwrap()
            .push(serde_json::to_value(&request).unwrap());
        if let Some(status) = self.open_status {
            return Err(ChatError::bad_response(status, "stream refused"));
        }

        let items: Vec<ChatResult<Vec<u8>>> = self
            .reply
            .iter()
            .map(|step| match step {
                Step::Chunk(bytes) => Ok(bytes.clone()),
                Step::Fail(message) => Err(ChatError::Transport(message.to_string())),
            })
            .collect();
        let scripted = stream::iter(items);
        if self.hold_open {
            Ok(scripted.chain(stream::pending()).boxed())
        } else {
            Ok(scripted.boxed())
        }
    }

    async fn delete_chat(
        &self,
        _thread_id: &ThreadId,
        _character_id: CharacterId,
    ) -> ChatResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        match self.delete_status {
            Some(status) => Err(ChatError::bad_response(status, "delete failed")),
            None => Ok(()),
        }
    }
}
