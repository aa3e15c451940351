use crate::api::ChatBackend;
use crate::error::ChatResult;
use crate::types::{Character, CharacterId};

pub const DEFAULT_CHARACTER_LIMIT: usize = 100;
pub const SUMMARY_PREVIEW_CHARS: usize = 150;

/// Projection and ordering for `GET /characters`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterQuery {
    pub columns: Vec<String>,
    pub order_by: String,
    pub ascending: bool,
    pub limit: usize,
}

impl Default for CharacterQuery {
    fn default() -> Self {
        Self {
            columns: ["id", "summary", "image_url", "name"]
                .into_iter()
                .map(String::from)
                .collect(),
            order_by: "data_length".to_string(),
            ascending: false,
            limit: DEFAULT_CHARACTER_LIMIT,
        }
    }
}

impl CharacterQuery {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .columns
            .iter()
            .map(|column| ("columns", column.clone()))
            .collect();
        pairs.push(("order_by", self.order_by.clone()));
        pairs.push(("asc", self.ascending.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

/// Character list owned by the page, fetched at most once.
#[derive(Debug, Default)]
pub struct CharacterDirectory {
    query: CharacterQuery,
    characters: Option<Vec<Character>>,
}

impl CharacterDirectory {
    pub fn new(query: CharacterQuery) -> Self {
        Self {
            query,
            characters: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.characters.is_some()
    }

    pub fn characters(&self) -> Option<&[Character]> {
        self.characters.as_deref()
    }

    pub fn find(&self, id: CharacterId) -> Option<&Character> {
        self.characters()?.iter().find(|c| c.id == id)
    }

    pub async fn load(&mut self, backend: &dyn ChatBackend) -> ChatResult<&[Character]> {
        if self.characters.is_none() {
            let fetched = backend.list_characters(&self.query).await.map_err(|err| {
                tracing::error!("failed to fetch characters: {err}");
                err
            })?;
            tracing::debug!("fetched {} characters", fetched.len());
            self.characters = Some(fetched);
        }
        Ok(self.characters.as_deref().unwrap_or_default())
    }
}

/// Characters shown in the chat sidebar: those this thread already talks to,
/// plus the one currently open. Directory order is kept.
pub fn sidebar_characters(
    characters: &[Character],
    chat_ids: &[CharacterId],
    current: CharacterId,
) -> Vec<Character> {
    characters
        .iter()
        .filter(|c| c.id == current || chat_ids.contains(&c.id))
        .cloned()
        .collect()
}

pub fn truncate_summary(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
