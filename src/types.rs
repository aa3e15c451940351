use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Who authored a transcript entry.
///
/// The backend has used both `"user"`/`"bot"` and `"human"`/`"ai"` over time;
/// both spellings are accepted and the latter is written back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "human", alias = "user")]
    Human,
    #[serde(rename = "ai", alias = "bot")]
    Agent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Human,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Agent,
            text: text.into(),
        }
    }
}

/// Per-profile conversation lineage identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type CharacterId = u64;

/// A conversational persona as served by `/characters`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    #[serde(deserialize_with = "numeric_id")]
    pub id: CharacterId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub href: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Character {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

fn numeric_id<'de, D>(deserializer: D) -> Result<CharacterId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(CharacterId),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid character id {text:?}"))),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

/// Body of `POST /chats/stream`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StreamRequest<'a> {
    pub query: &'a str,
    pub character_id: CharacterId,
    pub thread_id: &'a str,
}
