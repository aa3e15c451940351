use crate::directory::{CharacterQuery, DEFAULT_CHARACTER_LIMIT};
use crate::error::{ChatError, ChatResult};
use crate::storage::{FileStore, default_storage_dir};
use std::path::PathBuf;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

pub const BACKEND_URL_VAR: &str = "NARUTOVERSE_BACKEND_URL";
pub const DATA_DIR_VAR: &str = "NARUTOVERSE_DATA_DIR";
pub const CHARACTER_LIMIT_VAR: &str = "NARUTOVERSE_CHARACTER_LIMIT";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub data_dir: PathBuf,
    pub character_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            data_dir: default_storage_dir(),
            character_limit: DEFAULT_CHARACTER_LIMIT,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> ChatResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; unset or blank values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ChatResult<Self> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(url) = read(BACKEND_URL_VAR) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ChatError::Config(format!(
                    "{BACKEND_URL_VAR} must be an http(s) URL, got {url:?}"
                )));
            }
            config.backend_url = url;
        }
        if let Some(dir) = read(DATA_DIR_VAR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(limit) = read(CHARACTER_LIMIT_VAR) {
            config.character_limit = limit.parse().map_err(|_| {
                ChatError::Config(format!("{CHARACTER_LIMIT_VAR} must be a number, got {limit:?}"))
            })?;
        }

        Ok(config)
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(self.data_dir.clone())
    }

    pub fn character_query(&self) -> CharacterQuery {
        CharacterQuery::default().with_limit(self.character_limit)
    }
}

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments.
pub fn parse_env_lines(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}
