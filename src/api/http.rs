use super::{ByteStream, ChatBackend, Listing};
use crate::config::ClientConfig;
use crate::directory::CharacterQuery;
use crate::error::{ChatError, ChatResult};
use crate::types::{Character, CharacterId, ChatMessage, StreamRequest, ThreadId};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.backend_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Base URL extended with `segments`, each percent-encoded as one path
    /// segment.
    fn segment_url(&self, segments: &[&str]) -> ChatResult<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|err| ChatError::Config(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ChatError::Config(format!("{} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ChatResult<T> {
        let response = request.send().await.map_err(|err| {
            tracing::error!("fetch error: {err}");
            ChatError::from(err)
        })?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!("backend returned {status}: {body}");
            return Err(ChatError::bad_response(status.as_u16(), body));
        }
        serde_json::from_str(&body).map_err(|err| {
            tracing::warn!("invalid JSON from backend: {err}");
            ChatError::from(err)
        })
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn list_characters(&self, query: &CharacterQuery) -> ChatResult<Vec<Character>> {
        let request = self
            .client
            .get(self.url("/characters"))
            .query(&query.to_pairs());
        self.fetch_json(request).await
    }

    async fn get_character(&self, id: CharacterId) -> ChatResult<Character> {
        let url = self.segment_url(&["characters", &id.to_string()])?;
        let request = self.client.get(url);
        self.fetch_json(request).await
    }

    async fn chat_history(
        &self,
        thread_id: &ThreadId,
        character_id: CharacterId,
    ) -> ChatResult<Vec<ChatMessage>> {
        let request = self.client.get(self.url("/chat/history")).query(&[
            ("thread_id", thread_id.to_string()),
            ("character_id", character_id.to_string()),
        ]);
        let listing: Listing<ChatMessage> = self.fetch_json(request).await?;
        Ok(listing.into_vec())
    }

    async fn chat_ids(&self, thread_id: &ThreadId) -> ChatResult<Vec<CharacterId>> {
        let request = self
            .client
            .get(self.url("/chats"))
            .query(&[("thread_id", thread_id.as_str())]);
        let listing: Listing<CharacterId> = self.fetch_json(request).await?;
        Ok(listing.into_vec())
    }

    async fn open_stream(&self, request: StreamRequest<'_>) -> ChatResult<ByteStream> {
        let response = self
            .client
            .post(self.url("/chats/stream"))
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Err(ChatError::MissingBody);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::bad_response(status.as_u16(), body));
        }

        let stream = response
            .bytes_stream()
            .map(|item| item.map(|bytes| bytes.to_vec()).map_err(ChatError::from));
        Ok(stream.boxed())
    }

    async fn delete_chat(
        &self,
        thread_id: &ThreadId,
        character_id: CharacterId,
    ) -> ChatResult<()> {
        let url = self.segment_url(&["chats", thread_id.as_str(), &character_id.to_string()])?;
        let response = self.client.delete(url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ChatError::bad_response(status.as_u16(), body))
        }
    }
}
