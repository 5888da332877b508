use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use super::interface::{TranslateRequest, TranslationBackend};

type CacheKey = (String, String, String);

/// Translation client that fronts the backend with a bounded response cache.
/// Identical `(text, source, target)` requests are answered without a
/// second backend call.
pub struct TranslateClient {
    backend: Arc<dyn TranslationBackend>,
    cache: DashMap<CacheKey, Value>,
    cache_capacity: usize,
}

impl TranslateClient {
    pub fn new(backend: Arc<dyn TranslationBackend>, cache_capacity: usize) -> Self {
        Self {
            backend,
            cache: DashMap::new(),
            cache_capacity,
        }
    }

    pub async fn translate(&self, request: &TranslateRequest) -> anyhow::Result<Value> {
        let key = (
            request.text.clone(),
            request.source_lang.clone(),
            request.target_lang.clone(),
        );

        if let Some(hit) = self.cache.get(&key) {
            debug!("Translation cache hit for {} -> {}", request.source_lang, request.target_lang);
            return Ok(hit.value().clone());
        }

        let response = self.backend.translate(request).await?;

        // Bounded cache: flush everything once full rather than tracking recency
        if self.cache.len() >= self.cache_capacity {
            debug!("Translation cache full ({} entries), flushing", self.cache.len());
            self.cache.clear();
        }
        self.cache.insert(key, response.clone());

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::testing::StubBackend;
    use serde_json::json;

    fn request(text: &str) -> TranslateRequest {
        TranslateRequest {
            text: text.to_string(),
            source_lang: "id".to_string(),
            target_lang: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn repeated_requests_hit_the_cache() {
        let backend = Arc::new(StubBackend::replying("Hello"));
        let client = TranslateClient::new(backend.clone(), 16);

        let first = client.translate(&request("halo")).await.unwrap();
        let second = client.translate(&request("halo")).await.unwrap();

        assert_eq!(first, json!({ "translatedText": "Hello" }));
        assert_eq!(first, second);
        assert_eq!(backend.translate_count(), 1);
    }

    #[tokio::test]
    async fn distinct_requests_each_reach_the_backend() {
        let backend = Arc::new(StubBackend::replying("Hello"));
        let client = TranslateClient::new(backend.clone(), 16);

        client.translate(&request("halo")).await.unwrap();
        client.translate(&request("selamat pagi")).await.unwrap();

        assert_eq!(backend.translate_count(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let backend = Arc::new(StubBackend::replying("Hello"));
        backend.push_reply(0, Err("backend returned 500".to_string()));
        let client = TranslateClient::new(backend.clone(), 16);

        assert!(client.translate(&request("halo")).await.is_err());
        assert!(client.translate(&request("halo")).await.is_ok());
        assert_eq!(backend.translate_count(), 2);
    }

    #[tokio::test]
    async fn cache_is_flushed_at_capacity() {
        let backend = Arc::new(StubBackend::replying("Hello"));
        let client = TranslateClient::new(backend.clone(), 2);

        client.translate(&request("a")).await.unwrap();
        client.translate(&request("b")).await.unwrap();
        // Capacity reached: this insert flushes the earlier entries
        client.translate(&request("c")).await.unwrap();
        client.translate(&request("a")).await.unwrap();

        assert_eq!(backend.translate_count(), 4);
    }
}
