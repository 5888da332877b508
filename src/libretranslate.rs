use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::BackendConfig;
use crate::translate::interface::{Language, TranslateRequest, TranslationBackend};

/// HTTP client for a LibreTranslate-compatible translation service
#[derive(Debug, Clone)]
pub struct LibreTranslateClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl LibreTranslateClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn api_key_field(&self) -> String {
        self.api_key.clone().unwrap_or_default()
    }
}

#[async_trait]
impl TranslationBackend for LibreTranslateClient {
    async fn translate(&self, request: &TranslateRequest) -> Result<Value> {
        let url = format!("{}/translate", self.base_url);
        let body = json!({
            "q": request.text,
            "source": request.source_lang,
            "target": request.target_lang,
            "format": "text",
            "alternatives": 3,
            "api_key": self.api_key_field(),
        });

        debug!("Translating {} -> {}", request.source_lang, request.target_lang);
        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Backend returned {}", response.status()));
        }

        Ok(response.json().await?)
    }

    async fn languages(&self) -> Result<Vec<Language>> {
        let url = format!("{}/languages", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.error_for_status()?.json().await?)
    }

    async fn translate_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<u8>> {
        let url = format!("{}/translate_file", self.base_url);
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .text("source", source_lang.to_string())
            .text("target", target_lang.to_string())
            .text("api_key", self.api_key_field())
            .part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;
        let payload: Value = response.error_for_status()?.json().await?;

        // The backend stores the result and answers with a download URL
        let file_url = payload
            .get("translatedFileUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("Backend response missing translatedFileUrl"))?;

        debug!("Fetching translated document from {}", file_url);
        let file_response = self.client.get(file_url).send().await?;
        Ok(file_response.error_for_status()?.bytes().await?.to_vec())
    }

    async fn health_check(&self) -> Result<bool> {
        // Same probe target the frontend settings page uses; any 2xx counts
        let url = format!("{}/frontend/settings", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }
}
