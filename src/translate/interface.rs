/// Translation interface - actual translation happens in the external backend

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

pub fn default_source_lang() -> String {
    "id".to_string()
}

pub fn default_target_lang() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}

/// Backend trait - implemented by the LibreTranslate client, and by
/// test doubles where no live service is available
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translate text, returning the backend's JSON response verbatim
    async fn translate(&self, request: &TranslateRequest) -> anyhow::Result<Value>;

    /// List the languages the backend supports
    async fn languages(&self) -> anyhow::Result<Vec<Language>>;

    /// Translate an uploaded document, returning the translated bytes
    async fn translate_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        source_lang: &str,
        target_lang: &str,
    ) -> anyhow::Result<Vec<u8>>;

    /// Probe backend reachability
    async fn health_check(&self) -> anyhow::Result<bool>;
}

/// Served when the backend cannot be reached
pub fn fallback_languages() -> Vec<Language> {
    [
        ("id", "Indonesia"),
        ("en", "English"),
        ("es", "Spanish"),
        ("fr", "French"),
        ("de", "German"),
        ("ja", "Japanese"),
        ("ko", "Korean"),
        ("zh", "Chinese"),
        ("ar", "Arabic"),
        ("ru", "Russian"),
    ]
    .iter()
    .map(|(code, name)| Language {
        code: code.to_string(),
        name: name.to_string(),
    })
    .collect()
}

/// Pull the translated text out of a backend response.
///
/// LibreTranslate-compatible services answer in several shapes:
/// an object with `translatedText`, an array of such objects, or a
/// bare string. An empty `translatedText` next to an `error` field is
/// a failure report.
pub fn extract_translated_text(value: &Value) -> anyhow::Result<String> {
    match value.get("translatedText").and_then(|v| v.as_str()) {
        Some(text) if !text.is_empty() => return Ok(text.to_string()),
        Some(_) => {
            if let Some(err) = value.get("error").and_then(|v| v.as_str()) {
                return Err(anyhow::anyhow!("{}", err));
            }
            return Ok(String::new());
        }
        None => {}
    }

    if let Some(first) = value.as_array().and_then(|a| a.first()) {
        if let Some(text) = first.get("translatedText").and_then(|v| v.as_str()) {
            return Ok(text.to_string());
        }
    }

    if let Some(text) = value.as_str() {
        return Ok(text.to_string());
    }

    if let Some(err) = value.get("error").and_then(|v| v.as_str()) {
        return Err(anyhow::anyhow!("{}", err));
    }

    Err(anyhow::anyhow!("Unrecognized response shape: {}", value))
}
