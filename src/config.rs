use serde::{Deserialize, Serialize};
use std::fs;
use anyhow::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub backend_config: BackendConfig,
    #[serde(default)]
    pub translate_config: TranslateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    #[serde(default = "default_source_lang")]
    pub default_source_lang: String,
    #[serde(default = "default_target_lang")]
    pub default_target_lang: String,
    #[serde(default = "default_ui_lang")]
    pub ui_lang: String,
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

fn default_frontend_dir() -> String {
    "static".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_source_lang() -> String {
    "id".to_string()
}

fn default_target_lang() -> String {
    "en".to_string()
}

fn default_ui_lang() -> String {
    "id".to_string()
}

fn default_max_text_length() -> usize {
    5000
}

fn default_debounce_ms() -> u64 {
    600
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_max_upload_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Config {
    /// Load configuration from the first readable candidate file, then let
    /// the environment override it. No file at all is fine: defaults plus
    /// `LIBRETRANSLATE_URL`/`LIBRETRANSLATE_API_KEY`/`PORT` cover everything.
    pub fn load() -> Self {
        let env_path = std::env::var("CONFIG_PATH").ok();
        let candidates: Vec<&str> = env_path
            .as_deref()
            .into_iter()
            .chain(["conf.yaml", "conf.json"])
            .collect();

        let mut config = Config::default();
        for path in &candidates {
            match Self::load_file(path) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from: {}", path);
                    config = cfg;
                    break;
                }
                Err(e) => {
                    tracing::debug!("Failed to load config from {}: {}", path, e);
                }
            }
        }

        config.apply_env_overrides();
        config
    }

    pub fn load_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;

        // Determine file type by extension
        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("LIBRETRANSLATE_URL") {
            self.backend_config.base_url = url;
        }
        if let Ok(key) = std::env::var("LIBRETRANSLATE_API_KEY") {
            if !key.is_empty() {
                self.backend_config.api_key = Some(key);
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => self.system_config.port = port,
                Err(_) => tracing::warn!("Ignoring non-numeric PORT value: {}", port),
            }
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            frontend_dir: default_frontend_dir(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            default_source_lang: default_source_lang(),
            default_target_lang: default_target_lang(),
            ui_lang: default_ui_lang(),
            max_text_length: default_max_text_length(),
            debounce_ms: default_debounce_ms(),
            cache_capacity: default_cache_capacity(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}
