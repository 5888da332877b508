use serde::{Deserialize, Serialize};

/// Represents a string with translations in the frontend's UI languages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiLingualString {
    pub en: String,
    pub id: String,
}

impl MultiLingualString {
    pub fn get(&self, lang_code: &str) -> &str {
        match lang_code {
            "id" => &self.id,
            _ => &self.en,
        }
    }
}

/// Message shown while a translation is pending or in flight
pub fn translating(lang_code: &str) -> String {
    MultiLingualString {
        en: "Translating...".to_string(),
        id: "Menerjemahkan...".to_string(),
    }
    .get(lang_code)
    .to_string()
}

/// Message written to the output when a translation attempt fails
pub fn translate_failed(lang_code: &str) -> String {
    MultiLingualString {
        en: "Translation failed. Check the server connection.".to_string(),
        id: "Gagal menerjemahkan. Periksa koneksi server.".to_string(),
    }
    .get(lang_code)
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english_for_unknown_codes() {
        assert_eq!(translate_failed("id"), "Gagal menerjemahkan. Periksa koneksi server.");
        assert!(translate_failed("fr").starts_with("Translation failed"));
        assert!(translating("en").starts_with("Translating"));
    }
}
