use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::session;
use crate::state::AppState;
use crate::translate::interface::fallback_languages;

/// Dispatch one client event to the session controller
pub async fn handle_message(
    state: &AppState,
    client_uid: &str,
    text: &str,
    sender: &UnboundedSender<String>,
) -> anyhow::Result<()> {
    let msg: Value = serde_json::from_str(text)?;
    let msg_type = msg.get("type").and_then(|v| v.as_str());

    match msg_type {
        Some("input-change") => {
            let text = msg.get("text").and_then(|v| v.as_str()).unwrap_or("");
            session::on_input_change(state, client_uid, text, sender);
        }
        Some("set-source-lang") => {
            if let Some(lang) = msg.get("lang").and_then(|v| v.as_str()) {
                session::set_source_lang(state, client_uid, lang, sender);
            }
        }
        Some("set-target-lang") => {
            if let Some(lang) = msg.get("lang").and_then(|v| v.as_str()) {
                session::set_target_lang(state, client_uid, lang, sender);
            }
        }
        Some("swap-languages") => {
            session::swap_languages(state, client_uid, sender);
        }
        Some("set-ui-lang") => {
            if let Some(lang) = msg.get("lang").and_then(|v| v.as_str()) {
                session::set_ui_lang(state, client_uid, lang);
            }
        }
        Some("fetch-languages") => {
            send_languages(state, sender).await;
        }
        _ => {
            warn!("Unknown message type: {:?}", msg_type);
        }
    }

    Ok(())
}

/// Push the language list, degrading silently to the fallback set
pub async fn send_languages(state: &AppState, sender: &UnboundedSender<String>) {
    let languages = match state.backend.languages().await {
        Ok(languages) => languages,
        Err(e) => {
            warn!("Languages unavailable, serving fallback list: {}", e);
            fallback_languages()
        }
    };

    let _ = sender.send(json!({ "type": "languages", "languages": languages }).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::translate::testing::StubBackend;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    const CLIENT: &str = "client-1";

    fn test_state(backend: Arc<StubBackend>) -> AppState {
        let state = AppState::with_backend(Config::default(), backend);
        session::create_session(&state, CLIENT);
        state
    }

    #[tokio::test]
    async fn fetch_languages_degrades_to_fallback() {
        let state = test_state(Arc::new(StubBackend::unreachable()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_message(&state, CLIENT, r#"{"type":"fetch-languages"}"#, &tx)
            .await
            .unwrap();

        let msg: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(msg["type"], "languages");
        assert_eq!(msg["languages"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn unknown_types_are_ignored() {
        let state = test_state(Arc::new(StubBackend::replying("Hello")));
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_message(&state, CLIENT, r#"{"type":"speak"}"#, &tx)
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn malformed_json_is_an_error() {
        let state = test_state(Arc::new(StubBackend::replying("Hello")));
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(handle_message(&state, CLIENT, "not json", &tx).await.is_err());
    }

    #[tokio::test]
    async fn set_source_lang_updates_the_session() {
        let state = test_state(Arc::new(StubBackend::replying("Hello")));
        let (tx, _rx) = mpsc::unbounded_channel();

        handle_message(&state, CLIENT, r#"{"type":"set-source-lang","lang":"ja"}"#, &tx)
            .await
            .unwrap();

        assert_eq!(state.sessions.get(CLIENT).unwrap().from_lang, "ja");
    }
}
