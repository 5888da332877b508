use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::config::TranslateConfig;
use crate::i18n;
use crate::state::AppState;
use crate::translate::interface::{extract_translated_text, TranslateRequest};

/// Controller phase. Transitions are driven by task scheduling and the
/// generation counter; the phase itself is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    PendingDebounce,
    InFlight,
}

/// A scheduled-but-not-yet-fired translation dispatch
pub struct PendingDispatch {
    pub generation: u64,
    pub handle: AbortHandle,
}

/// Per-client translation state, owned by the controller. Mutated only by
/// client events and dispatch completions.
pub struct SessionState {
    pub from_lang: String,
    pub to_lang: String,
    pub input: String,
    pub output: String,
    pub ui_lang: String,
    pub phase: Phase,
    pub generation: Arc<AtomicU64>,
}

impl SessionState {
    pub fn new(config: &TranslateConfig) -> Self {
        Self {
            from_lang: config.default_source_lang.clone(),
            to_lang: config.default_target_lang.clone(),
            input: String::new(),
            output: String::new(),
            ui_lang: config.ui_lang.clone(),
            phase: Phase::Idle,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn snapshot(&self) -> Value {
        json!({
            "type": "session-state",
            "from_lang": self.from_lang,
            "to_lang": self.to_lang,
            "input": self.input,
            "output": self.output,
        })
    }
}

pub fn create_session(state: &AppState, client_uid: &str) {
    let session = SessionState::new(&state.config.translate_config);
    state.sessions.insert(client_uid.to_string(), session);
}

pub fn close_session(state: &AppState, client_uid: &str) {
    cancel_pending(state, client_uid);
    state.sessions.remove(client_uid);
}

/// Input-change event: cancel any pending dispatch, clear on blank input,
/// otherwise debounce a new one.
pub fn on_input_change(
    state: &AppState,
    client_uid: &str,
    text: &str,
    sender: &UnboundedSender<String>,
) {
    cancel_pending(state, client_uid);

    if text.trim().is_empty() {
        let Some(mut session) = state.sessions.get_mut(client_uid) else {
            return;
        };
        session.input.clear();
        session.output.clear();
        session.phase = Phase::Idle;
        // Invalidate whatever is still in flight
        session.generation.fetch_add(1, Ordering::SeqCst);
        drop(session);

        let _ = sender.send(json!({ "type": "output-cleared" }).to_string());
        return;
    }

    {
        let Some(mut session) = state.sessions.get_mut(client_uid) else {
            return;
        };
        session.input = text.to_string();
    }

    schedule_dispatch(state, client_uid, sender);
}

/// Language pick: update the pair, then re-dispatch through the debounce path
pub fn set_source_lang(
    state: &AppState,
    client_uid: &str,
    lang: &str,
    sender: &UnboundedSender<String>,
) {
    let has_input = {
        let Some(mut session) = state.sessions.get_mut(client_uid) else {
            return;
        };
        session.from_lang = lang.to_string();
        !session.input.trim().is_empty()
    };

    if has_input {
        schedule_dispatch(state, client_uid, sender);
    }
}

pub fn set_target_lang(
    state: &AppState,
    client_uid: &str,
    lang: &str,
    sender: &UnboundedSender<String>,
) {
    let has_input = {
        let Some(mut session) = state.sessions.get_mut(client_uid) else {
            return;
        };
        session.to_lang = lang.to_string();
        !session.input.trim().is_empty()
    };

    if has_input {
        schedule_dispatch(state, client_uid, sender);
    }
}

pub fn set_ui_lang(state: &AppState, client_uid: &str, lang: &str) {
    if let Some(mut session) = state.sessions.get_mut(client_uid) {
        session.ui_lang = lang.to_string();
    }
}

/// Swap the language pair together with the text areas. Applying it twice
/// restores the original `(from, to, input, output)`.
pub fn swap_languages(state: &AppState, client_uid: &str, sender: &UnboundedSender<String>) {
    let (snapshot, has_input) = {
        let Some(mut session) = state.sessions.get_mut(client_uid) else {
            return;
        };
        let session = &mut *session;
        std::mem::swap(&mut session.from_lang, &mut session.to_lang);
        std::mem::swap(&mut session.input, &mut session.output);
        (session.snapshot(), !session.input.trim().is_empty())
    };

    let _ = sender.send(snapshot.to_string());

    if has_input {
        schedule_dispatch(state, client_uid, sender);
    }
}

fn cancel_pending(state: &AppState, client_uid: &str) {
    if let Some((_, pending)) = state.debounce_tasks.remove(client_uid) {
        pending.handle.abort();
    }
}

/// The debounce path: take a fresh generation, wait out the debounce
/// window, then dispatch. A newer event aborts the wait; once fired, the
/// dispatch can only be outrun, not cancelled.
fn schedule_dispatch(state: &AppState, client_uid: &str, sender: &UnboundedSender<String>) {
    cancel_pending(state, client_uid);

    let (generation, ui_lang) = {
        let Some(mut session) = state.sessions.get_mut(client_uid) else {
            return;
        };
        session.phase = Phase::PendingDebounce;
        let generation = session.generation.fetch_add(1, Ordering::SeqCst) + 1;
        (generation, session.ui_lang.clone())
    };

    let _ = sender.send(
        json!({ "type": "status", "message": i18n::translating(&ui_lang) }).to_string(),
    );

    let delay = Duration::from_millis(state.config.translate_config.debounce_ms);
    let task_state = state.clone();
    let task_sender = sender.clone();
    let uid = client_uid.to_string();

    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        task_state
            .debounce_tasks
            .remove_if(&uid, |_, pending| pending.generation == generation);
        dispatch_translation(&task_state, &uid, generation, &task_sender).await;
    })
    .abort_handle();

    state
        .debounce_tasks
        .insert(client_uid.to_string(), PendingDispatch { generation, handle });
}

async fn dispatch_translation(
    state: &AppState,
    client_uid: &str,
    generation: u64,
    sender: &UnboundedSender<String>,
) {
    let request = {
        let Some(mut session) = state.sessions.get_mut(client_uid) else {
            return;
        };
        session.phase = Phase::InFlight;
        TranslateRequest {
            text: session.input.trim().to_string(),
            source_lang: session.from_lang.clone(),
            target_lang: session.to_lang.clone(),
        }
    };

    let result = match state.translator.translate(&request).await {
        Ok(value) => extract_translated_text(&value),
        Err(e) => Err(e),
    };

    let Some(mut session) = state.sessions.get_mut(client_uid) else {
        return;
    };

    if session.generation.load(Ordering::SeqCst) != generation {
        // A newer dispatch owns the output now
        debug!("Discarding stale translation (generation {})", generation);
        return;
    }

    session.phase = Phase::Idle;
    match result {
        Ok(text) => {
            session.output = text.clone();
            drop(session);
            let _ = sender.send(json!({ "type": "translation-result", "text": text }).to_string());
        }
        Err(e) => {
            warn!("Translation failed for {}: {}", client_uid, e);
            let message = i18n::translate_failed(&session.ui_lang);
            session.output.clear();
            drop(session);
            let _ = sender.send(
                json!({ "type": "translation-error", "message": message }).to_string(),
            );
        }
    }
}
