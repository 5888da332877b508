use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tracing::warn;

use crate::error::GatewayError;
use crate::state::AppState;
use crate::translate::interface::{fallback_languages, TranslateRequest};
use crate::utils::filename;

pub fn create_routes(state: AppState) -> Router<AppState> {
    let system_config = &state.config.system_config;
    let upload_limit = state.config.translate_config.max_upload_bytes as usize + 64 * 1024;

    Router::new()
        // WebSocket session endpoint
        .route("/client-ws", get(crate::websocket::websocket_handler))
        // REST API routes
        .route("/api/health", get(health_check))
        .route("/api/languages", get(get_languages))
        .route("/api/translate", post(translate_text))
        .route(
            "/api/translate-file",
            post(translate_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Static frontend
        .fallback_service(ServeDir::new(&system_config.frontend_dir))
}

/// Health never fails; backend reachability is reported in the body
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let backend_up = state.backend.health_check().await.unwrap_or(false);
    Json(json!({
        "status": "ok",
        "backend": if backend_up { "connected" } else { "disconnected" },
    }))
}

async fn get_languages(State(state): State<AppState>) -> Json<Value> {
    match state.backend.languages().await {
        Ok(languages) => Json(json!(languages)),
        Err(e) => {
            warn!("Languages unavailable, serving fallback list: {}", e);
            Json(json!(fallback_languages()))
        }
    }
}

async fn translate_text(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, GatewayError> {
    let request: TranslateRequest = serde_json::from_value(payload)
        .map_err(|_| GatewayError::Validation("Text is required".to_string()))?;

    if request.text.trim().is_empty() {
        return Err(GatewayError::Validation("Text is required".to_string()));
    }

    let max_length = state.config.translate_config.max_text_length;
    if request.text.chars().count() > max_length {
        return Err(GatewayError::Validation(format!(
            "Text too long (max {} characters)",
            max_length
        )));
    }

    let response = state
        .translator
        .translate(&request)
        .await
        .map_err(GatewayError::backend)?;

    Ok(Json(response))
}

async fn translate_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, GatewayError> {
    let mut file_name: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut source_lang = state.config.translate_config.default_source_lang.clone();
    let mut target_lang = state.config.translate_config.default_target_lang.clone();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::Validation(format!("Invalid multipart payload: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await.map_err(|e| {
                    GatewayError::Validation(format!("Failed to read file: {}", e))
                })?;
                file_bytes = Some(data.to_vec());
            }
            Some("source_lang") => {
                source_lang = field.text().await.map_err(|e| {
                    GatewayError::Validation(format!("Invalid multipart payload: {}", e))
                })?;
            }
            Some("target_lang") => {
                target_lang = field.text().await.map_err(|e| {
                    GatewayError::Validation(format!("Invalid multipart payload: {}", e))
                })?;
            }
            _ => {}
        }
    }

    let file_name = file_name
        .ok_or_else(|| GatewayError::Validation("No file provided".to_string()))?;
    let file_bytes = file_bytes
        .ok_or_else(|| GatewayError::Validation("No file provided".to_string()))?;

    // Validated locally; nothing leaves the gateway for a rejected upload
    let max_bytes = state.config.translate_config.max_upload_bytes;
    filename::validate_upload(&file_name, file_bytes.len() as u64, max_bytes)
        .map_err(|e| GatewayError::Validation(e.to_string()))?;

    let translated = state
        .backend
        .translate_document(&file_name, file_bytes, &source_lang, &target_lang)
        .await
        .map_err(GatewayError::backend)?;

    let download_name = filename::translated_file_name(&file_name, &source_lang, &target_lang);
    let headers = [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download_name),
        ),
    ];

    Ok((headers, translated).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::translate::testing::StubBackend;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(backend: Arc<StubBackend>) -> axum::Router {
        let state = AppState::with_backend(Config::default(), backend);
        create_routes(state.clone()).with_state(state)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(uri: &str, payload: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    fn multipart_request(file_name: &str, payload: &[u8]) -> Request<Body> {
        let boundary = "test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\n\
                 Content-Disposition: form-data; name=\"source_lang\"\r\n\r\nid\r\n\
                 --{boundary}\r\n\
                 Content-Disposition: form-data; name=\"target_lang\"\r\n\r\nen\r\n\
                 --{boundary}\r\n\
                 Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/translate-file")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_connected_backend() {
        let response = app(Arc::new(StubBackend::replying("Hello")))
            .oneshot(get_request("/api/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "status": "ok", "backend": "connected" }));
    }

    #[tokio::test]
    async fn health_is_200_even_when_backend_is_down() {
        let response = app(Arc::new(StubBackend::unreachable()))
            .oneshot(get_request("/api/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "status": "ok", "backend": "disconnected" }));
    }

    #[tokio::test]
    async fn languages_pass_through_on_success() {
        let response = app(Arc::new(StubBackend::replying("Hello")))
            .oneshot(get_request("/api/languages"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn languages_degrade_to_the_fallback_list() {
        let response = app(Arc::new(StubBackend::unreachable()))
            .oneshot(get_request("/api/languages"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let codes: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, ["id", "en", "es", "fr", "de", "ja", "ko", "zh", "ar", "ru"]);
    }

    #[tokio::test]
    async fn translate_requires_text() {
        let backend = Arc::new(StubBackend::replying("Hello"));

        let response = app(backend.clone())
            .oneshot(json_request("/api/translate", json!({ "source_lang": "id" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Text is required");

        let response = app(backend.clone())
            .oneshot(json_request("/api/translate", json!({ "text": "   " })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert_eq!(backend.translate_count(), 0);
    }

    #[tokio::test]
    async fn translate_rejects_overlong_text() {
        let backend = Arc::new(StubBackend::replying("Hello"));
        let text = "a".repeat(5001);

        let response = app(backend.clone())
            .oneshot(json_request("/api/translate", json!({ "text": text })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(backend.translate_count(), 0);
    }

    #[tokio::test]
    async fn translate_returns_backend_json_verbatim() {
        let response = app(Arc::new(StubBackend::replying("Hello")))
            .oneshot(json_request("/api/translate", json!({ "text": "halo" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "translatedText": "Hello" }));
    }

    #[tokio::test]
    async fn translate_maps_backend_failure_to_500() {
        let response = app(Arc::new(StubBackend::unreachable()))
            .oneshot(json_request("/api/translate", json!({ "text": "halo" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Translation failed");
        assert!(body["details"].as_str().unwrap().contains("unreachable"));
    }

    #[tokio::test]
    async fn upload_rejects_unsupported_extension_without_backend_call() {
        let backend = Arc::new(StubBackend::replying("Hello"));

        let response = app(backend.clone())
            .oneshot(multipart_request("notes.md", b"hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(backend.document_count(), 0);
    }

    #[tokio::test]
    async fn upload_rejects_oversized_file_without_backend_call() {
        let backend = Arc::new(StubBackend::replying("Hello"));
        let payload = vec![0u8; 5 * 1024 * 1024 + 1];

        let response = app(backend.clone())
            .oneshot(multipart_request("big.txt", &payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(backend.document_count(), 0);
    }

    #[tokio::test]
    async fn upload_translates_and_renames_the_document() {
        let backend = Arc::new(StubBackend::replying("Hello"));

        let response = app(backend.clone())
            .oneshot(multipart_request("report.txt", b"halo dunia"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.document_count(), 1);

        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("report_id_en.txt"), "{disposition}");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"halo dunia");
    }
}
