//! HTTP transport for the care runner.
//!
//! Session key precedence, first non-blank wins: the `x-session-id` header,
//! then the `sessionId` query parameter, then the `sessionId` field of a JSON
//! body. With none of them the runner synthesises a new key.

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{HeaderMap, StatusCode},
    middleware::from_fn,
    response::Json,
    routing::{get, post},
};
use care_flow::{
    CareError, CareRunner, DocumentUpload, EmergencyRequest, InMemorySessionStorage, extract,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::{
    config::ServiceConfig,
    models::{
        ActionBody, EmergencyResponse, FallResponse, FitnessResponse, MedicinesResponse,
        SessionQuery, SummaryResponse, UploadResponse,
    },
    telemetry::correlation_id_middleware,
};

pub const SESSION_HEADER: &str = "x-session-id";
const UPLOAD_FIELD: &str = "file";
const FALLBACK_MIME: &str = "application/octet-stream";

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "ok": false, "message": message })),
    )
}

fn internal_error(message: &str, err: &CareError) -> ApiError {
    error!(error = %err, "{}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "ok": false,
            "error": message,
            "details": err.to_string()
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub runner: CareRunner,
}

pub fn create_app(config: &ServiceConfig) -> Router {
    let storage = Arc::new(InMemorySessionStorage::new());
    let app_state = AppState {
        runner: CareRunner::new(storage),
    };
    build_router(app_state, config)
}

pub fn build_router(app_state: AppState, config: &ServiceConfig) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/reports/upload", post(upload_report))
        .route("/api/reports/summary", get(report_summary))
        .route("/api/medicines/generate", post(generate_medicines))
        .route("/api/fitness/generate", post(generate_fitness))
        .route("/api/emergency/notify", post(notify_emergency))
        .route("/api/fall-detection/start", post(start_fall_detection))
        .route("/api/fall-detection/stop", post(stop_fall_detection))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(app_state)
}

/// Picks the session key by header, then query, then body.
pub fn resolve_session_key(
    headers: &HeaderMap,
    query: Option<&str>,
    body: Option<&str>,
) -> Option<String> {
    let header = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok());

    [header, query, body]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string)
}

fn parse_action_body(body: &Bytes) -> ActionBody {
    if body.is_empty() {
        return ActionBody::default();
    }
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable request body");
            return ActionBody::default();
        }
    };

    let session_id = value
        .get("sessionId")
        .and_then(Value::as_str)
        .map(str::to_string);
    let emergency = serde_json::from_value(value).unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring malformed emergency fields");
        EmergencyRequest::default()
    });

    ActionBody {
        session_id,
        emergency,
    }
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Elderly Care API is running",
        "version": "1.0.0",
        "endpoints": {
            "POST /api/reports/upload": "Upload a PDF or spreadsheet report (multipart field 'file')",
            "GET /api/reports/summary": "Health summary of the session's report",
            "POST /api/medicines/generate": "Medicine suggestions for the session's report",
            "POST /api/fitness/generate": "Exercise suggestions for the session's report",
            "POST /api/emergency/notify": "Record an emergency notification request",
            "POST /api/fall-detection/start": "Start fall monitoring",
            "POST /api/fall-detection/stop": "Stop fall monitoring",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn upload_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let session_key = resolve_session_key(&headers, query.session_id.as_deref(), None);

    let Some(upload) = read_upload(&mut multipart).await? else {
        info!(session_id = ?session_key, "Upload request without a file");
        return Err(bad_request_error("No file uploaded"));
    };

    let outcome = state
        .runner
        .ingest(session_key.as_deref(), upload)
        .await
        .map_err(|e| internal_error("Failed to store uploaded report", &e))?;

    Ok(Json(UploadResponse {
        ok: true,
        session: outcome.session_id,
        parsed_data: outcome.parsed_data,
    }))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Option<DocumentUpload>, ApiError> {
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            warn!(error = %e, "Malformed multipart body");
            (
                e.status(),
                Json(json!({ "ok": false, "message": e.body_text() })),
            )
        })?;

        let Some(field) = field else {
            return Ok(None);
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let mimetype = field.content_type().unwrap_or(FALLBACK_MIME).to_string();
        let bytes = field.bytes().await.map_err(|e| {
            warn!(error = %e, "Failed to read uploaded file");
            (
                e.status(),
                Json(json!({ "ok": false, "message": e.body_text() })),
            )
        })?;

        return Ok(Some(DocumentUpload::new(filename, mimetype, bytes.to_vec())));
    }
}

async fn report_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
) -> ApiResult<SummaryResponse> {
    let session_key = resolve_session_key(&headers, query.session_id.as_deref(), None);

    // One load, so the summary and the echoed document always agree.
    let parsed_data = state
        .runner
        .document(session_key.as_deref())
        .await
        .map_err(|e| internal_error("Failed to load session", &e))?;
    let summary = parsed_data.as_ref().map(extract);

    info!(
        session_id = ?session_key,
        found = summary.is_some(),
        "Report summary requested"
    );

    Ok(Json(SummaryResponse {
        ok: true,
        summary,
        parsed_data,
    }))
}

async fn generate_medicines(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
    body: Bytes,
) -> ApiResult<MedicinesResponse> {
    let body = parse_action_body(&body);
    let session_key = resolve_session_key(
        &headers,
        query.session_id.as_deref(),
        body.session_id.as_deref(),
    );

    let items = state
        .runner
        .recommend_medicines(session_key.as_deref())
        .await
        .map_err(|e| internal_error("Failed to generate medicines", &e))?;

    Ok(Json(MedicinesResponse { ok: true, items }))
}

async fn generate_fitness(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
    body: Bytes,
) -> ApiResult<FitnessResponse> {
    let body = parse_action_body(&body);
    let session_key = resolve_session_key(
        &headers,
        query.session_id.as_deref(),
        body.session_id.as_deref(),
    );

    let exercises = state
        .runner
        .recommend_fitness(session_key.as_deref())
        .await
        .map_err(|e| internal_error("Failed to generate exercises", &e))?;

    Ok(Json(FitnessResponse {
        ok: true,
        exercises,
    }))
}

async fn notify_emergency(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
    body: Bytes,
) -> ApiResult<EmergencyResponse> {
    let body = parse_action_body(&body);
    let session_key = resolve_session_key(
        &headers,
        query.session_id.as_deref(),
        body.session_id.as_deref(),
    );

    let notice = state
        .runner
        .notify_emergency(session_key.as_deref(), body.emergency)
        .await
        .map_err(|e| internal_error("Failed to record emergency notification", &e))?;

    Ok(Json(EmergencyResponse {
        ok: true,
        status: "notified".to_string(),
        details: notice.into(),
    }))
}

async fn start_fall_detection(
    state: State<AppState>,
    headers: HeaderMap,
    query: Query<SessionQuery>,
    body: Bytes,
) -> ApiResult<FallResponse> {
    set_fall_detection(state, headers, query, body, true).await
}

async fn stop_fall_detection(
    state: State<AppState>,
    headers: HeaderMap,
    query: Query<SessionQuery>,
    body: Bytes,
) -> ApiResult<FallResponse> {
    set_fall_detection(state, headers, query, body, false).await
}

async fn set_fall_detection(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
    body: Bytes,
    running: bool,
) -> ApiResult<FallResponse> {
    let body = parse_action_body(&body);
    let session_key = resolve_session_key(
        &headers,
        query.session_id.as_deref(),
        body.session_id.as_deref(),
    );

    let running = state
        .runner
        .set_fall_monitor(session_key.as_deref(), running)
        .await
        .map_err(|e| internal_error("Failed to update fall monitor", &e))?;

    Ok(Json(FallResponse { ok: true, running }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_key_precedence() {
        let mut headers = HeaderMap::new();
        assert_eq!(resolve_session_key(&headers, None, None), None);
        assert_eq!(
            resolve_session_key(&headers, Some("q"), Some("b")).as_deref(),
            Some("q")
        );
        assert_eq!(
            resolve_session_key(&headers, Some(" "), Some("b")).as_deref(),
            Some("b")
        );

        headers.insert(SESSION_HEADER, HeaderValue::from_static("h"));
        assert_eq!(
            resolve_session_key(&headers, Some("q"), Some("b")).as_deref(),
            Some("h")
        );
    }

    #[test]
    fn test_action_body_parsing_is_lenient() {
        let body = parse_action_body(&Bytes::from_static(b"not json"));
        assert!(body.session_id.is_none());

        let body = parse_action_body(&Bytes::from_static(
            br#"{"sessionId":"s1","mode":"call","message":"help"}"#,
        ));
        assert_eq!(body.session_id.as_deref(), Some("s1"));
        assert_eq!(body.emergency.mode.as_deref(), Some("call"));
        assert!(body.emergency.contacts.is_empty());
    }

    #[test]
    fn test_malformed_emergency_fields_keep_session_id() {
        let body = parse_action_body(&Bytes::from_static(
            br#"{"sessionId":"s1","message":"help","contacts":"+15550100"}"#,
        ));
        assert_eq!(body.session_id.as_deref(), Some("s1"));
        assert!(body.emergency.message.is_none());
        assert!(body.emergency.contacts.is_empty());
    }
}
