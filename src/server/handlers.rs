//! Route handlers. Every handler answers 200 with a JSON body; failures are
//! carried in an `error` key.

use super::forms::{non_blank, BillForm, ChatForm};
use super::AppState;
use crate::api::{BillResponse, CarbonBudgetResponse, ChatResponse, DEFAULT_USER_ID};
use crate::budget::BudgetResult;
use crate::telemetry::TelemetryMetrics;
use crate::{Error, Result};

use axum::extract::multipart::MultipartRejection;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::Form;
use axum::Json;
use serde_json::{json, Value};

/// `POST /bill-handler/`
pub(crate) async fn bill_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Json<BillResponse> {
    Json(analyse(&state, multipart).await.into())
}

/// `POST /carbon-budget/`
pub(crate) async fn carbon_budget(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Json<CarbonBudgetResponse> {
    Json(analyse(&state, multipart).await.into())
}

/// `POST /chat-reply/`
pub(crate) async fn chat_reply(
    State(state): State<AppState>,
    request: Request,
) -> Json<ChatResponse> {
    Json(reply(&state, request).await.into())
}

/// `GET /health`
pub(crate) async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "active_sessions": state.sessions.len(),
        "model": state.model_name,
    }))
}

/// `GET /metrics`
pub(crate) async fn metrics(State(state): State<AppState>) -> Json<TelemetryMetrics> {
    Json(state.telemetry.metrics())
}

async fn analyse(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<BudgetResult> {
    let multipart = multipart.map_err(|e| {
        rejected(
            state,
            Error::validation(format!("expected a multipart upload: {}", e)),
        )
    })?;

    let submission = BillForm::from_multipart(multipart)
        .await
        .and_then(BillForm::into_submission)
        .map_err(|e| rejected(state, e))?;

    state.ingestion.ingest(submission).await
}

async fn reply(state: &AppState, request: Request) -> Result<String> {
    let form = read_chat_form(state, request)
        .await
        .map_err(|e| rejected(state, e))?;

    let user_id = non_blank(form.user_id).unwrap_or_else(|| DEFAULT_USER_ID.to_string());
    let message = form.message.unwrap_or_default();

    state.chat.reply(&user_id, &message).await
}

async fn read_chat_form(state: &AppState, request: Request) -> Result<ChatForm> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| Error::validation(format!("expected a multipart form: {}", e)))?;
        ChatForm::from_multipart(multipart).await
    } else {
        let Form(form) = Form::<ChatForm>::from_request(request, state)
            .await
            .map_err(|e| Error::validation(format!("expected a url-encoded form: {}", e)))?;
        Ok(form)
    }
}

/// Log and count a request that never reached a service.
fn rejected(state: &AppState, error: Error) -> Error {
    tracing::warn!(error = %error, "Rejected request");
    state.telemetry.record_error(error.category());
    error
}
