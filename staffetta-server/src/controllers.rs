use axum::{body::Bytes, extract::Extension, http::header, http::HeaderMap, http::StatusCode, Json};
use staffetta_core::{CreateMessageRequest, Message};
use std::sync::Arc;

use crate::{error::ApiError, health_with_store, AppState};

/// Handler per GET /messages: tutti i messaggi, dal più recente.
pub async fn list_messages(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state.store.list_all().await.map_err(ApiError::FetchFailed)?;
    tracing::info!(count = messages.len(), "fetched messages from DB");
    Ok(Json(messages))
}

/// Handler per POST /messages
pub async fn create_message(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    // un body assente, non json (anche solo per Content-Type) o con text di tipo sbagliato
    // vale come text mancante: in tutti i casi è un 400 e lo store non viene toccato
    let req: CreateMessageRequest = if is_json(&headers) {
        serde_json::from_slice(&body).unwrap_or_default()
    } else {
        CreateMessageRequest::default()
    };
    let text = req.valid_text().ok_or(ApiError::MissingText)?;

    let message = state.store.insert(text).await.map_err(ApiError::SaveFailed)?;
    tracing::info!(id = %message.id, text = %message.text, "message saved to DB");
    Ok((StatusCode::CREATED, Json(message)))
}

/// Vero se il Content-Type è `application/json`, con o senza parametri (es. charset).
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// Handler per GET /health
pub async fn health(Extension(state): Extension<Arc<AppState>>) -> StatusCode {
    health_with_store(state.store.as_ref()).await
}
