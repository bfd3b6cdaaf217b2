use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use staffetta_core::{ErrorBody, FETCH_FAILED, SAVE_FAILED, TEXT_REQUIRED};

use crate::store::PersistenceError;

/// Errori degli handler HTTP. Al client arriva solo `{ "error": ... }` con un testo fisso;
/// la causa di un errore di persistenza viene loggata qui.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("message text is required")]
    MissingText,
    #[error("error fetching messages: {0}")]
    FetchFailed(#[source] PersistenceError),
    #[error("error saving message to DB: {0}")]
    SaveFailed(#[source] PersistenceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingText => StatusCode::BAD_REQUEST,
            ApiError::FetchFailed(_) | ApiError::SaveFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ApiError::MissingText => TEXT_REQUIRED,
            ApiError::FetchFailed(_) => FETCH_FAILED,
            ApiError::SaveFailed(_) => SAVE_FAILED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(ErrorBody::new(self.public_message()))).into_response()
    }
}
