use serde::{Deserialize, Serialize};

/// Testo restituito quando il body di POST /messages non contiene `text`.
pub const TEXT_REQUIRED: &str = "Message text is required";
/// Testo restituito quando la lettura dal DB fallisce.
pub const FETCH_FAILED: &str = "Failed to fetch messages";
/// Testo restituito quando la scrittura sul DB fallisce.
pub const SAVE_FAILED: &str = "Failed to save message";

/// Corpo JSON degli errori HTTP: `{ "error": "..." }`.
/// La causa dettagliata finisce nei log, mai qui.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
