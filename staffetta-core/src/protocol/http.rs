use serde::{Deserialize, Serialize};

/*
    dto per le richieste http
*/
// Create message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CreateMessageRequest {
    /// Testo valido del messaggio: presente e non vuoto.
    pub fn valid_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}
