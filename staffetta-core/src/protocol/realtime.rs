/* Questo file definisce come i dati "viaggiano" sul websocket realtime di Ably (formato json).
    Ogni frame è un ProtocolMessage identificato dal campo numerico `action`:
    CONNECTED -> la connessione è pronta, il client può fare ATTACH
    ATTACH / ATTACHED -> richiesta di sottoscrizione al canale e relativa conferma
    MESSAGE -> uno o più messaggi pubblicati sul canale
    ERROR -> errore di connessione (senza channel) o di canale (con channel)
*/
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Azione di un frame del protocollo realtime, serializzata come intero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Action {
    Heartbeat,
    Ack,
    Nack,
    Connect,
    Connected,
    Disconnect,
    Disconnected,
    Close,
    Closed,
    Error,
    Attach,
    Attached,
    Detach,
    Detached,
    Presence,
    Message,
    Sync,
    Auth,
    /// Azioni che il relay non conosce: vengono ignorate.
    Other(u8),
}

impl From<u8> for Action {
    fn from(code: u8) -> Self {
        match code {
            0 => Action::Heartbeat,
            1 => Action::Ack,
            2 => Action::Nack,
            3 => Action::Connect,
            4 => Action::Connected,
            5 => Action::Disconnect,
            6 => Action::Disconnected,
            7 => Action::Close,
            8 => Action::Closed,
            9 => Action::Error,
            10 => Action::Attach,
            11 => Action::Attached,
            12 => Action::Detach,
            13 => Action::Detached,
            14 => Action::Presence,
            15 => Action::Message,
            16 => Action::Sync,
            17 => Action::Auth,
            other => Action::Other(other),
        }
    }
}

impl From<Action> for u8 {
    fn from(action: Action) -> Self {
        match action {
            Action::Heartbeat => 0,
            Action::Ack => 1,
            Action::Nack => 2,
            Action::Connect => 3,
            Action::Connected => 4,
            Action::Disconnect => 5,
            Action::Disconnected => 6,
            Action::Close => 7,
            Action::Closed => 8,
            Action::Error => 9,
            Action::Attach => 10,
            Action::Attached => 11,
            Action::Detach => 12,
            Action::Detached => 13,
            Action::Presence => 14,
            Action::Message => 15,
            Action::Sync => 16,
            Action::Auth => 17,
            Action::Other(code) => code,
        }
    }
}

/// Frame scambiato sul websocket (S→C e C→S).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolMessage {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ChannelMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl ProtocolMessage {
    /// Frame con la sola azione valorizzata.
    pub fn new(action: Action) -> Self {
        Self {
            action,
            channel: None,
            connection_id: None,
            messages: Vec::new(),
            error: None,
        }
    }

    /// Richiesta di sottoscrizione (C→S) al canale indicato.
    pub fn attach(channel: &str) -> Self {
        Self {
            channel: Some(channel.to_string()),
            ..Self::new(Action::Attach)
        }
    }
}

/// Singolo messaggio pubblicato su un canale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Catena di codifiche applicate a `data`, es. "json" o "json/utf-8".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Errore di decodifica del payload di un messaggio.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported encoding `{0}`")]
    UnsupportedEncoding(String),
    #[error("json encoding on a non-string payload")]
    NotAString,
    #[error("invalid json payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChannelMessage {
    /// Restituisce `data` con le codifiche rimosse, dall'ultima alla prima.
    pub fn decoded_data(&self) -> Result<Value, DecodeError> {
        let mut data = self.data.clone().unwrap_or(Value::Null);
        let Some(encoding) = self.encoding.as_deref().filter(|e| !e.is_empty()) else {
            return Ok(data);
        };
        for step in encoding.rsplit('/') {
            data = match step {
                "utf-8" => data,
                "json" => match data {
                    Value::String(raw) => serde_json::from_str(&raw)?,
                    _ => return Err(DecodeError::NotAString),
                },
                other => return Err(DecodeError::UnsupportedEncoding(other.to_string())),
            };
        }
        Ok(data)
    }
}

/// Dettaglio di errore inviato dal servizio realtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Evento ricevuto dal canale, già decodificato: quello che il subscriber consuma.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub name: String,
    pub data: Value,
}

impl InboundEvent {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self { name: name.into(), data }
    }

    /// Testo del messaggio di chat, se l'evento ne porta uno non vuoto.
    pub fn text(&self) -> Option<&str> {
        self.data
            .get("text")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
    }
}
