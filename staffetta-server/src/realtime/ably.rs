//! Client del protocollo realtime di Ably su websocket (formato json).
//!
//! [`AblySession`] è la macchina a stati pura: riceve un frame e dice cosa fare
//! ([`Step`]). [`AblyConnection`] fa l'I/O sul websocket e applica gli step.

use futures_util::{SinkExt, StreamExt};
use staffetta_core::{Action, InboundEvent, ProtocolMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsFrame};
use url::Url;

pub const DEFAULT_HOST: &str = "realtime.ably.io";
pub const PROTOCOL_VERSION: &str = "1.2";

#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("invalid realtime endpoint: {0}")]
    Url(#[from] url::ParseError),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("cannot encode frame: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("realtime service error (code {code:?}): {message}")]
    Service { code: Option<u32>, message: String },
    #[error("connection closed: {0}")]
    Closed(String),
}

/// Cosa fare dopo aver letto un frame.
#[derive(Debug)]
pub enum Step {
    Nothing,
    Send(ProtocolMessage),
    Deliver(Vec<InboundEvent>),
    End(RealtimeError),
}

/// Stato della sessione su un singolo canale.
#[derive(Debug, Clone)]
pub struct AblySession {
    channel: String,
    attached: bool,
}

impl AblySession {
    pub fn new(channel: impl Into<String>) -> Self {
        Self { channel: channel.into(), attached: false }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    fn is_ours(&self, frame: &ProtocolMessage) -> bool {
        frame.channel.as_deref() == Some(self.channel.as_str())
    }

    pub fn on_frame(&mut self, frame: ProtocolMessage) -> Step {
        match frame.action {
            Action::Connected => {
                tracing::info!(connection_id = ?frame.connection_id, "realtime connected");
                Step::Send(ProtocolMessage::attach(&self.channel))
            }
            Action::Attached if self.is_ours(&frame) => {
                self.attached = true;
                tracing::info!(channel = %self.channel, "attached to channel");
                Step::Nothing
            }
            Action::Detached if self.is_ours(&frame) => {
                self.attached = false;
                tracing::warn!(channel = %self.channel, error = ?frame.error, "detached from channel");
                Step::Nothing
            }
            Action::Message if self.is_ours(&frame) => {
                let mut events = Vec::with_capacity(frame.messages.len());
                for message in frame.messages {
                    match message.decoded_data() {
                        Ok(data) => events.push(InboundEvent::new(
                            message.name.unwrap_or_default(),
                            data,
                        )),
                        Err(e) => {
                            tracing::warn!(id = ?message.id, error = %e, "undecodable realtime message, skipped")
                        }
                    }
                }
                Step::Deliver(events)
            }
            Action::Error if frame.channel.is_some() => {
                // errore di canale: la connessione resta su
                self.attached = false;
                tracing::error!(channel = ?frame.channel, error = ?frame.error, "realtime channel error");
                Step::Nothing
            }
            Action::Error => {
                let info = frame.error.unwrap_or_default();
                Step::End(RealtimeError::Service {
                    code: info.code,
                    message: info.message.unwrap_or_else(|| "unknown error".to_string()),
                })
            }
            Action::Disconnected | Action::Closed => {
                let reason = frame
                    .error
                    .and_then(|info| info.message)
                    .unwrap_or_else(|| format!("{:?} by server", frame.action));
                Step::End(RealtimeError::Closed(reason))
            }
            _ => Step::Nothing,
        }
    }
}

/// Connessione websocket verso il servizio realtime, sottoscritta a un canale.
pub struct AblyConnection {
    endpoint: Url,
    session: AblySession,
}

impl AblyConnection {
    pub fn new(host: &str, api_key: &str, channel: &str) -> Result<Self, RealtimeError> {
        let endpoint = endpoint_url(host, api_key)?;
        Ok(Self { endpoint, session: AblySession::new(channel) })
    }

    /// Legge i frame finché la connessione non si chiude, inoltrando gli eventi su `events`.
    /// Termina con `Ok` solo se il ricevitore degli eventi è stato chiuso.
    pub async fn run(mut self, events: mpsc::Sender<InboundEvent>) -> Result<(), RealtimeError> {
        let (socket, _) = connect_async(self.endpoint.as_str()).await?;
        let (mut sink, mut stream) = socket.split();

        while let Some(frame) = stream.next().await {
            let text = match frame? {
                WsFrame::Text(text) => text,
                WsFrame::Close(close) => {
                    let reason = close
                        .map(|c| c.reason.to_string())
                        .unwrap_or_else(|| "no reason".to_string());
                    return Err(RealtimeError::Closed(reason));
                }
                // ping/pong li gestisce tungstenite
                _ => continue,
            };
            let frame: ProtocolMessage = match serde_json::from_str(&text) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(error = %e, "malformed realtime frame, skipped");
                    continue;
                }
            };
            match self.session.on_frame(frame) {
                Step::Nothing => {}
                Step::Send(reply) => {
                    sink.send(WsFrame::Text(serde_json::to_string(&reply)?)).await?;
                }
                Step::Deliver(batch) => {
                    for event in batch {
                        if events.send(event).await.is_err() {
                            return Ok(());
                        }
                    }
                }
                Step::End(err) => return Err(err),
            }
        }
        Err(RealtimeError::Closed("stream ended".to_string()))
    }
}

/// URL websocket con la chiave in query (basic auth su TLS).
/// `host` può essere un nome host (si usa `wss://`) o un URL completo `ws://`/`wss://`.
fn endpoint_url(host: &str, api_key: &str) -> Result<Url, RealtimeError> {
    let mut url = if host.contains("://") {
        Url::parse(host)?
    } else {
        Url::parse(&format!("wss://{}/", host))?
    };
    url.query_pairs_mut()
        .append_pair("key", api_key)
        .append_pair("format", "json")
        .append_pair("v", PROTOCOL_VERSION);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(raw: serde_json::Value) -> ProtocolMessage {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn connected_triggers_attach_to_chat() {
        let mut session = AblySession::new("chat");
        match session.on_frame(frame(json!({"action": 4, "connectionId": "c1"}))) {
            Step::Send(reply) => {
                assert_eq!(reply.action, Action::Attach);
                assert_eq!(reply.channel.as_deref(), Some("chat"));
            }
            other => panic!("expected attach, got {:?}", other),
        }
        assert!(!session.is_attached());

        assert!(matches!(
            session.on_frame(frame(json!({"action": 11, "channel": "chat"}))),
            Step::Nothing
        ));
        assert!(session.is_attached());
    }

    #[test]
    fn message_frame_delivers_decoded_events() {
        let mut session = AblySession::new("chat");
        let step = session.on_frame(frame(json!({
            "action": 15,
            "channel": "chat",
            "messages": [
                {"name": "message", "data": "{\"text\":\"hello\"}", "encoding": "json"},
                {"name": "message", "data": "broken", "encoding": "json"},
                {"name": "typing", "data": {"who": "ann"}}
            ]
        })));
        match step {
            Step::Deliver(events) => {
                assert_eq!(events.len(), 2);
                assert_eq!(events[0], InboundEvent::new("message", json!({"text": "hello"})));
                assert_eq!(events[1].name, "typing");
            }
            other => panic!("expected deliver, got {:?}", other),
        }
    }

    #[test]
    fn frames_for_other_channels_are_ignored() {
        let mut session = AblySession::new("chat");
        let step = session.on_frame(frame(json!({
            "action": 15,
            "channel": "other",
            "messages": [{"name": "message", "data": {"text": "nope"}}]
        })));
        assert!(matches!(step, Step::Nothing));
    }

    #[test]
    fn connection_error_ends_the_session() {
        let mut session = AblySession::new("chat");
        let step = session.on_frame(frame(json!({
            "action": 9,
            "error": {"code": 40101, "statusCode": 401, "message": "Invalid credentials"}
        })));
        match step {
            Step::End(RealtimeError::Service { code, message }) => {
                assert_eq!(code, Some(40101));
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("expected end, got {:?}", other),
        }
    }

    #[test]
    fn channel_error_keeps_the_connection() {
        let mut session = AblySession::new("chat");
        let step = session.on_frame(frame(json!({
            "action": 9,
            "channel": "chat",
            "error": {"code": 40160, "message": "not permitted"}
        })));
        assert!(matches!(step, Step::Nothing));
    }

    #[test]
    fn heartbeat_does_nothing_and_closed_ends() {
        let mut session = AblySession::new("chat");
        assert!(matches!(session.on_frame(frame(json!({"action": 0}))), Step::Nothing));
        assert!(matches!(
            session.on_frame(frame(json!({"action": 8}))),
            Step::End(RealtimeError::Closed(_))
        ));
    }

    #[test]
    fn endpoint_accepts_explicit_scheme() {
        let url = endpoint_url("ws://127.0.0.1:9000", "k:s").unwrap();
        assert_eq!(url.scheme(), "ws");
        assert_eq!(url.port(), Some(9000));
        assert_eq!(url.path(), "/");
        assert!(url.query_pairs().any(|(k, v)| k == "key" && v == "k:s"));
    }

    #[test]
    fn endpoint_carries_key_and_format() {
        let url = endpoint_url("realtime.ably.io", "app.key:secret").unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.host_str(), Some("realtime.ably.io"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("key".to_string(), "app.key:secret".to_string())));
        assert!(pairs.contains(&("format".to_string(), "json".to_string())));
        assert!(pairs.contains(&("v".to_string(), "1.2".to_string())));
    }
}
