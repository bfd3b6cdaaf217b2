//! Realtime Subscriber: ascolta il canale `chat` e salva ogni evento `message` nello store.
//!
//! Due task cooperano:
//! - la connessione Ably ([`ably::AblyConnection`]) legge i frame dal websocket e
//!   inoltra gli eventi decodificati su un canale mpsc;
//! - il [`Subscriber`] li consuma uno alla volta, nell'ordine di arrivo, e chiama
//!   `MessageStore::insert`.
//!
//! # Consegna at-most-once
//!
//! Un insert fallito viene loggato e l'evento è perso: nessun retry, nessuna rimessa in
//! coda. Il subscriber non termina mai per un errore di persistenza.
//!
//! Se la connessione realtime cade il task termina con un log; non c'è riconnessione.

use std::sync::Arc;

use staffetta_core::{InboundEvent, Message};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::store::MessageStore;

pub mod ably;

pub use ably::{AblyConnection, AblySession, RealtimeError, Step};

/// Canale sottoscritto.
pub const CHANNEL: &str = "chat";
/// Nome degli eventi che diventano messaggi.
pub const EVENT_NAME: &str = "message";

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeConfig {
    pub api_key: String,
    pub host: String,
    pub channel: String,
}

/// Consumatore degli eventi del canale. Vedi la policy at-most-once nel doc del modulo.
#[derive(Clone)]
pub struct Subscriber {
    store: Arc<dyn MessageStore>,
}

impl Subscriber {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Gestisce un evento: al più una scrittura, mai un errore verso il chiamante.
    /// Restituisce il messaggio salvato, se c'è.
    pub async fn handle(&self, event: InboundEvent) -> Option<Message> {
        if event.name != EVENT_NAME {
            tracing::debug!(name = %event.name, "ignoring realtime event");
            return None;
        }
        let Some(text) = event.text() else {
            tracing::warn!(data = %event.data, "realtime message without text, skipped");
            return None;
        };
        match self.store.insert(text).await {
            Ok(message) => {
                tracing::info!(id = %message.id, text = %message.text, "message saved to DB");
                Some(message)
            }
            Err(e) => {
                // at-most-once: l'evento si perde qui
                tracing::error!(error = %e, text, "error saving message to DB");
                None
            }
        }
    }

    /// Consuma gli eventi finché il mittente non viene chiuso.
    pub async fn run(self, mut events: mpsc::Receiver<InboundEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        tracing::info!("realtime event stream closed, subscriber stopped");
    }
}

/// Handle dei task del subscriber, tenuto da main fino allo shutdown.
pub struct SubscriberHandle {
    connection: JoinHandle<()>,
    ingest: JoinHandle<()>,
}

impl SubscriberHandle {
    pub fn is_finished(&self) -> bool {
        self.connection.is_finished() && self.ingest.is_finished()
    }

    pub fn shutdown(self) {
        self.connection.abort();
        self.ingest.abort();
    }
}

/// Apre la connessione Ably e avvia il subscriber sullo store indicato.
pub fn spawn_subscriber(
    config: &RealtimeConfig,
    store: Arc<dyn MessageStore>,
) -> Result<SubscriberHandle, RealtimeError> {
    let connection = AblyConnection::new(&config.host, &config.api_key, &config.channel)?;
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);

    let host = config.host.clone();
    let channel = config.channel.clone();
    let connection = tokio::spawn(async move {
        tracing::info!(%host, %channel, "connecting to realtime service");
        match connection.run(tx).await {
            Ok(()) => tracing::info!("realtime connection stopped"),
            Err(e) => tracing::error!(error = %e, "realtime connection ended"),
        }
    });
    let ingest = tokio::spawn(Subscriber::new(store).run(rx));

    Ok(SubscriberHandle { connection, ingest })
}
