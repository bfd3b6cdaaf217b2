use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use staffetta_core::{now_timestamp, Message};

use super::{MessageStore, PersistenceError, StoreResult};

/// Store in memoria, per i test e per girare in locale senza MongoDB.
/// Le identità sono object id come quelle assegnate da MongoDB.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMessageStore {
    // in ordine di inserimento
    messages: Arc<RwLock<Vec<Message>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numero di messaggi salvati (0 se il lock è avvelenato).
    pub fn len(&self) -> usize {
        self.messages.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> PersistenceError {
    PersistenceError::Unavailable("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn insert(&self, text: &str) -> StoreResult<Message> {
        let message = Message {
            id: ObjectId::new().to_hex(),
            text: text.to_string(),
            timestamp: now_timestamp(),
        };
        self.messages.write().map_err(poisoned)?.push(message.clone());
        Ok(message)
    }

    async fn list_all(&self) -> StoreResult<Vec<Message>> {
        let guard = self.messages.read().map_err(poisoned)?;
        // iter().rev() mette gli ultimi inseriti davanti; il sort stabile conserva
        // quell'ordine tra messaggi con lo stesso timestamp
        let mut all: Vec<Message> = guard.iter().rev().cloned().collect();
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(all)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.messages.read().map(|_| ()).map_err(poisoned)
    }
}
