//! Message Store: astrazione di persistenza sulla collezione dei messaggi di chat.
//!
//! Gli adapter condividono lo stesso contratto: `insert` assegna identità e timestamp,
//! `list_all` restituisce tutto in ordine di timestamp decrescente (a parità, l'ultimo
//! inserito viene prima). Non esistono update o delete.

use async_trait::async_trait;
use staffetta_core::Message;

pub mod memory;
pub mod mongo;
pub mod unavailable;

pub use memory::InMemoryMessageStore;
pub use mongo::MongoMessageStore;
pub use unavailable::UnavailableStore;

/// Errori dello store. La causa va nei log, al client arriva solo un messaggio generico.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, PersistenceError>;

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Salva un nuovo messaggio con timestamp e identità assegnati dallo store.
    async fn insert(&self, text: &str) -> StoreResult<Message>;

    /// Tutti i messaggi, dal più recente al più vecchio.
    async fn list_all(&self) -> StoreResult<Vec<Message>>;

    /// Verifica che lo store sia raggiungibile.
    async fn ping(&self) -> StoreResult<()>;
}
