use async_trait::async_trait;
use staffetta_core::Message;

use super::{MessageStore, PersistenceError, StoreResult};

/// Store usato quando il database non è raggiungibile all'avvio: il processo resta su
/// e ogni operazione fallisce, così le richieste rispondono 500 invece di far cadere il server.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    fn error(&self) -> PersistenceError {
        PersistenceError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl MessageStore for UnavailableStore {
    async fn insert(&self, _text: &str) -> StoreResult<Message> {
        Err(self.error())
    }

    async fn list_all(&self) -> StoreResult<Vec<Message>> {
        Err(self.error())
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(self.error())
    }
}
