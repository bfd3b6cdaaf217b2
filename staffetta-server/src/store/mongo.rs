use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use staffetta_core::{now_timestamp, Message};
use time::OffsetDateTime;

use super::{MessageStore, PersistenceError, StoreResult};

/// Nome della collezione dei messaggi.
pub const COLLECTION: &str = "messages";
/// Database usato quando la connection string non ne indica uno.
pub const DEFAULT_DATABASE: &str = "test";

/// Documento come sta su MongoDB: `{ _id, text, timestamp }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    text: String,
    timestamp: DateTime,
}

impl MessageDocument {
    fn into_message(self) -> StoreResult<Message> {
        let nanos = i128::from(self.timestamp.timestamp_millis()) * 1_000_000;
        let timestamp = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|e| PersistenceError::Corrupt(format!("timestamp of {}: {}", self.id, e)))?;
        Ok(Message { id: self.id.to_hex(), text: self.text, timestamp })
    }
}

fn to_bson_date(ts: OffsetDateTime) -> DateTime {
    // i millisecondi dal 1970 stanno comodamente in un i64
    DateTime::from_millis((ts.unix_timestamp_nanos() / 1_000_000) as i64)
}

/// Message Store su una collezione MongoDB.
#[derive(Debug, Clone)]
pub struct MongoMessageStore {
    db: Database,
    collection: Collection<MessageDocument>,
}

impl MongoMessageStore {
    /// Costruisce il client dalla connection string. Il driver si connette in modo lazy:
    /// qui fallisce solo un URI non valido, la raggiungibilità si verifica con `ping`.
    pub async fn connect(uri: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));
        Ok(Self::from_database(db))
    }

    pub fn from_database(db: Database) -> Self {
        let collection = db.collection::<MessageDocument>(COLLECTION);
        Self { db, collection }
    }

    pub fn database_name(&self) -> &str {
        self.db.name()
    }
}

#[async_trait]
impl MessageStore for MongoMessageStore {
    async fn insert(&self, text: &str) -> StoreResult<Message> {
        let document = MessageDocument {
            id: ObjectId::new(),
            text: text.to_string(),
            timestamp: to_bson_date(now_timestamp()),
        };
        self.collection.insert_one(&document).await?;
        document.into_message()
    }

    async fn list_all(&self) -> StoreResult<Vec<Message>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "timestamp": -1, "_id": -1 })
            .await?;
        let documents: Vec<MessageDocument> = cursor.try_collect().await?;
        documents.into_iter().map(MessageDocument::into_message).collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
