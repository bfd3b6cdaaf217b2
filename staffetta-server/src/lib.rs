use axum::http::StatusCode;
use std::sync::Arc;

pub mod config;
pub mod controllers;
pub mod error;
pub mod realtime;
pub mod routes;
pub mod store;

use store::{MessageStore, MongoMessageStore, UnavailableStore};

/// Stato condiviso dagli handler: solo l'handle dello store, costruito una volta in main.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MessageStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn MessageStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }
}

/// Apre lo store MongoDB. Gli errori di connessione vengono loggati e il processo
/// prosegue: senza URI valido si ripiega su `UnavailableStore` (ogni richiesta risponde 500),
/// con un server irraggiungibile si tiene il client e ci pensa il driver a ritentare la selezione.
pub async fn connect_store(mongo_uri: Option<&str>) -> Arc<dyn MessageStore> {
    let Some(uri) = mongo_uri else {
        tracing::error!("MONGO_URI is not set, messages cannot be stored");
        return Arc::new(UnavailableStore::new("MONGO_URI is not set"));
    };
    match MongoMessageStore::connect(uri).await {
        Ok(store) => {
            match store.ping().await {
                Ok(()) => tracing::info!(database = store.database_name(), "MongoDB connected"),
                Err(e) => tracing::error!(error = %e, "MongoDB connection error"),
            }
            Arc::new(store)
        }
        Err(e) => {
            tracing::error!(error = %e, "MongoDB connection error");
            Arc::new(UnavailableStore::new(e.to_string()))
        }
    }
}

/// Controlla lo stato di salute dello store con un ping.
pub async fn health_with_store(store: &dyn MessageStore) -> StatusCode {
    match store.ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
