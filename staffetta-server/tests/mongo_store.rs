// Test contro un MongoDB vero: girano solo se STAFFETTA_TEST_MONGO_URI è impostata,
// altrimenti escono subito.
use anyhow::Result;
use mongodb::bson::oid::ObjectId;

use staffetta_server::store::{MessageStore, MongoMessageStore};

const URI_VAR: &str = "STAFFETTA_TEST_MONGO_URI";

// Ogni test usa un database nuovo, così non si pestano i piedi
async fn fresh_store() -> Result<Option<(MongoMessageStore, mongodb::Database)>> {
    let Ok(uri) = std::env::var(URI_VAR) else {
        return Ok(None);
    };
    let client = mongodb::Client::with_uri_str(&uri).await?;
    let db = client.database(&format!("staffetta_test_{}", ObjectId::new().to_hex()));
    Ok(Some((MongoMessageStore::from_database(db.clone()), db)))
}

#[tokio::test]
async fn insert_and_list_newest_first() -> Result<()> {
    let Some((store, db)) = fresh_store().await? else {
        return Ok(());
    };
    store.ping().await?;
    assert!(store.list_all().await?.is_empty());

    let a = store.insert("A").await?;
    let b = store.insert("B").await?;
    let listed = store.list_all().await?;
    assert_eq!(listed, vec![b, a]);

    db.drop().await?;
    Ok(())
}

#[tokio::test]
async fn connect_rejects_invalid_uri() -> Result<()> {
    if std::env::var(URI_VAR).is_err() {
        return Ok(());
    }
    assert!(MongoMessageStore::connect("not-a-mongo-uri").await.is_err());
    Ok(())
}
