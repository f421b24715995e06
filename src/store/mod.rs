//! Record store seam.
//!
//! Handlers only ever see [`RecordStore`]; the concrete backend is chosen once
//! at startup by [`connect`] and injected through the application state.

pub mod firestore;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StoreBackend};
use crate::models::{Fields, Listing};

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Collection (or table) holding every listing.
pub const PROPERTIES_COLLECTION: &str = "properties";

/// Failures talking to a record store. Never rendered to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store responded {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("could not decode store response: {0}")]
    Decode(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

/// Create / read-all / get / delete over the listings collection.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Every listing, in the backend's natural order.
    async fn list(&self) -> Result<Vec<Listing>, StoreError>;

    /// Inserts a document; the store assigns the id.
    async fn insert(&self, fields: Fields) -> Result<Listing, StoreError>;

    /// Looks up one listing. Unknown ids are `Ok(None)`.
    async fn get(&self, id: &str) -> Result<Option<Listing>, StoreError>;

    /// Removes one listing.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Backend name, for logs.
    fn backend(&self) -> &'static str;
}

/// Builds the configured backend.
pub async fn connect(config: &Config) -> anyhow::Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match config.store_backend {
        StoreBackend::Firestore => Arc::new(FirestoreStore::from_config(config).await?),
        StoreBackend::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("DATABASE_URL is required when RECORD_STORE=postgres")
            })?;
            Arc::new(PostgresStore::connect(url).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory record store; listings are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    tracing::info!("Record store ready: {}", store.backend());
    Ok(store)
}
