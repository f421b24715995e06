use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use uuid::Uuid;

use super::{RecordStore, StoreError, PROPERTIES_COLLECTION};
use crate::models::{Fields, Listing};

/// Listings kept as JSONB documents in a Postgres table named after the collection.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        let store = Self::new(pool);
        store.ensure_table().await?;
        tracing::info!("Database connection pool established");
        Ok(store)
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_table(&self) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                doc JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
            PROPERTIES_COLLECTION
        ))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

type Row = (Uuid, Json<Fields>);

fn into_listing((id, Json(fields)): Row) -> Listing {
    Listing::new(id.to_string(), fields)
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn list(&self) -> Result<Vec<Listing>, StoreError> {
        let rows = sqlx::query_as::<_, Row>(&format!(
            "SELECT id, doc FROM {} ORDER BY created_at ASC, id ASC",
            PROPERTIES_COLLECTION
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_listing).collect())
    }

    async fn insert(&self, fields: Fields) -> Result<Listing, StoreError> {
        let row = sqlx::query_as::<_, Row>(&format!(
            "INSERT INTO {} (id, doc) VALUES ($1, $2) RETURNING id, doc",
            PROPERTIES_COLLECTION
        ))
        .bind(Uuid::new_v4())
        .bind(Json(&fields))
        .fetch_one(&self.pool)
        .await?;

        Ok(into_listing(row))
    }

    async fn get(&self, id: &str) -> Result<Option<Listing>, StoreError> {
        // Ids this store never assigned cannot exist
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, Row>(&format!(
            "SELECT id, doc FROM {} WHERE id = $1",
            PROPERTIES_COLLECTION
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(into_listing))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(());
        };

        sqlx::query(&format!("DELETE FROM {} WHERE id = $1", PROPERTIES_COLLECTION))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
