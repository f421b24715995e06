use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::models::{Fields, Listing};

/// Process-local listing store.
///
/// Keeps insertion order and hands out UUID v4 ids. Nothing survives a restart,
/// so this is meant for tests and local development.
#[derive(Clone, Default)]
pub struct MemoryStore(Arc<RwLock<Vec<Listing>>>);

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored listings.
    pub async fn len(&self) -> usize {
        self.0.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.0.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Listing>, StoreError> {
        Ok(self.0.read().await.clone())
    }

    async fn insert(&self, fields: Fields) -> Result<Listing, StoreError> {
        let listing = Listing::new(Uuid::new_v4().to_string(), fields);
        self.0.write().await.push(listing.clone());
        Ok(listing)
    }

    async fn get(&self, id: &str) -> Result<Option<Listing>, StoreError> {
        Ok(self.0.read().await.iter().find(|l| l.id == id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.0.write().await.retain(|l| l.id != id);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(name: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), json!(name));
        fields
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let store = MemoryStore::new();
        let a = store.insert(doc("a")).await.unwrap();
        let b = store.insert(doc("b")).await.unwrap();

        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = MemoryStore::new();
        store.insert(doc("first")).await.unwrap();
        store.insert(doc("second")).await.unwrap();

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.fields["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("first"), json!("second")]);
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let store = MemoryStore::new();
        let listing = store.insert(doc("a")).await.unwrap();

        assert_eq!(store.get(&listing.id).await.unwrap(), Some(listing.clone()));
        store.delete(&listing.id).await.unwrap();
        assert_eq!(store.get(&listing.id).await.unwrap(), None);
        assert!(store.is_empty().await);
    }
}
