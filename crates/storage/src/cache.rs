use domain::Collection;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::traits::KeyValueStore;

#[derive(Clone)]
pub struct SnapshotCache {
    store: Arc<dyn KeyValueStore>,
}

impl SnapshotCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn store<E: Serialize>(
        &self,
        collection: Collection,
        entities: &[E],
    ) -> anyhow::Result<()> {
        let json = serde_json::to_string(entities)?;
        self.store.set(collection.as_str(), &json).await
    }

    pub async fn load<E: DeserializeOwned>(&self, collection: Collection) -> Vec<E> {
        let raw = match self.store.get(collection.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read {} snapshot: {:?}", collection, e);
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Discarding malformed {} snapshot: {}", collection, e);
            Vec::new()
        })
    }
}
