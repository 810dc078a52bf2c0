use async_trait::async_trait;
use packeta_core::{Fulfillment, FulfillmentRepository, FulfillmentUpdate, RepositoryError};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Fulfillment not found: {0}")]
    NotFound(String),
}

/// Process-local fulfillment store.
///
/// Each update runs under a single write lock, so readers see either the
/// record before the update or after all of it.
#[derive(Default)]
pub struct InMemoryFulfillmentRepository {
    records: RwLock<HashMap<String, Fulfillment>>,
}

impl InMemoryFulfillmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, fulfillment: Fulfillment) {
        self.records
            .write()
            .await
            .insert(fulfillment.id.clone(), fulfillment);
    }

    pub async fn get(&self, id: &str) -> Option<Fulfillment> {
        self.records.read().await.get(id).cloned()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl FulfillmentRepository for InMemoryFulfillmentRepository {
    async fn update(&self, id: &str, update: FulfillmentUpdate) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(tracking_number) = update.tracking_number {
            record.tracking_number = Some(tracking_number);
        }
        if let Some(canceled_at) = update.canceled_at {
            record.canceled_at = Some(canceled_at);
        }
        if let Some(metadata) = update.metadata {
            record.metadata = metadata;
        }

        tracing::debug!(fulfillment_id = %id, state = ?record.state(), "Fulfillment updated");
        Ok(())
    }
}
