use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub type RepositoryError = Box<dyn std::error::Error + Send + Sync>;

/// Fields to write on a fulfillment record. `None` leaves a field untouched;
/// `metadata` replaces the whole map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FulfillmentUpdate {
    pub tracking_number: Option<String>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub metadata: Option<Map<String, Value>>,
}

/// Persistence owned by the host pipeline.
///
/// `update` is one atomic transaction: either every field in the update is
/// written or none is.
#[async_trait]
pub trait FulfillmentRepository: Send + Sync {
    async fn update(&self, id: &str, update: FulfillmentUpdate) -> Result<(), RepositoryError>;
}
