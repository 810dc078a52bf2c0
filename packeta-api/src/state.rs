use packeta_fulfillment::PacketaFulfillmentService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub fulfillment: Arc<PacketaFulfillmentService>,
}

impl AppState {
    pub fn new(fulfillment: Arc<PacketaFulfillmentService>) -> Self {
        Self { fulfillment }
    }
}
