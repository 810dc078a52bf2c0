use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::carrier::{CarrierApi, CarrierOperation};
use crate::error::CarrierError;
use crate::shipment::{CarrierPayload, ShipmentRequest};

/// A request the mock carrier received, with its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum CarrierCall {
    CreateShipment(ShipmentRequest),
    CancelShipment(String),
    GetPickupPoints,
    GetShipmentTracking(String),
    GetShipmentLabel(String),
    GetBulkShipmentLabels(Vec<String>),
    GetShipmentLabelZpl(String),
}

impl CarrierCall {
    pub fn operation(&self) -> CarrierOperation {
        match self {
            CarrierCall::CreateShipment(_) => CarrierOperation::CreateShipment,
            CarrierCall::CancelShipment(_) => CarrierOperation::CancelShipment,
            CarrierCall::GetPickupPoints => CarrierOperation::GetPickupPoints,
            CarrierCall::GetShipmentTracking(_) => CarrierOperation::GetShipmentTracking,
            CarrierCall::GetShipmentLabel(_) => CarrierOperation::GetShipmentLabel,
            CarrierCall::GetBulkShipmentLabels(_) => CarrierOperation::GetBulkShipmentLabels,
            CarrierCall::GetShipmentLabelZpl(_) => CarrierOperation::GetShipmentLabelZpl,
        }
    }
}

/// In-process carrier for exercising orchestration without a network.
///
/// Responses are scripted per operation; an operation without a script fails
/// with a [`CarrierError`]. Every call is logged, including failed ones.
#[derive(Default)]
pub struct MockCarrierApi {
    responses: Mutex<HashMap<CarrierOperation, Result<Value, CarrierError>>>,
    calls: Mutex<Vec<CarrierCall>>,
}

impl MockCarrierApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful JSON response for an operation
    pub fn with_response(self, operation: CarrierOperation, body: Value) -> Self {
        lock(&self.responses).insert(operation, Ok(body));
        self
    }

    /// Script a failure for an operation
    pub fn with_error(self, operation: CarrierOperation, error: CarrierError) -> Self {
        lock(&self.responses).insert(operation, Err(error));
        self
    }

    pub fn calls(&self) -> Vec<CarrierCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, operation: CarrierOperation) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    fn reply<T: DeserializeOwned>(&self, call: CarrierCall) -> Result<T, CarrierError> {
        let operation = call.operation();
        lock(&self.calls).push(call);

        let scripted = lock(&self.responses).get(&operation).cloned();
        let body = scripted.unwrap_or_else(|| Err(unscripted(operation)))?;

        serde_json::from_value(body).map_err(|e| CarrierError::transport(&e))
    }
}

fn unscripted(operation: CarrierOperation) -> CarrierError {
    CarrierError::new(format!("no mock response for {}", operation))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl CarrierApi for MockCarrierApi {
    async fn create_shipment(
        &self,
        request: &ShipmentRequest,
    ) -> Result<CarrierPayload, CarrierError> {
        self.reply(CarrierCall::CreateShipment(request.clone()))
    }

    async fn cancel_shipment(&self, shipment_id: &str) -> Result<CarrierPayload, CarrierError> {
        self.reply(CarrierCall::CancelShipment(shipment_id.to_string()))
    }

    async fn get_pickup_points(&self) -> Result<Vec<CarrierPayload>, CarrierError> {
        self.reply(CarrierCall::GetPickupPoints)
    }

    async fn get_shipment_tracking(
        &self,
        tracking_number: &str,
    ) -> Result<CarrierPayload, CarrierError> {
        self.reply(CarrierCall::GetShipmentTracking(
            tracking_number.to_string(),
        ))
    }

    async fn get_shipment_label(&self, shipment_id: &str) -> Result<String, CarrierError> {
        self.reply(CarrierCall::GetShipmentLabel(shipment_id.to_string()))
    }

    async fn get_bulk_shipment_labels(
        &self,
        shipment_ids: &[String],
    ) -> Result<String, CarrierError> {
        self.reply(CarrierCall::GetBulkShipmentLabels(shipment_ids.to_vec()))
    }

    async fn get_shipment_label_zpl(&self, shipment_id: &str) -> Result<String, CarrierError> {
        self.reply(CarrierCall::GetShipmentLabelZpl(shipment_id.to_string()))
    }
}
