use async_trait::async_trait;
use std::fmt;

use crate::error::CarrierError;
use crate::shipment::{CarrierPayload, ShipmentRequest};

/// One logical carrier call. Each maps to exactly one HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarrierOperation {
    CreateShipment,
    CancelShipment,
    GetPickupPoints,
    GetShipmentTracking,
    GetShipmentLabel,
    GetBulkShipmentLabels,
    GetShipmentLabelZpl,
}

impl CarrierOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarrierOperation::CreateShipment => "create_shipment",
            CarrierOperation::CancelShipment => "cancel_shipment",
            CarrierOperation::GetPickupPoints => "get_pickup_points",
            CarrierOperation::GetShipmentTracking => "get_shipment_tracking",
            CarrierOperation::GetShipmentLabel => "get_shipment_label",
            CarrierOperation::GetBulkShipmentLabels => "get_bulk_shipment_labels",
            CarrierOperation::GetShipmentLabelZpl => "get_shipment_label_zpl",
        }
    }
}

impl fmt::Display for CarrierOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport to the carrier REST API.
///
/// Single attempt per call: implementations must not retry, cache or
/// memoize. Every failure is reported as a [`CarrierError`].
#[async_trait]
pub trait CarrierApi: Send + Sync {
    /// `POST /shipments`
    async fn create_shipment(
        &self,
        request: &ShipmentRequest,
    ) -> Result<CarrierPayload, CarrierError>;

    /// `DELETE /shipments/{id}`
    async fn cancel_shipment(&self, shipment_id: &str) -> Result<CarrierPayload, CarrierError>;

    /// `GET /pickup-points`
    async fn get_pickup_points(&self) -> Result<Vec<CarrierPayload>, CarrierError>;

    /// `GET /shipments/{tracking}/tracking`
    async fn get_shipment_tracking(
        &self,
        tracking_number: &str,
    ) -> Result<CarrierPayload, CarrierError>;

    /// `GET /shipments/{id}/label`, base64 PDF
    async fn get_shipment_label(&self, shipment_id: &str) -> Result<String, CarrierError>;

    /// `POST /shipments/labels`, one base64 PDF holding every label
    async fn get_bulk_shipment_labels(
        &self,
        shipment_ids: &[String],
    ) -> Result<String, CarrierError>;

    /// `GET /shipments/{id}/label/zpl`, XML-escaped ZPL
    async fn get_shipment_label_zpl(&self, shipment_id: &str) -> Result<String, CarrierError>;
}
