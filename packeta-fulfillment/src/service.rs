use async_trait::async_trait;
use chrono::Utc;
use packeta_client::{PacketaApiClient, PacketaConfig, PacketaOptions};
use packeta_core::models::value_as_id;
use packeta_core::{
    CarrierApi, CarrierPayload, Cart, Fulfillment, FulfillmentRepository, FulfillmentUpdate,
    LineItem, Masked, Order, CANCELLATION_REASON_KEY, SHIPMENT_ID_KEY,
};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::documents::{
    shipment_id_in, FulfillmentDocuments, LabelFormat, ReturnDocuments, RETURN_SHIPMENT_ID_KEY,
};
use crate::error::{
    FulfillmentError, CANCEL_SHIPMENT, CREATE_SHIPMENT, FETCH_PICKUP_POINTS, FETCH_TRACKING,
    GET_DOCUMENTS, GET_LABELS, GET_RETURN_DOCUMENTS,
};
use crate::mapping::shipment_request;
use crate::provider::{
    DocumentType, FulfillmentOption, FulfillmentProvider, ReturnRequest, ShippingMethodData,
    ShippingOptionData,
};

pub const PICKUP_POINT_ID_KEY: &str = "pickup_point_id";
pub const CANCELLATION_REASON: &str = "Canceled by merchant";

/// Packeta fulfillment provider.
///
/// Maps host orders onto carrier shipments and writes the carrier's
/// identifiers back onto the fulfillment record. Each operation touches one
/// fulfillment; nothing is shared between calls.
pub struct PacketaFulfillmentService {
    client: Arc<dyn CarrierApi>,
    fulfillments: Arc<dyn FulfillmentRepository>,
}

impl PacketaFulfillmentService {
    pub const IDENTIFIER: &'static str = "packeta";

    pub fn new(
        client: Arc<dyn CarrierApi>,
        fulfillments: Arc<dyn FulfillmentRepository>,
    ) -> Self {
        Self {
            client,
            fulfillments,
        }
    }

    /// Resolves credentials (explicit options, then `PACKETA_*` env vars) and
    /// builds the HTTP client. Fails here rather than on first use.
    pub fn from_options(
        options: PacketaOptions,
        fulfillments: Arc<dyn FulfillmentRepository>,
    ) -> Result<Self, FulfillmentError> {
        let config = options.resolve()?;
        Self::from_config(&config, fulfillments)
    }

    /// [`from_options`](Self::from_options) against a given set of
    /// `PACKETA_*` variables instead of the process environment
    pub fn from_environment(
        options: PacketaOptions,
        environment: config::Environment,
        fulfillments: Arc<dyn FulfillmentRepository>,
    ) -> Result<Self, FulfillmentError> {
        let config = options.resolve_from(environment)?;
        Self::from_config(&config, fulfillments)
    }

    pub fn from_config(
        config: &PacketaConfig,
        fulfillments: Arc<dyn FulfillmentRepository>,
    ) -> Result<Self, FulfillmentError> {
        let client = PacketaApiClient::new(config)?;
        tracing::info!("Packeta fulfillment provider using {}", config.api_url);
        Ok(Self::new(Arc::new(client), fulfillments))
    }

    /// Tracking history for a shipment, fetched fresh on every call
    pub async fn track_shipment(
        &self,
        tracking_number: &str,
    ) -> Result<CarrierPayload, FulfillmentError> {
        self.client
            .get_shipment_tracking(tracking_number)
            .await
            .map_err(|e| FulfillmentError::orchestration(FETCH_TRACKING, e))
    }

    pub async fn get_pickup_points(&self) -> Result<Vec<CarrierPayload>, FulfillmentError> {
        self.client
            .get_pickup_points()
            .await
            .map_err(|e| FulfillmentError::orchestration(FETCH_PICKUP_POINTS, e))
    }

    /// One base64 PDF with the labels of every listed shipment
    pub async fn get_bulk_shipment_labels(
        &self,
        shipment_ids: &[String],
    ) -> Result<String, FulfillmentError> {
        if shipment_ids.is_empty() {
            return Err(FulfillmentError::validation(
                "At least one Packeta shipment ID is required",
            ));
        }

        self.client
            .get_bulk_shipment_labels(shipment_ids)
            .await
            .map_err(|e| FulfillmentError::orchestration(GET_LABELS, e))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl FulfillmentProvider for PacketaFulfillmentService {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    async fn get_fulfillment_options(&self) -> Vec<FulfillmentOption> {
        vec![FulfillmentOption {
            id: Self::IDENTIFIER.to_string(),
            name: Some("Packeta (Zásilkovna)".to_string()),
        }]
    }

    async fn can_calculate(&self, _option: &ShippingOptionData) -> bool {
        true
    }

    async fn validate_option(&self, _option: &ShippingOptionData) -> bool {
        true
    }

    async fn validate_fulfillment_data(
        &self,
        _option: &ShippingOptionData,
        data: &Map<String, Value>,
        cart: &Cart,
    ) -> Result<Map<String, Value>, FulfillmentError> {
        if data.get(PICKUP_POINT_ID_KEY).and_then(value_as_id).is_none() {
            return Err(FulfillmentError::validation(
                "Pickup point ID is required for Packeta shipment",
            ));
        }

        let address = cart.shipping_address.as_ref();
        let first_name = address.and_then(|a| present(&a.first_name));
        let last_name = address.and_then(|a| present(&a.last_name));
        let (Some(first_name), Some(last_name)) = (first_name, last_name) else {
            return Err(FulfillmentError::validation(
                "Recipient name is required for Packeta shipment",
            ));
        };

        let Some(email) = present(&cart.email) else {
            return Err(FulfillmentError::validation(
                "Recipient email is required for Packeta shipment",
            ));
        };

        let Some(phone) = address.and_then(|a| present(&a.phone)) else {
            return Err(FulfillmentError::validation(
                "Recipient phone number is required for Packeta shipment",
            ));
        };

        let mut validated = data.clone();
        validated.insert("validated".to_string(), Value::Bool(true));
        validated.insert(
            "recipient_name".to_string(),
            Value::from(format!("{} {}", first_name, last_name)),
        );
        validated.insert("recipient_email".to_string(), Value::from(email));
        validated.insert("recipient_phone".to_string(), Value::from(phone));
        Ok(validated)
    }

    async fn create_fulfillment(
        &self,
        data: &ShippingMethodData,
        items: &[LineItem],
        order: &Order,
        fulfillment: &Fulfillment,
    ) -> Result<CarrierPayload, FulfillmentError> {
        if fulfillment.is_canceled() {
            return Err(FulfillmentError::precondition(format!(
                "Fulfillment {} is canceled; create a new fulfillment to ship again",
                fulfillment.id
            )));
        }

        let pickup_point_id = data
            .data
            .get(PICKUP_POINT_ID_KEY)
            .and_then(value_as_id)
            .ok_or_else(|| {
                FulfillmentError::validation("Pickup point ID is required for Packeta shipment")
            })?;

        let request = shipment_request(pickup_point_id, items, order);
        tracing::info!(
            fulfillment_id = %fulfillment.id,
            order_number = %request.order_number,
            recipient = %Masked::new(&request.recipient.name),
            "Creating Packeta shipment"
        );

        let result = self
            .client
            .create_shipment(&request)
            .await
            .map_err(|e| FulfillmentError::orchestration(CREATE_SHIPMENT, e))?;

        if let Some(tracking_number) = result.get("tracking_number").and_then(value_as_id) {
            let mut metadata = fulfillment.metadata.clone();
            match result.get("id").filter(|id| !id.is_null()) {
                Some(shipment_id) => {
                    metadata.insert(SHIPMENT_ID_KEY.to_string(), shipment_id.clone());
                }
                None => tracing::warn!(
                    fulfillment_id = %fulfillment.id,
                    "Packeta shipment created without an id; it cannot be canceled from here"
                ),
            }

            self.fulfillments
                .update(
                    &fulfillment.id,
                    FulfillmentUpdate {
                        tracking_number: Some(tracking_number.clone()),
                        metadata: Some(metadata),
                        ..FulfillmentUpdate::default()
                    },
                )
                .await
                .map_err(|e| FulfillmentError::orchestration(CREATE_SHIPMENT, e))?;

            tracing::info!(
                fulfillment_id = %fulfillment.id,
                tracking_number = %tracking_number,
                "Packeta shipment created"
            );
        } else {
            tracing::warn!(
                fulfillment_id = %fulfillment.id,
                "Packeta shipment created without a tracking number"
            );
        }

        Ok(result)
    }

    async fn cancel_fulfillment(
        &self,
        fulfillment: &Fulfillment,
    ) -> Result<CarrierPayload, FulfillmentError> {
        if fulfillment.is_canceled() {
            return Err(FulfillmentError::precondition(format!(
                "Fulfillment {} is already canceled",
                fulfillment.id
            )));
        }

        let shipment_id = fulfillment.shipment_id().ok_or_else(|| {
            FulfillmentError::precondition("No Packeta shipment ID found in fulfillment metadata")
        })?;

        let result = self
            .client
            .cancel_shipment(&shipment_id)
            .await
            .map_err(|e| FulfillmentError::orchestration(CANCEL_SHIPMENT, e))?;

        let mut metadata = fulfillment.metadata.clone();
        metadata.insert(
            CANCELLATION_REASON_KEY.to_string(),
            Value::from(CANCELLATION_REASON),
        );

        self.fulfillments
            .update(
                &fulfillment.id,
                FulfillmentUpdate {
                    canceled_at: Some(Utc::now()),
                    metadata: Some(metadata),
                    ..FulfillmentUpdate::default()
                },
            )
            .await
            .map_err(|e| FulfillmentError::orchestration(CANCEL_SHIPMENT, e))?;

        tracing::info!(
            fulfillment_id = %fulfillment.id,
            shipment_id = %shipment_id,
            "Packeta shipment canceled"
        );
        Ok(result)
    }

    /// Prices live on the shipping option in the host.
    async fn calculate_price(
        &self,
        _option: &ShippingOptionData,
        _data: &Map<String, Value>,
        _cart: &Cart,
    ) -> Result<i64, FulfillmentError> {
        Ok(0)
    }

    /// Return labels are not issued through this integration yet.
    async fn create_return(
        &self,
        _request: &ReturnRequest,
    ) -> Result<Map<String, Value>, FulfillmentError> {
        Ok(Map::new())
    }

    async fn get_fulfillment_documents(
        &self,
        data: &Map<String, Value>,
    ) -> Result<FulfillmentDocuments, FulfillmentError> {
        let shipment_id = shipment_id_in(data, SHIPMENT_ID_KEY).ok_or_else(|| {
            FulfillmentError::precondition("No Packeta shipment ID found in fulfillment data")
        })?;

        // Independent requests; either failing fails the whole call.
        let (label_pdf, label_zpl) = tokio::try_join!(
            self.client.get_shipment_label(&shipment_id),
            self.client.get_shipment_label_zpl(&shipment_id),
        )
        .map_err(|e| FulfillmentError::orchestration(GET_DOCUMENTS, e))?;

        Ok(FulfillmentDocuments {
            label_pdf,
            label_zpl,
            label_format: LabelFormat::default(),
        })
    }

    async fn get_return_documents(
        &self,
        data: &Map<String, Value>,
    ) -> Result<ReturnDocuments, FulfillmentError> {
        let return_shipment_id = shipment_id_in(data, RETURN_SHIPMENT_ID_KEY).ok_or_else(|| {
            FulfillmentError::precondition(
                "No Packeta return shipment ID found in fulfillment data",
            )
        })?;

        let label_pdf = self
            .client
            .get_shipment_label(&return_shipment_id)
            .await
            .map_err(|e| FulfillmentError::orchestration(GET_RETURN_DOCUMENTS, e))?;

        Ok(ReturnDocuments { label_pdf })
    }

    async fn get_shipment_documents(
        &self,
        _data: &Map<String, Value>,
    ) -> Result<Map<String, Value>, FulfillmentError> {
        Ok(Map::new())
    }

    async fn retrieve_documents(
        &self,
        _fulfillment_data: &Map<String, Value>,
        _document_type: DocumentType,
    ) -> Result<Map<String, Value>, FulfillmentError> {
        Ok(Map::new())
    }
}
