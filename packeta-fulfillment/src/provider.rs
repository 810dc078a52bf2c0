use async_trait::async_trait;
use packeta_core::{Cart, CarrierPayload, Fulfillment, LineItem, Order};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::documents::{FulfillmentDocuments, ReturnDocuments};
use crate::error::FulfillmentError;

/// A shipping option a provider offers to the host pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FulfillmentOption {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ShippingOptionData {
    pub id: String,
    #[serde(default)]
    pub profile_id: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// Shipping method chosen at checkout, carrying provider data such as the pickup point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ShippingMethodData {
    #[serde(default)]
    pub shipping_option: ShippingOptionData,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnRequest {
    pub order: Order,
    #[serde(default)]
    pub shipping_method: Option<ShippingMethodData>,
    #[serde(default)]
    pub shipping_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Invoice,
    Label,
}

/// Fulfillment lifecycle contract the host pipeline calls through.
///
/// Validation and precondition failures are raised before any carrier call.
/// Carrier failures surface as [`FulfillmentError::Orchestration`].
#[async_trait]
pub trait FulfillmentProvider: Send + Sync {
    fn identifier(&self) -> &'static str;

    async fn get_fulfillment_options(&self) -> Vec<FulfillmentOption>;

    async fn can_calculate(&self, option: &ShippingOptionData) -> bool;

    async fn validate_option(&self, option: &ShippingOptionData) -> bool;

    async fn validate_fulfillment_data(
        &self,
        option: &ShippingOptionData,
        data: &Map<String, Value>,
        cart: &Cart,
    ) -> Result<Map<String, Value>, FulfillmentError>;

    async fn create_fulfillment(
        &self,
        data: &ShippingMethodData,
        items: &[LineItem],
        order: &Order,
        fulfillment: &Fulfillment,
    ) -> Result<CarrierPayload, FulfillmentError>;

    async fn cancel_fulfillment(
        &self,
        fulfillment: &Fulfillment,
    ) -> Result<CarrierPayload, FulfillmentError>;

    async fn calculate_price(
        &self,
        option: &ShippingOptionData,
        data: &Map<String, Value>,
        cart: &Cart,
    ) -> Result<i64, FulfillmentError>;

    async fn create_return(
        &self,
        request: &ReturnRequest,
    ) -> Result<Map<String, Value>, FulfillmentError>;

    async fn get_fulfillment_documents(
        &self,
        data: &Map<String, Value>,
    ) -> Result<FulfillmentDocuments, FulfillmentError>;

    async fn get_return_documents(
        &self,
        data: &Map<String, Value>,
    ) -> Result<ReturnDocuments, FulfillmentError>;

    async fn get_shipment_documents(
        &self,
        data: &Map<String, Value>,
    ) -> Result<Map<String, Value>, FulfillmentError>;

    async fn retrieve_documents(
        &self,
        fulfillment_data: &Map<String, Value>,
        document_type: DocumentType,
    ) -> Result<Map<String, Value>, FulfillmentError>;
}
