use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Untyped JSON object exchanged with the carrier. Only `id`, `tracking_number`,
/// `label` and `labels` are ever read by name; everything else passes through.
pub type CarrierPayload = Map<String, Value>;

/// Order reference sent to the carrier, kept in whatever shape the host used
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OrderNumber {
    Number(i64),
    Text(String),
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderNumber::Number(n) => write!(f, "{}", n),
            OrderNumber::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentItem {
    pub name: String,
    pub quantity: u32,
}

/// Body of `POST /shipments`. Built fresh for every fulfillment, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentRequest {
    pub pickup_point_id: String,
    pub recipient: Recipient,
    pub order_number: OrderNumber,
    pub cod_amount: i64,
    pub items: Vec<ShipmentItem>,
}
