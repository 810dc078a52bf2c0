use chrono::{DateTime, Utc};
use serde::de::{Error as _, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::shipment::OrderNumber;
use crate::SHIPMENT_ID_KEY;

/// Payment status of a host order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    NotPaid,
    Awaiting,
    Captured,
    PartiallyRefunded,
    Refunded,
    Canceled,
    RequiresAction,
}

/// Shipping address as the host pipeline stores it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Address {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address_1: Option<String>,
    #[serde(default)]
    pub address_2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl Address {
    /// "first last", trimmed; missing parts collapse to nothing
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Cart {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub display_id: Option<OrderNumber>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Order total in minor units
    #[serde(default, deserialize_with = "amount_from_number_like")]
    pub total: i64,
}

impl Order {
    /// Display id when the host assigned one, raw id otherwise
    pub fn order_number(&self) -> OrderNumber {
        self.display_id
            .clone()
            .unwrap_or_else(|| OrderNumber::Text(self.id.clone()))
    }

    /// Cash to collect on delivery: the full total for unpaid orders, nothing otherwise
    pub fn cod_amount(&self) -> i64 {
        if self.payment_status == PaymentStatus::NotPaid {
            self.total
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LineItem {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "count_from_number_like")]
    pub quantity: Option<u32>,
}

/// Where a fulfillment sits in the carrier lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentState {
    Pending,
    Tracked,
    Canceled,
}

/// Fulfillment record owned by the host pipeline. Never deleted here;
/// cancellation only stamps `canceled_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Fulfillment {
    pub id: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub canceled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Fulfillment {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn state(&self) -> FulfillmentState {
        if self.canceled_at.is_some() {
            FulfillmentState::Canceled
        } else if self.tracking_number.is_some() {
            FulfillmentState::Tracked
        } else {
            FulfillmentState::Pending
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled_at.is_some()
    }

    /// Carrier shipment id stored under `metadata.packeta_shipment_id`
    pub fn shipment_id(&self) -> Option<String> {
        value_as_id(self.metadata.get(SHIPMENT_ID_KEY)?)
    }
}

/// Hosts send numeric fields as JSON numbers or as numeric strings
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl NumberLike {
    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            NumberLike::Int(n) => *n as f64,
            NumberLike::Float(f) => *f,
            NumberLike::Text(s) => s.trim().parse().ok()?,
            NumberLike::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

/// Item count; anything that is not a non-negative number reads as absent
fn count_from_number_like<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberLike>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(NumberLike::as_f64)
        .filter(|q| *q >= 0.0 && *q <= f64::from(u32::MAX))
        .map(|q| q.trunc() as u32))
}

/// Money in minor units; fractional input is rounded, null reads as zero
fn amount_from_number_like<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberLike>::deserialize(deserializer)? {
        None => Ok(0),
        Some(NumberLike::Int(n)) => Ok(n),
        Some(NumberLike::Text(s)) if s.trim().parse::<i64>().is_ok() => {
            s.trim().parse().map_err(D::Error::custom)
        }
        Some(other) => other
            .as_f64()
            .map(|amount| amount.round() as i64)
            .ok_or_else(|| D::Error::custom("expected a numeric amount")),
    }
}

/// Reads an identifier that the carrier or host may have stored as a string or a number.
/// Empty strings count as absent.
pub fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
