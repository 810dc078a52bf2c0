pub mod carrier;
pub mod error;
pub mod mock;
pub mod models;
pub mod pii;
pub mod repository;
pub mod shipment;

pub use carrier::{CarrierApi, CarrierOperation};
pub use error::CarrierError;
pub use mock::{CarrierCall, MockCarrierApi};
pub use models::{Address, Cart, Fulfillment, FulfillmentState, LineItem, Order, PaymentStatus};
pub use pii::Masked;
pub use repository::{FulfillmentRepository, FulfillmentUpdate, RepositoryError};
pub use shipment::{CarrierPayload, OrderNumber, Recipient, ShipmentItem, ShipmentRequest};

/// Metadata key under which the carrier shipment id is stored on a fulfillment.
pub const SHIPMENT_ID_KEY: &str = "packeta_shipment_id";

/// Metadata key holding the reason written when a shipment is canceled.
pub const CANCELLATION_REASON_KEY: &str = "cancellation_reason";
