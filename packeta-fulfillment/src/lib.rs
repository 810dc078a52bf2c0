pub mod documents;
pub mod error;
pub mod mapping;
pub mod provider;
pub mod service;

pub use documents::{FulfillmentDocuments, LabelFormat, ReturnDocuments};
pub use error::FulfillmentError;
pub use provider::{
    DocumentType, FulfillmentOption, FulfillmentProvider, ReturnRequest, ShippingMethodData,
    ShippingOptionData,
};
pub use service::PacketaFulfillmentService;
