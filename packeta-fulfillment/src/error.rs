use packeta_client::ConfigurationError;
use std::fmt;

use packeta_core::error::UNKNOWN_ERROR;

pub const CREATE_SHIPMENT: &str = "Failed to create Packeta shipment";
pub const CANCEL_SHIPMENT: &str = "Failed to cancel Packeta shipment";
pub const GET_DOCUMENTS: &str = "Failed to get Packeta documents";
pub const GET_RETURN_DOCUMENTS: &str = "Failed to get Packeta return documents";
pub const GET_LABELS: &str = "Failed to get Packeta labels";
pub const FETCH_TRACKING: &str = "Failed to fetch Packeta tracking info";
pub const FETCH_PICKUP_POINTS: &str = "Failed to fetch Packeta pickup points";

#[derive(Debug, thiserror::Error)]
pub enum FulfillmentError {
    /// Credentials or URL could not be resolved; the service was never built.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Input rejected before any carrier call.
    #[error("{0}")]
    Validation(String),

    /// The fulfillment is not in a state the operation needs. No carrier call was made.
    #[error("{0}")]
    Precondition(String),

    /// A carrier call or the persistence step behind it failed.
    #[error("{context}: {message}")]
    Orchestration {
        context: &'static str,
        message: String,
    },
}

impl FulfillmentError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Wraps an underlying failure under an operation prefix
    pub fn orchestration(context: &'static str, cause: impl fmt::Display) -> Self {
        let message = cause.to_string();
        let message = if message.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        };

        tracing::error!("{}: {}", context, message);
        Self::Orchestration { context, message }
    }
}
