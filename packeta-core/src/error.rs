use serde_json::Value;

/// Literal tag every carrier failure message starts with
pub const CARRIER_ERROR_TAG: &str = "Packeta API Error";

/// Message used when neither the carrier nor the transport said anything useful
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// The single error kind produced by the carrier client.
///
/// Rendered as `"Packeta API Error: <message>"` regardless of whether the
/// failure came from the network, an HTTP status or an undecodable body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Packeta API Error: {message}")]
pub struct CarrierError {
    message: String,
    status: Option<u16>,
}

impl CarrierError {
    /// Wraps a message, substituting [`UNKNOWN_ERROR`] for an empty one
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: if message.trim().is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                message
            },
            status: None,
        }
    }

    /// Failure before any HTTP response was received (connect, TLS, timeout, decode)
    pub fn transport(error: &dyn std::error::Error) -> Self {
        Self::new(error.to_string())
    }

    /// Non-success HTTP response. Prefers the carrier's structured `message`,
    /// otherwise uses the generic status line the way HTTP clients report it.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .as_ref()
            .and_then(carrier_message)
            .unwrap_or_else(|| format!("Request failed with status code {}", status));

        Self {
            status: Some(status),
            ..Self::new(message)
        }
    }

    /// Message without the tag
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

fn carrier_message(payload: &Value) -> Option<String> {
    match payload.get("message")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}
