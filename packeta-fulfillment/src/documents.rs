use packeta_core::models::value_as_id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the return shipment id in return fulfillment data
pub const RETURN_SHIPMENT_ID_KEY: &str = "packeta_return_shipment_id";

/// Encoding of each label variant handed back to the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelFormat {
    pub pdf: String,
    pub zpl: String,
}

impl Default for LabelFormat {
    fn default() -> Self {
        Self {
            pdf: "base64".to_string(),
            zpl: "xml_escaped".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FulfillmentDocuments {
    /// Base64 PDF
    pub label_pdf: String,
    /// XML-escaped ZPL; see `packeta_client::zpl::unescape_xml`
    pub label_zpl: String,
    pub label_format: LabelFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnDocuments {
    /// Base64 PDF
    pub label_pdf: String,
}

/// Looks `key` up at the top level of `data`, then under `data.metadata`
pub fn shipment_id_in(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key)
        .and_then(value_as_id)
        .or_else(|| data.get("metadata")?.get(key).and_then(value_as_id))
}
