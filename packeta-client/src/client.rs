use async_trait::async_trait;
use packeta_core::{CarrierApi, CarrierError, CarrierOperation, CarrierPayload, ShipmentRequest};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{ConfigurationError, PacketaConfig};

#[derive(Deserialize)]
struct LabelResponse {
    label: String,
}

#[derive(Deserialize)]
struct BulkLabelResponse {
    labels: String,
}

#[derive(Serialize)]
struct BulkLabelRequest<'a> {
    ids: &'a [String],
}

/// reqwest-backed [`CarrierApi`].
///
/// Auth and content-type headers are fixed at construction. Cloning is cheap
/// and shares the connection pool.
#[derive(Debug, Clone)]
pub struct PacketaApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PacketaApiClient {
    pub fn new(config: &PacketaConfig) -> Result<Self, ConfigurationError> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose()))
            .map_err(|_| ConfigurationError::InvalidApiKey)?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
        })
    }

    /// Appends path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CarrierError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                CarrierError::new(format!("{} cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, CarrierError> {
        Ok(self.http.request(method, self.endpoint(segments)?))
    }

    /// Sends one request and decodes the body. No retries.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: CarrierOperation,
        request: RequestBuilder,
    ) -> Result<T, CarrierError> {
        tracing::debug!(operation = %operation, "Calling Packeta API");

        let response = request
            .send()
            .await
            .map_err(|e| failed(operation, CarrierError::transport(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = CarrierError::from_response(status.as_u16(), &body);
            return Err(failed(operation, error));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| failed(operation, CarrierError::transport(&e)))?;

        // 204 / empty body decodes as an empty object
        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &bytes
        };

        serde_json::from_slice(body).map_err(|e| failed(operation, CarrierError::transport(&e)))
    }
}

fn failed(operation: CarrierOperation, error: CarrierError) -> CarrierError {
    tracing::warn!(
        operation = %operation,
        status = ?error.status(),
        "Packeta API call failed: {}",
        error.message()
    );
    error
}

#[async_trait]
impl CarrierApi for PacketaApiClient {
    async fn create_shipment(
        &self,
        request: &ShipmentRequest,
    ) -> Result<CarrierPayload, CarrierError> {
        let builder = self.request(Method::POST, &["shipments"])?.json(request);
        self.execute(CarrierOperation::CreateShipment, builder).await
    }

    async fn cancel_shipment(&self, shipment_id: &str) -> Result<CarrierPayload, CarrierError> {
        let builder = self.request(Method::DELETE, &["shipments", shipment_id])?;
        self.execute(CarrierOperation::CancelShipment, builder).await
    }

    async fn get_pickup_points(&self) -> Result<Vec<CarrierPayload>, CarrierError> {
        let builder = self.request(Method::GET, &["pickup-points"])?;
        self.execute(CarrierOperation::GetPickupPoints, builder)
            .await
    }

    async fn get_shipment_tracking(
        &self,
        tracking_number: &str,
    ) -> Result<CarrierPayload, CarrierError> {
        let segments = ["shipments", tracking_number, "tracking"];
        let builder = self.request(Method::GET, &segments)?;
        self.execute(CarrierOperation::GetShipmentTracking, builder)
            .await
    }

    async fn get_shipment_label(&self, shipment_id: &str) -> Result<String, CarrierError> {
        let builder = self.request(Method::GET, &["shipments", shipment_id, "label"])?;
        let response: LabelResponse = self
            .execute(CarrierOperation::GetShipmentLabel, builder)
            .await?;
        Ok(response.label)
    }

    async fn get_bulk_shipment_labels(
        &self,
        shipment_ids: &[String],
    ) -> Result<String, CarrierError> {
        let builder = self
            .request(Method::POST, &["shipments", "labels"])?
            .json(&BulkLabelRequest { ids: shipment_ids });
        let response: BulkLabelResponse = self
            .execute(CarrierOperation::GetBulkShipmentLabels, builder)
            .await?;
        Ok(response.labels)
    }

    async fn get_shipment_label_zpl(&self, shipment_id: &str) -> Result<String, CarrierError> {
        let segments = ["shipments", shipment_id, "label", "zpl"];
        let builder = self.request(Method::GET, &segments)?;
        let response: LabelResponse = self
            .execute(CarrierOperation::GetShipmentLabelZpl, builder)
            .await?;
        Ok(response.label)
    }
}
