use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use packeta_api::{app, AppState};
use packeta_core::{CarrierCall, CarrierError, CarrierOperation, MockCarrierApi};
use packeta_fulfillment::PacketaFulfillmentService;
use packeta_store::InMemoryFulfillmentRepository;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app(carrier: MockCarrierApi) -> (axum::Router, Arc<MockCarrierApi>) {
    let carrier = Arc::new(carrier);
    let fulfillments = Arc::new(InMemoryFulfillmentRepository::new());
    let service = PacketaFulfillmentService::new(carrier.clone(), fulfillments);
    (app(AppState::new(Arc::new(service))), carrier)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_pickup_points_listing() {
    let point = json!({ "id": "PP1", "name": "Pickup Point 1", "address": { "city": "Brno" } });
    let (app, carrier) = test_app(
        MockCarrierApi::new().with_response(CarrierOperation::GetPickupPoints, json!([point])),
    );

    let (status, body) = get(app, "/store/packeta/pickup-points").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "pickup_points": [point] }));
    assert_eq!(carrier.calls(), vec![CarrierCall::GetPickupPoints]);
}

#[tokio::test]
async fn test_pickup_points_failure_is_500_with_message() {
    let (app, _) = test_app(MockCarrierApi::new().with_error(
        CarrierOperation::GetPickupPoints,
        CarrierError::new("Service down"),
    ));

    let (status, body) = get(app, "/store/packeta/pickup-points").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["message"],
        "Error fetching pickup points: Failed to fetch Packeta pickup points: \
         Packeta API Error: Service down"
    );
}

#[tokio::test]
async fn test_tracking_lookup() {
    let (app, carrier) = test_app(MockCarrierApi::new().with_response(
        CarrierOperation::GetShipmentTracking,
        json!({ "status": "delivered", "history": [] }),
    ));

    let (status, body) = get(app, "/store/packeta/tracking/TRACK123").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "tracking": { "status": "delivered", "history": [] } })
    );
    assert_eq!(
        carrier.calls(),
        vec![CarrierCall::GetShipmentTracking("TRACK123".into())]
    );
}

#[tokio::test]
async fn test_tracking_without_number_is_400() {
    let uris = [
        "/store/packeta/tracking",
        "/store/packeta/tracking/",
        "/store/packeta/tracking/%20",
    ];

    for uri in uris {
        let (app, carrier) = test_app(MockCarrierApi::new());

        let (status, body) = get(app, uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body, json!({ "message": "Tracking number is required" }));
        assert!(carrier.calls().is_empty());
    }
}

#[tokio::test]
async fn test_tracking_failure_is_500_with_message() {
    let (app, _) = test_app(MockCarrierApi::new().with_error(
        CarrierOperation::GetShipmentTracking,
        CarrierError::from_response(404, r#"{"message":"Shipment not found"}"#),
    ));

    let (status, body) = get(app, "/store/packeta/tracking/NOPE").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["message"],
        "Error fetching tracking info: Failed to fetch Packeta tracking info: \
         Packeta API Error: Shipment not found"
    );
}
