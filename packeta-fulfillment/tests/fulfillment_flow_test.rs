//! End-to-end fulfillment flows: host objects in, carrier calls out,
//! identifiers persisted back onto the fulfillment record.

use packeta_client::{PacketaApiClient, PacketaConfig};
use packeta_core::{
    Address, CarrierCall, CarrierError, CarrierOperation, Fulfillment, FulfillmentState, LineItem,
    MockCarrierApi, Order, OrderNumber, PaymentStatus, Recipient, ShipmentItem, ShipmentRequest,
};
use packeta_fulfillment::{
    FulfillmentError, FulfillmentProvider, PacketaFulfillmentService, ShippingMethodData,
};
use packeta_store::InMemoryFulfillmentRepository;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn order() -> Order {
    serde_json::from_value(json!({
        "id": "order_01",
        "display_id": "1001",
        "email": "a@b.com",
        "shipping_address": { "first_name": "A", "last_name": "B", "phone": "+1" },
        "payment_status": "not_paid",
        "total": 42
    }))
    .unwrap()
}

fn items() -> Vec<LineItem> {
    vec![LineItem {
        id: "item_1".into(),
        title: Some("Widget".into()),
        quantity: Some(2),
    }]
}

fn method_data() -> ShippingMethodData {
    ShippingMethodData {
        data: json!({ "pickup_point_id": "PP123" }).as_object().cloned().unwrap(),
        ..ShippingMethodData::default()
    }
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

struct Harness {
    service: PacketaFulfillmentService,
    carrier: Arc<MockCarrierApi>,
    repo: Arc<InMemoryFulfillmentRepository>,
}

async fn harness(carrier: MockCarrierApi, fulfillment: Fulfillment) -> Harness {
    let carrier = Arc::new(carrier);
    let repo = Arc::new(InMemoryFulfillmentRepository::new());
    repo.insert(fulfillment).await;
    Harness {
        service: PacketaFulfillmentService::new(carrier.clone(), repo.clone()),
        carrier,
        repo,
    }
}

#[tokio::test]
async fn create_fulfillment_builds_request_and_persists_identifiers() {
    let mut fulfillment = Fulfillment::new("ful_1");
    fulfillment.metadata.insert("source".into(), json!("storefront"));

    let h = harness(
        MockCarrierApi::new().with_response(
            CarrierOperation::CreateShipment,
            json!({ "id": "123", "tracking_number": "TRACK123", "barcode": "Z123" }),
        ),
        fulfillment.clone(),
    )
    .await;

    let result = h
        .service
        .create_fulfillment(&method_data(), &items(), &order(), &fulfillment)
        .await
        .unwrap();

    // Raw carrier result comes back unchanged
    assert_eq!(
        Value::Object(result),
        json!({ "id": "123", "tracking_number": "TRACK123", "barcode": "Z123" })
    );

    assert_eq!(
        h.carrier.calls(),
        vec![CarrierCall::CreateShipment(ShipmentRequest {
            pickup_point_id: "PP123".into(),
            recipient: Recipient {
                name: "A B".into(),
                email: Some("a@b.com".into()),
                phone: Some("+1".into()),
            },
            order_number: OrderNumber::Text("1001".into()),
            cod_amount: 42,
            items: vec![ShipmentItem {
                name: "Widget".into(),
                quantity: 2,
            }],
        })]
    );

    let stored = h.repo.get("ful_1").await.unwrap();
    assert_eq!(stored.tracking_number.as_deref(), Some("TRACK123"));
    assert_eq!(stored.metadata["packeta_shipment_id"], "123");
    assert_eq!(stored.metadata["source"], "storefront");
    assert_eq!(stored.state(), FulfillmentState::Tracked);
}

#[tokio::test]
async fn create_fulfillment_failure_leaves_record_untouched() {
    let fulfillment = Fulfillment::new("ful_1");
    let h = harness(
        MockCarrierApi::new().with_error(
            CarrierOperation::CreateShipment,
            CarrierError::from_response(400, r#"{"message":"API Error"}"#),
        ),
        fulfillment.clone(),
    )
    .await;

    let err = h
        .service
        .create_fulfillment(&method_data(), &items(), &order(), &fulfillment)
        .await
        .unwrap_err();

    assert!(matches!(err, FulfillmentError::Orchestration { .. }));
    assert_eq!(
        err.to_string(),
        "Failed to create Packeta shipment: Packeta API Error: API Error"
    );
    assert_eq!(h.repo.get("ful_1").await.unwrap(), fulfillment);
}

#[tokio::test]
async fn create_fulfillment_reports_persistence_failure() {
    // Record was never handed to the repository.
    let carrier = Arc::new(MockCarrierApi::new().with_response(
        CarrierOperation::CreateShipment,
        json!({ "id": "123", "tracking_number": "TRACK123" }),
    ));
    let repo = Arc::new(InMemoryFulfillmentRepository::new());
    let service = PacketaFulfillmentService::new(carrier, repo);
    let ghost = Fulfillment::new("ghost");

    let err = service
        .create_fulfillment(&method_data(), &items(), &order(), &ghost)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to create Packeta shipment: Fulfillment not found: ghost"
    );
}

#[tokio::test]
async fn full_lifecycle_pending_tracked_canceled() {
    let h = harness(
        MockCarrierApi::new()
            .with_response(
                CarrierOperation::CreateShipment,
                json!({ "id": "123", "tracking_number": "TRACK123" }),
            )
            .with_response(
                CarrierOperation::CancelShipment,
                json!({ "status": "cancelled" }),
            ),
        Fulfillment::new("ful_1"),
    )
    .await;

    let pending = h.repo.get("ful_1").await.unwrap();
    assert_eq!(pending.state(), FulfillmentState::Pending);

    h.service
        .create_fulfillment(&method_data(), &items(), &order(), &pending)
        .await
        .unwrap();

    let tracked = h.repo.get("ful_1").await.unwrap();
    assert_eq!(tracked.state(), FulfillmentState::Tracked);

    let result = h.service.cancel_fulfillment(&tracked).await.unwrap();
    assert_eq!(result["status"], "cancelled");
    assert_eq!(
        h.carrier.calls().last(),
        Some(&CarrierCall::CancelShipment("123".into()))
    );

    let canceled = h.repo.get("ful_1").await.unwrap();
    assert_eq!(canceled.state(), FulfillmentState::Canceled);
    assert!(canceled.canceled_at.is_some());
    assert_eq!(
        canceled.metadata["cancellation_reason"],
        "Canceled by merchant"
    );
    assert_eq!(canceled.metadata["packeta_shipment_id"], "123");
    assert_eq!(canceled.tracking_number.as_deref(), Some("TRACK123"));

    // No re-create after cancel
    let err = h
        .service
        .create_fulfillment(&method_data(), &items(), &order(), &canceled)
        .await
        .unwrap_err();
    assert!(matches!(err, FulfillmentError::Precondition(_)));
    assert_eq!(h.carrier.call_count(CarrierOperation::CreateShipment), 1);
}

#[tokio::test]
async fn fulfillment_documents_fetch_both_labels() {
    let h = harness(
        MockCarrierApi::new()
            .with_response(CarrierOperation::GetShipmentLabel, json!("base64str"))
            .with_response(CarrierOperation::GetShipmentLabelZpl, json!("^XA&lt;^XZ")),
        Fulfillment::new("ful_1"),
    )
    .await;

    let data = object(json!({ "metadata": { "packeta_shipment_id": "123" } }));
    let documents = h
        .service
        .get_fulfillment_documents(&data)
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&documents).unwrap(),
        json!({
            "label_pdf": "base64str",
            "label_zpl": "^XA&lt;^XZ",
            "label_format": { "pdf": "base64", "zpl": "xml_escaped" }
        })
    );
    assert_eq!(h.carrier.call_count(CarrierOperation::GetShipmentLabel), 1);
    assert_eq!(
        h.carrier.call_count(CarrierOperation::GetShipmentLabelZpl),
        1
    );
}

#[tokio::test]
async fn fulfillment_documents_fail_when_either_leg_fails() {
    let h = harness(
        MockCarrierApi::new()
            .with_response(CarrierOperation::GetShipmentLabel, json!("base64str"))
            .with_error(
                CarrierOperation::GetShipmentLabelZpl,
                CarrierError::new("ZPL not available"),
            ),
        Fulfillment::new("ful_1"),
    )
    .await;

    let err = h
        .service
        .get_fulfillment_documents(&object(json!({ "packeta_shipment_id": "123" })))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to get Packeta documents: Packeta API Error: ZPL not available"
    );
}

#[tokio::test]
async fn return_documents_fetch_one_pdf() {
    let h = harness(
        MockCarrierApi::new().with_response(CarrierOperation::GetShipmentLabel, json!("returnpdf")),
        Fulfillment::new("ful_1"),
    )
    .await;

    let documents = h
        .service
        .get_return_documents(&object(json!({ "packeta_return_shipment_id": "R-9" })))
        .await
        .unwrap();

    assert_eq!(documents.label_pdf, "returnpdf");
    assert_eq!(
        h.carrier.calls(),
        vec![CarrierCall::GetShipmentLabel("R-9".into())]
    );
}

#[tokio::test]
async fn tracking_and_pickup_points_use_their_own_prefixes() {
    let h = harness(
        MockCarrierApi::new()
            .with_error(
                CarrierOperation::GetShipmentTracking,
                CarrierError::new("Unknown tracking number"),
            )
            .with_error(
                CarrierOperation::GetPickupPoints,
                CarrierError::new("Service down"),
            ),
        Fulfillment::new("ful_1"),
    )
    .await;

    let err = h.service.track_shipment("NOPE").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to fetch Packeta tracking info: Packeta API Error: Unknown tracking number"
    );

    let err = h.service.get_pickup_points().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to fetch Packeta pickup points: Packeta API Error: Service down"
    );
}

#[tokio::test]
async fn tracking_is_not_memoized() {
    let h = harness(
        MockCarrierApi::new().with_response(
            CarrierOperation::GetShipmentTracking,
            json!({ "status": "in_transit" }),
        ),
        Fulfillment::new("ful_1"),
    )
    .await;

    let first = h.service.track_shipment("TRACK123").await.unwrap();
    let second = h.service.track_shipment("TRACK123").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        h.carrier.call_count(CarrierOperation::GetShipmentTracking),
        2
    );
}

#[tokio::test]
async fn bulk_labels_pass_ids_through() {
    let h = harness(
        MockCarrierApi::new()
            .with_response(CarrierOperation::GetBulkShipmentLabels, json!("bulkpdf")),
        Fulfillment::new("ful_1"),
    )
    .await;

    let ids = vec!["1".to_string(), "2".to_string()];
    let labels = h.service.get_bulk_shipment_labels(&ids).await.unwrap();
    assert_eq!(labels, "bulkpdf");
    assert_eq!(
        h.carrier.calls(),
        vec![CarrierCall::GetBulkShipmentLabels(ids)]
    );
}

// ── Against an HTTP carrier ──────────────────────────────────────────

#[tokio::test]
async fn create_fulfillment_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/shipments"))
        .and(body_json(json!({
            "pickup_point_id": "PP123",
            "recipient": { "name": "A B", "email": "a@b.com", "phone": "+1" },
            "order_number": "1001",
            "cod_amount": 42,
            "items": [{ "name": "Widget", "quantity": 2 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "123",
            "tracking_number": "TRACK123"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let repo = Arc::new(InMemoryFulfillmentRepository::new());
    repo.insert(Fulfillment::new("ful_1")).await;

    let config = PacketaConfig::new("test_key", &mock_server.uri()).unwrap();
    let service = PacketaFulfillmentService::from_config(&config, repo.clone()).unwrap();

    let fulfillment = Fulfillment::new("ful_1");
    service
        .create_fulfillment(&method_data(), &items(), &order(), &fulfillment)
        .await
        .unwrap();

    let stored = repo.get("ful_1").await.unwrap();
    assert_eq!(stored.tracking_number.as_deref(), Some("TRACK123"));
    assert_eq!(stored.metadata["packeta_shipment_id"], "123");
}

#[tokio::test]
async fn carrier_rejection_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/shipments"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "API Error"
        })))
        .mount(&mock_server)
        .await;

    let repo = Arc::new(InMemoryFulfillmentRepository::new());
    repo.insert(Fulfillment::new("ful_1")).await;

    let config = PacketaConfig::new("test_key", &mock_server.uri()).unwrap();
    let client = Arc::new(PacketaApiClient::new(&config).unwrap());
    let service = PacketaFulfillmentService::new(client, repo.clone());

    let fulfillment = Fulfillment::new("ful_1");
    let err = service
        .create_fulfillment(&method_data(), &items(), &order(), &fulfillment)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to create Packeta shipment: Packeta API Error: API Error"
    );
    let stored = repo.get("ful_1").await.unwrap();
    assert_eq!(stored.state(), FulfillmentState::Pending);
}

#[tokio::test]
async fn paid_order_ships_without_cod() {
    let paid = Order {
        payment_status: PaymentStatus::Captured,
        shipping_address: Some(Address {
            first_name: Some("Jana".into()),
            ..Address::default()
        }),
        ..order()
    };
    let h = harness(
        MockCarrierApi::new().with_response(CarrierOperation::CreateShipment, json!({})),
        Fulfillment::new("ful_1"),
    )
    .await;

    h.service
        .create_fulfillment(&method_data(), &items(), &paid, &Fulfillment::new("ful_1"))
        .await
        .unwrap();

    let Some(CarrierCall::CreateShipment(request)) = h.carrier.calls().into_iter().next() else {
        panic!("expected a create_shipment call");
    };
    assert_eq!(request.cod_amount, 0);
    assert_eq!(request.recipient.name, "Jana");
    assert_eq!(request.recipient.phone, None);
}
