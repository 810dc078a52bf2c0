use packeta_core::{LineItem, Order, Recipient, ShipmentItem, ShipmentRequest};

/// Builds the carrier payload for an order shipped to a pickup point
pub fn shipment_request(
    pickup_point_id: String,
    items: &[LineItem],
    order: &Order,
) -> ShipmentRequest {
    let address = order.shipping_address.as_ref();

    ShipmentRequest {
        pickup_point_id,
        recipient: Recipient {
            name: address.map(|a| a.full_name()).unwrap_or_default(),
            email: order.email.clone(),
            phone: address
                .and_then(|a| a.phone.clone())
                .filter(|phone| !phone.is_empty()),
        },
        order_number: order.order_number(),
        cod_amount: order.cod_amount(),
        items: items.iter().map(shipment_item).collect(),
    }
}

fn shipment_item(item: &LineItem) -> ShipmentItem {
    ShipmentItem {
        name: item.title.clone().unwrap_or_default(),
        quantity: item.quantity.filter(|q| *q > 0).unwrap_or(1),
    }
}
