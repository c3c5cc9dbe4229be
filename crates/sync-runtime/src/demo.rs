//! Demo order set for exercising the pipeline end to end.
//!
//! Seeds one order per injection scenario so that a fresh runtime shows an
//! acknowledged order, a flaky one, a dead-lettered one and a duplicate.

use order_sync::{
    DeliveryAddress, OrderLine, OrderSyncApi, ProductRef, Scenario, SourceOrder, SyncError,
};
use tracing::info;

/// Orders seeded on boot, with the scenario each is injected under.
pub fn demo_orders() -> Vec<(SourceOrder, Scenario)> {
    vec![
        (order("ORD-1001", "Ada Lovelace", "GB", "WGT-100", 2), Scenario::Normal),
        (order("ORD-1002", "Grace Hopper", "US", "WGT-200", 1), Scenario::FailRandom),
        (order("ORD-1003", "Alan Turing", "GB", "WGT-300", 4), Scenario::FailHard),
        (order("ORD-1004", "Edsger Dijkstra", "NL", "WGT-100", 1), Scenario::Duplicate),
    ]
}

/// Build a single-line source order.
pub fn order(id: &str, customer: &str, country_code: &str, sku: &str, quantity: u32) -> SourceOrder {
    SourceOrder {
        source_order_id: id.to_string(),
        organization_id: "org-demo".to_string(),
        channel_id: "web".to_string(),
        delivery_address: DeliveryAddress {
            name: customer.to_string(),
            address1: "1 Demo Street".to_string(),
            address2: None,
            business_name: None,
            city: "Springfield".to_string(),
            zip: "00001".to_string(),
            country_code: country_code.to_string(),
            subdivision_code: None,
            phone: None,
        },
        lines: vec![OrderLine {
            id: 1,
            product: ProductRef {
                id: 1,
                name: format!("Widget {sku}"),
                code: sku.to_string(),
                hs_code: None,
            },
            quantity,
            currency: "USD".to_string(),
            unit_customs_value: 12.5,
            sublines: Vec::new(),
        }],
    }
}

/// Inject the demo orders and return their effective ids.
pub fn seed(api: &dyn OrderSyncApi) -> Result<Vec<String>, SyncError> {
    let ids = demo_orders()
        .into_iter()
        .map(|(order, scenario)| api.inject_source_order(order, Some(scenario)))
        .collect::<Result<Vec<_>, _>>()?;
    info!("[runtime] Seeded {} demo orders", ids.len());
    Ok(ids)
}
