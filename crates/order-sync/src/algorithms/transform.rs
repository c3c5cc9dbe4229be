//! Source → destination payload mapping.

use crate::domain::{
    DestinationItem, DestinationStatus, IssueStatus, OrderSubmission, SourceOrder,
};

/// Shape a source order for submission.
///
/// The source order id doubles as `shop_ref` (the cross-system join key) and
/// as the platform order id. Product codes become SKUs. New orders enter the
/// destination as paid, without issues and not on hold.
pub fn to_submission(order: &SourceOrder) -> OrderSubmission {
    let items = order
        .lines
        .iter()
        .map(|line| DestinationItem {
            sku: line.product.code.clone(),
            quantity: line.quantity,
            source_line_id: line.id,
        })
        .collect();

    OrderSubmission {
        platform_order_id: Some(order.source_order_id.clone()),
        shop_ref: order.source_order_id.clone(),
        status: DestinationStatus::Paid,
        country_code: Some(order.delivery_address.country_code.clone()),
        issue_status: IssueStatus::NoIssue,
        is_manual_hold: false,
        items,
    }
}
