//! Order snapshot utilities
//!
//! Converts command input into item snapshots and rebuilds snapshots
//! from the event stream. Event application itself lives in the
//! appliers module; use `EventAction` to fold events into a snapshot.

use crate::orders::appliers::EventAction;
use crate::orders::money::line_total;
use crate::orders::rounds::normalize_round;
use crate::orders::traits::EventApplier;
use shared::order::{OrderEvent, OrderItemInput, OrderItemSnapshot, OrderSnapshot};

/// Convert an OrderItemInput into a stored item snapshot.
///
/// The instance_id is a fresh UUID: identical menu items ordered twice
/// are distinct lines (they may sit on different seats or rounds).
/// `round` must already be resolved by the action; input round numbers
/// are only defaults.
pub fn input_to_item(input: &OrderItemInput, round: u32, decimal_places: u32) -> OrderItemSnapshot {
    OrderItemSnapshot {
        instance_id: uuid::Uuid::new_v4().to_string(),
        product_id: input.product_id.clone(),
        name: input.name.clone(),
        quantity: input.quantity,
        unit_price: input.unit_price,
        line_total: line_total(input.quantity, input.unit_price, decimal_places),
        round: normalize_round(Some(round)),
        seat: input.seat,
        urgent: input.urgent,
        note: input.note.clone(),
        sent: false,
        created_at: shared::util::now_millis(),
    }
}

/// Rebuild a snapshot by replaying an order's event stream from scratch.
///
/// Used for recovery when a stored snapshot is missing or corrupted.
/// Events must be ordered ascending by sequence.
pub fn replay(order_id: &str, events: &[OrderEvent]) -> OrderSnapshot {
    let mut snapshot = OrderSnapshot::new(order_id.to_string());
    for event in events {
        let action = EventAction::from(event);
        action.apply(&mut snapshot, event);
        snapshot.last_sequence = event.sequence;
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, quantity: i32, unit_price: f64) -> OrderItemInput {
        OrderItemInput {
            product_id: format!("p-{name}"),
            name: name.to_string(),
            quantity,
            unit_price,
            round: None,
            seat: Some(2),
            urgent: false,
            note: Some("no onions".to_string()),
        }
    }

    #[test]
    fn test_input_to_item_computes_line_total() {
        let item = input_to_item(&input("burger", 3, 9.5), 2, 2);
        assert_eq!(item.line_total, 28.5);
        assert_eq!(item.round, 2);
        assert_eq!(item.seat, Some(2));
        assert!(!item.sent);
        assert!(!item.instance_id.is_empty());
    }

    #[test]
    fn test_input_to_item_fresh_instance_ids() {
        let a = input_to_item(&input("burger", 1, 9.5), 1, 2);
        let b = input_to_item(&input("burger", 1, 9.5), 1, 2);
        assert_ne!(a.instance_id, b.instance_id);
    }
}
