//! OrderClosed event applier
//!
//! Transitions the order to its terminal state. The closure guard
//! (full payment) was already enforced by the action.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderClosed applier
pub struct OrderClosedApplier;

impl EventApplier for OrderClosedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderClosed { .. } = &event.payload {
            snapshot.status = OrderStatus::Closed;

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderEventType;

    #[test]
    fn test_order_closed_sets_terminal_status() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.total = 50.0;
        snapshot.paid_amount = 50.0;

        let event = OrderEvent::new(
            3,
            "order-1".to_string(),
            "op-1".to_string(),
            "Ana".to_string(),
            "cmd-1".to_string(),
            None,
            OrderEventType::OrderClosed,
            EventPayload::OrderClosed {
                final_total: 50.0,
                payment_summary: vec![],
            },
        );

        OrderClosedApplier.apply(&mut snapshot, &event);

        assert!(snapshot.is_closed());
        assert_eq!(snapshot.last_sequence, 3);
        assert_eq!(snapshot.updated_at, event.timestamp);
    }
}
