//! TableOpened event applier
//!
//! Initializes a fresh order snapshot from the opening event. The VAT
//! rate and currency precision are frozen here for the order's lifetime.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// TableOpened applier
pub struct TableOpenedApplier;

impl EventApplier for TableOpenedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::TableOpened {
            table_id,
            table_name,
            guest_count,
            vat_rate,
            currency_decimals,
        } = &event.payload
        {
            snapshot.order_id = event.order_id.clone();
            snapshot.table_id = Some(table_id.clone());
            snapshot.table_name = table_name.clone();
            snapshot.guest_count = *guest_count;
            snapshot.status = OrderStatus::Open;
            snapshot.vat_rate = *vat_rate;
            snapshot.currency_decimals = *currency_decimals;
            snapshot.created_at = event.timestamp;

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
    fn test_table_opened_initializes_snapshot() {
        let event = OrderEvent::new(
            1,
            "order-1".to_string(),
            "op-1".to_string(),
            "Ana".to_string(),
            "cmd-1".to_string(),
            None,
            OrderEventType::TableOpened,
            EventPayload::TableOpened {
                table_id: "T7".to_string(),
                table_name: Some("Terrace 7".to_string()),
                guest_count: 4,
                vat_rate: 21.0,
                currency_decimals: 2,
            },
        );

        let mut snapshot = OrderSnapshot::default();
        TableOpenedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.order_id, "order-1");
        assert_eq!(snapshot.table_id.as_deref(), Some("T7"));
        assert_eq!(snapshot.table_name.as_deref(), Some("Terrace 7"));
        assert_eq!(snapshot.guest_count, 4);
        assert!(snapshot.is_open());
        assert_eq!(snapshot.vat_rate, 21.0);
        assert_eq!(snapshot.currency_decimals, 2);
        assert_eq!(snapshot.last_sequence, 1);
        assert_eq!(snapshot.created_at, event.timestamp);
    }

    #[test]
    fn test_table_opened_freezes_zero_decimal_currency() {
        let event = OrderEvent::new(
            1,
            "order-1".to_string(),
            "op-1".to_string(),
            "Ana".to_string(),
            "cmd-1".to_string(),
            None,
            OrderEventType::TableOpened,
            EventPayload::TableOpened {
                table_id: "T1".to_string(),
                table_name: None,
                guest_count: 2,
                vat_rate: 10.0,
                currency_decimals: 0,
            },
        );

        let mut snapshot = OrderSnapshot::default();
        TableOpenedApplier.apply(&mut snapshot, &event);
        assert_eq!(snapshot.currency_decimals, 0);
    }
}
