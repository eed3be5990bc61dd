//! PaymentAdded event applier
//!
//! Appends a payment record to the ledger and updates the paid amount.
//! The ledger is append-only; there is no update or delete.

use crate::orders::money::{to_decimal, to_f64};
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, PaymentRecord};

/// PaymentAdded applier
pub struct PaymentAddedApplier;

impl EventApplier for PaymentAddedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::PaymentAdded {
            payment_id,
            method,
            amount,
            note,
        } = &event.payload
        {
            let payment = PaymentRecord {
                payment_id: payment_id.clone(),
                method: *method,
                amount: *amount,
                note: note.clone(),
                timestamp: event.timestamp,
            };
            snapshot.payments.push(payment);

            // Decimal addition avoids drift across many partial payments
            snapshot.paid_amount = to_f64(to_decimal(snapshot.paid_amount) + to_decimal(*amount));

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{OrderEventType, PaymentMethod};

    fn payment_event(seq: u64, payment_id: &str, method: PaymentMethod, amount: f64) -> OrderEvent {
        OrderEvent::new(
            seq,
            "order-1".to_string(),
            "op-1".to_string(),
            "Ana".to_string(),
            "cmd-1".to_string(),
            None,
            OrderEventType::PaymentAdded,
            EventPayload::PaymentAdded {
                payment_id: payment_id.to_string(),
                method,
                amount,
                note: None,
            },
        )
    }

    #[test]
    fn test_payment_added_basic() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.total = 100.0;

        let event = payment_event(1, "payment-1", PaymentMethod::Card, 50.0);
        PaymentAddedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.payments.len(), 1);
        assert_eq!(snapshot.payments[0].payment_id, "payment-1");
        assert_eq!(snapshot.payments[0].method, PaymentMethod::Card);
        assert_eq!(snapshot.paid_amount, 50.0);
        assert_eq!(snapshot.remaining_amount(), 50.0);
        assert!(!snapshot.is_fully_paid());
        assert_eq!(snapshot.last_sequence, 1);
    }

    #[test]
    fn test_multiple_partial_payments_accumulate() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.total = 100.0;

        PaymentAddedApplier.apply(
            &mut snapshot,
            &payment_event(1, "payment-1", PaymentMethod::Card, 30.0),
        );
        PaymentAddedApplier.apply(
            &mut snapshot,
            &payment_event(2, "payment-2", PaymentMethod::Cash, 70.0),
        );

        assert_eq!(snapshot.payments.len(), 2);
        assert_eq!(snapshot.paid_amount, 100.0);
        assert!(snapshot.is_fully_paid());
        assert_eq!(snapshot.last_sequence, 2);
    }

    #[test]
    fn test_payment_decimal_precision_over_many_payments() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.total = 1.0;

        // Ten payments of 0.10 must sum to exactly 1.00
        for seq in 1..=10 {
            let event = payment_event(seq, &format!("payment-{seq}"), PaymentMethod::Cash, 0.1);
            PaymentAddedApplier.apply(&mut snapshot, &event);
        }

        assert_eq!(snapshot.paid_amount, 1.0);
        assert!(snapshot.is_fully_paid());
    }

    #[test]
    fn test_payment_timestamp_from_event() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        let event = payment_event(1, "payment-1", PaymentMethod::GiftCard, 20.0);
        PaymentAddedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.payments[0].timestamp, event.timestamp);
        assert_eq!(snapshot.updated_at, event.timestamp);
    }
}
