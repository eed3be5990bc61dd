//! ModifyItem command handler
//!
//! Modifies a single item line. Items already fired to preparation
//! reject quantity and price changes; seat, urgency and note remain
//! editable.

use async_trait::async_trait;

use crate::orders::money::{
    MONEY_TOLERANCE, line_total, recalculate_totals, to_decimal, validate_item_changes,
};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, ItemChanges, OrderEvent, OrderEventType};

/// ModifyItem action
#[derive(Debug, Clone)]
pub struct ModifyItemAction {
    pub order_id: String,
    pub instance_id: String,
    pub changes: ItemChanges,
}

#[async_trait]
impl CommandHandler for ModifyItemAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Validate the change set
        validate_item_changes(&self.changes)?;

        // 2. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 3. Validate order status - must be open
        if snapshot.is_closed() {
            return Err(OrderError::OrderAlreadyClosed(self.order_id.clone()));
        }

        // 4. Find the item
        let item = snapshot
            .items
            .iter()
            .find(|i| i.instance_id == self.instance_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.instance_id.clone()))?;

        // 5. Sent items freeze quantity and price
        if item.sent && self.changes.touches_frozen_fields() {
            return Err(OrderError::ItemAlreadySent(self.instance_id.clone()));
        }

        // 6. A money change must not drop the total below what is already
        //    paid; that would flip the order into overpayment. Same guard
        //    as the discount path, evaluated against the staged change.
        if self.changes.quantity.is_some() || self.changes.unit_price.is_some() {
            let mut staged = snapshot.clone();
            if let Some(staged_item) = staged
                .items
                .iter_mut()
                .find(|i| i.instance_id == self.instance_id)
            {
                if let Some(quantity) = self.changes.quantity {
                    staged_item.quantity = quantity;
                }
                if let Some(unit_price) = self.changes.unit_price {
                    staged_item.unit_price = unit_price;
                }
                staged_item.line_total = line_total(
                    staged_item.quantity,
                    staged_item.unit_price,
                    staged.currency_decimals,
                );
            }
            recalculate_totals(&mut staged);

            if to_decimal(staged.total) < to_decimal(snapshot.paid_amount) - MONEY_TOLERANCE {
                return Err(OrderError::Validation(format!(
                    "change would drop total ({:.2}) below paid amount ({:.2})",
                    staged.total, snapshot.paid_amount
                )));
            }
        }

        // 7. Record previous values for the fields being changed
        let previous = ItemChanges {
            quantity: self.changes.quantity.map(|_| item.quantity),
            unit_price: self.changes.unit_price.map(|_| item.unit_price),
            seat: self.changes.seat.and(item.seat),
            urgent: self.changes.urgent.map(|_| item.urgent),
            note: self.changes.note.as_ref().and_then(|_| item.note.clone()),
        };

        // 8. Allocate sequence number
        let seq = ctx.next_sequence();

        // 9. Create event
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::ItemModified,
            EventPayload::ItemModified {
                instance_id: self.instance_id.clone(),
                changes: self.changes.clone(),
                previous,
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::money::CurrencyConfig;
    use crate::orders::storage::OrderStorage;
    use shared::order::{OrderItemSnapshot, OrderSnapshot};

    fn create_test_metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_id: "user-1".to_string(),
            operator_name: "Test User".to_string(),
            timestamp: 1234567890,
        }
    }

    fn store_order_with_item(storage: &OrderStorage, sent: bool) {
        let txn = storage.begin_write().unwrap();
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.items.push(OrderItemSnapshot {
            instance_id: "item-1".to_string(),
            product_id: "p1".to_string(),
            name: "Steak".to_string(),
            quantity: 1,
            unit_price: 24.0,
            line_total: 24.0,
            round: 1,
            seat: Some(1),
            urgent: false,
            note: None,
            sent,
            created_at: 0,
        });
        storage.store_snapshot(&txn, &snapshot).unwrap();
        txn.commit().unwrap();
    }

    #[tokio::test]
    async fn test_modify_item_records_previous_values() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store_order_with_item(&storage, false);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());

        let action = ModifyItemAction {
            order_id: "order-1".to_string(),
            instance_id: "item-1".to_string(),
            changes: ItemChanges {
                quantity: Some(3),
                ..Default::default()
            },
        };
        let events = action.execute(&mut ctx, &create_test_metadata()).await.unwrap();

        if let EventPayload::ItemModified {
            changes, previous, ..
        } = &events[0].payload
        {
            assert_eq!(changes.quantity, Some(3));
            assert_eq!(previous.quantity, Some(1));
            assert!(previous.unit_price.is_none());
        } else {
            panic!("Expected ItemModified payload");
        }
    }

    #[tokio::test]
    async fn test_modify_sent_item_quantity_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store_order_with_item(&storage, true);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());

        let action = ModifyItemAction {
            order_id: "order-1".to_string(),
            instance_id: "item-1".to_string(),
            changes: ItemChanges {
                quantity: Some(2),
                ..Default::default()
            },
        };
        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(OrderError::ItemAlreadySent(_))));
    }

    #[tokio::test]
    async fn test_modify_sent_item_seat_succeeds() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store_order_with_item(&storage, true);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());

        let action = ModifyItemAction {
            order_id: "order-1".to_string(),
            instance_id: "item-1".to_string(),
            changes: ItemChanges {
                seat: Some(3),
                ..Default::default()
            },
        };
        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_modify_below_paid_amount_rejected() {
        let storage = OrderStorage::open_in_memory().unwrap();

        // 4 × 25.00 = 100.00, with 80.00 already paid
        let txn = storage.begin_write().unwrap();
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.items.push(OrderItemSnapshot {
            instance_id: "item-1".to_string(),
            product_id: "p1".to_string(),
            name: "Banquet".to_string(),
            quantity: 4,
            unit_price: 25.0,
            line_total: 100.0,
            round: 1,
            seat: None,
            urgent: false,
            note: None,
            sent: false,
            created_at: 0,
        });
        snapshot.subtotal = 100.0;
        snapshot.total = 100.0;
        snapshot.paid_amount = 80.0;
        storage.store_snapshot(&txn, &snapshot).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());
        let metadata = create_test_metadata();

        // Dropping to 2 × 25.00 = 50.00 would leave 80.00 paid on a
        // 50.00 order
        let shrink = ModifyItemAction {
            order_id: "order-1".to_string(),
            instance_id: "item-1".to_string(),
            changes: ItemChanges {
                quantity: Some(2),
                ..Default::default()
            },
        };
        assert!(matches!(
            shrink.execute(&mut ctx, &metadata).await,
            Err(OrderError::Validation(_))
        ));

        // 4 × 20.00 = 80.00 lands exactly on the paid amount: allowed
        let exact = ModifyItemAction {
            order_id: "order-1".to_string(),
            instance_id: "item-1".to_string(),
            changes: ItemChanges {
                unit_price: Some(20.0),
                ..Default::default()
            },
        };
        assert!(exact.execute(&mut ctx, &metadata).await.is_ok());
    }

    #[tokio::test]
    async fn test_modify_unknown_item_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store_order_with_item(&storage, false);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());

        let action = ModifyItemAction {
            order_id: "order-1".to_string(),
            instance_id: "no-such-item".to_string(),
            changes: ItemChanges {
                urgent: Some(true),
                ..Default::default()
            },
        };
        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(OrderError::ItemNotFound(_))));
    }
}
