//! AddItems command handler
//!
//! Appends a batch of items to an open order. Round assignment policy:
//! the batch lands in the current (maximum) round unless `new_round`
//! explicitly advances to the next one. An item may carry its own round
//! number, which is honored as long as it does not exceed the next
//! round (no gaps get created ahead of the order).

use async_trait::async_trait;

use crate::orders::money::validate_item;
use crate::orders::reducer::input_to_item;
use crate::orders::rounds::{current_round_number, next_round_number};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderItemInput};

/// AddItems action
#[derive(Debug, Clone)]
pub struct AddItemsAction {
    pub order_id: String,
    pub items: Vec<OrderItemInput>,
    pub new_round: bool,
}

#[async_trait]
impl CommandHandler for AddItemsAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Validate input
        if self.items.is_empty() {
            return Err(OrderError::Validation("no items to add".to_string()));
        }
        for item in &self.items {
            validate_item(item)?;
        }

        // 2. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 3. Validate order status - must be open
        if snapshot.is_closed() {
            return Err(OrderError::OrderAlreadyClosed(self.order_id.clone()));
        }

        // 4. Resolve the batch round
        let next = next_round_number(&snapshot.items);
        let current = current_round_number(&snapshot.items);
        let batch_round = if self.new_round { next } else { current };

        // 5. Build item snapshots; explicit per-item rounds are honored
        //    between the current round and the next one. Round numbers
        //    never decrease in creation order.
        let decimals = snapshot.currency_decimals;
        let mut item_snapshots = Vec::with_capacity(self.items.len());
        for input in &self.items {
            let round = match input.round {
                Some(r) if r > next => {
                    return Err(OrderError::Validation(format!(
                        "round {} skips ahead, next round is {}",
                        r, next
                    )));
                }
                Some(r) if r < current => {
                    return Err(OrderError::Validation(format!(
                        "round {} is behind the current round {}",
                        r, current
                    )));
                }
                Some(r) => r,
                None => batch_round,
            };
            item_snapshots.push(input_to_item(input, round, decimals));
        }

        // 6. Allocate sequence number
        let seq = ctx.next_sequence();

        // 7. Create event
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::ItemsAdded,
            EventPayload::ItemsAdded {
                items: item_snapshots,
                round: batch_round,
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
    use shared::order::{OrderItemSnapshot, OrderSnapshot, OrderStatus};

    fn create_test_metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_id: "user-1".to_string(),
            operator_name: "Test User".to_string(),
            timestamp: 1234567890,
        }
    }

    fn input(name: &str, round: Option<u32>) -> OrderItemInput {
        OrderItemInput {
            product_id: format!("p-{name}"),
            name: name.to_string(),
            quantity: 1,
            unit_price: 10.0,
            round,
            seat: None,
            urgent: false,
            note: None,
        }
    }

    fn stored_item(round: u32) -> OrderItemSnapshot {
        OrderItemSnapshot {
            instance_id: uuid::Uuid::new_v4().to_string(),
            product_id: "p0".to_string(),
            name: "Existing".to_string(),
            quantity: 1,
            unit_price: 5.0,
            line_total: 5.0,
            round,
            seat: None,
            urgent: false,
            note: None,
            sent: false,
            created_at: 0,
        }
    }

    fn store_open_order(storage: &OrderStorage, items: Vec<OrderItemSnapshot>) {
        let txn = storage.begin_write().unwrap();
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.items = items;
        storage.store_snapshot(&txn, &snapshot).unwrap();
        txn.commit().unwrap();
    }

    #[tokio::test]
    async fn test_add_items_defaults_to_current_round() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store_open_order(&storage, vec![stored_item(2)]);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());

        let action = AddItemsAction {
            order_id: "order-1".to_string(),
            items: vec![input("soup", None)],
            new_round: false,
        };
        let events = action.execute(&mut ctx, &create_test_metadata()).await.unwrap();

        if let EventPayload::ItemsAdded { items, round } = &events[0].payload {
            assert_eq!(*round, 2);
            assert_eq!(items[0].round, 2);
        } else {
            panic!("Expected ItemsAdded payload");
        }
    }

    #[tokio::test]
    async fn test_add_items_new_round_advances() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store_open_order(&storage, vec![stored_item(2)]);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());

        let action = AddItemsAction {
            order_id: "order-1".to_string(),
            items: vec![input("dessert", None)],
            new_round: true,
        };
        let events = action.execute(&mut ctx, &create_test_metadata()).await.unwrap();

        if let EventPayload::ItemsAdded { round, .. } = &events[0].payload {
            assert_eq!(*round, 3);
        } else {
            panic!("Expected ItemsAdded payload");
        }
    }

    #[tokio::test]
    async fn test_add_items_empty_order_starts_round_one() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store_open_order(&storage, vec![]);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());

        let action = AddItemsAction {
            order_id: "order-1".to_string(),
            items: vec![input("soup", None)],
            new_round: false,
        };
        let events = action.execute(&mut ctx, &create_test_metadata()).await.unwrap();

        if let EventPayload::ItemsAdded { round, .. } = &events[0].payload {
            assert_eq!(*round, 1);
        } else {
            panic!("Expected ItemsAdded payload");
        }
    }

    #[tokio::test]
    async fn test_add_items_rejects_round_skipping_ahead() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store_open_order(&storage, vec![stored_item(1)]);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());

        let action = AddItemsAction {
            order_id: "order-1".to_string(),
            items: vec![input("soup", Some(5))],
            new_round: false,
        };
        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_items_rejects_round_behind_current() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store_open_order(&storage, vec![stored_item(2)]);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());

        let action = AddItemsAction {
            order_id: "order-1".to_string(),
            items: vec![input("soup", Some(1))],
            new_round: false,
        };
        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(OrderError::Validation(_))));

        // The current round itself is still a valid target
        let action = AddItemsAction {
            order_id: "order-1".to_string(),
            items: vec![input("soup", Some(2))],
            new_round: false,
        };
        assert!(action.execute(&mut ctx, &create_test_metadata()).await.is_ok());
    }

    #[tokio::test]
    async fn test_add_items_to_closed_order_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = OrderStatus::Closed;
        storage.store_snapshot(&txn, &snapshot).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());

        let action = AddItemsAction {
            order_id: "order-1".to_string(),
            items: vec![input("soup", None)],
            new_round: false,
        };
        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(OrderError::OrderAlreadyClosed(_))));
    }

    #[tokio::test]
    async fn test_add_items_rejects_empty_batch_and_bad_items() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store_open_order(&storage, vec![]);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());
        let metadata = create_test_metadata();

        let empty = AddItemsAction {
            order_id: "order-1".to_string(),
            items: vec![],
            new_round: false,
        };
        assert!(matches!(
            empty.execute(&mut ctx, &metadata).await,
            Err(OrderError::Validation(_))
        ));

        let mut bad = input("soup", None);
        bad.quantity = -1;
        let negative = AddItemsAction {
            order_id: "order-1".to_string(),
            items: vec![bad],
            new_round: false,
        };
        assert!(matches!(
            negative.execute(&mut ctx, &metadata).await,
            Err(OrderError::Validation(_))
        ));
    }
}
