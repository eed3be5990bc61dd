//! SendRound command handler
//!
//! Fires all unsent items of a round to preparation. Re-sending a round
//! whose items are all sent is a no-op, not an error.

use async_trait::async_trait;

use crate::orders::rounds::round_exists;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// SendRound action
#[derive(Debug, Clone)]
pub struct SendRoundAction {
    pub order_id: String,
    pub round: u32,
}

#[async_trait]
impl CommandHandler for SendRoundAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 2. Validate order status - must be open
        if snapshot.is_closed() {
            return Err(OrderError::OrderAlreadyClosed(self.order_id.clone()));
        }

        // 3. The round must have items
        if !round_exists(&snapshot, self.round) {
            return Err(OrderError::RoundNotFound(self.round));
        }

        // 4. Collect items not yet sent
        let instance_ids: Vec<String> = snapshot
            .items_in_round(self.round)
            .filter(|i| !i.sent)
            .map(|i| i.instance_id.clone())
            .collect();

        // Everything already fired: idempotent no-op
        if instance_ids.is_empty() {
            return Ok(vec![]);
        }

        // 5. Allocate sequence number
        let seq = ctx.next_sequence();

        // 6. Create event
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::RoundSent,
            EventPayload::RoundSent {
                round: self.round,
                instance_ids,
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

    fn item(instance_id: &str, round: u32, sent: bool) -> OrderItemSnapshot {
        OrderItemSnapshot {
            instance_id: instance_id.to_string(),
            product_id: "p1".to_string(),
            name: "Test".to_string(),
            quantity: 1,
            unit_price: 10.0,
            line_total: 10.0,
            round,
            seat: None,
            urgent: false,
            note: None,
            sent,
            created_at: 0,
        }
    }

    fn store_order(storage: &OrderStorage, items: Vec<OrderItemSnapshot>) {
        let txn = storage.begin_write().unwrap();
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.items = items;
        storage.store_snapshot(&txn, &snapshot).unwrap();
        txn.commit().unwrap();
    }

    #[tokio::test]
    async fn test_send_round_collects_unsent_items_only() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store_order(
            &storage,
            vec![
                item("a", 1, false),
                item("b", 1, true),
                item("c", 2, false),
            ],
        );

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());

        let action = SendRoundAction {
            order_id: "order-1".to_string(),
            round: 1,
        };
        let events = action.execute(&mut ctx, &create_test_metadata()).await.unwrap();

        assert_eq!(events.len(), 1);
        if let EventPayload::RoundSent {
            round,
            instance_ids,
        } = &events[0].payload
        {
            assert_eq!(*round, 1);
            assert_eq!(instance_ids, &vec!["a".to_string()]);
        } else {
            panic!("Expected RoundSent payload");
        }
    }

    #[tokio::test]
    async fn test_send_round_fully_sent_is_noop() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store_order(&storage, vec![item("a", 1, true)]);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());

        let action = SendRoundAction {
            order_id: "order-1".to_string(),
            round: 1,
        };
        let events = action.execute(&mut ctx, &create_test_metadata()).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_send_empty_round_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        store_order(&storage, vec![item("a", 1, false)]);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0, CurrencyConfig::default());

        let action = SendRoundAction {
            order_id: "order-1".to_string(),
            round: 3,
        };
        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(OrderError::RoundNotFound(3))));
    }
}
