//! RenameRound command handler
//!
//! Overrides the display label of a round. Labels for rounds without
//! items are rejected: accepting them would leave orphaned metadata
//! behind as rounds are never created explicitly.

use async_trait::async_trait;

use crate::orders::rounds::round_exists;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// RenameRound action
#[derive(Debug, Clone)]
pub struct RenameRoundAction {
    pub order_id: String,
    pub round: u32,
    pub label: String,
}

#[async_trait]
impl CommandHandler for RenameRoundAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Validate input
        let label = self.label.trim();
        if label.is_empty() {
            return Err(OrderError::Validation("label must not be empty".to_string()));
        }

        // 2. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 3. Validate order status - must be open
        if snapshot.is_closed() {
            return Err(OrderError::OrderAlreadyClosed(self.order_id.clone()));
        }

        // 4. The round must have items
        if !round_exists(&snapshot, self.round) {
            return Err(OrderError::RoundNotFound(self.round));
        }

        // 5. Renaming to the current label is a no-op
        let previous_label = snapshot.round_labels.get(&self.round).cloned();
        if previous_label.as_deref() == Some(label) {
            return Ok(vec![]);
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
            OrderEventType::RoundRenamed,
            EventPayload::RoundRenamed {
                round: self.round,
                label: label.to_string(),
                previous_label,
            },
        );

        Ok(vec![event])
    }
}
