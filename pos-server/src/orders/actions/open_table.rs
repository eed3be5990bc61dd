//! OpenTable command handler
//!
//! Opens a new order for a table. The order_id is generated by the
//! manager before dispatch (it is returned to the caller and used as
//! the event stream key). The table occupancy check also lives in the
//! manager: an open order for the table is returned instead of a new
//! one being created.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// OpenTable action
#[derive(Debug, Clone)]
pub struct OpenTableAction {
    /// Pre-generated order ID
    pub order_id: String,
    pub table_id: String,
    pub table_name: Option<String>,
    pub guest_count: i32,
    /// VAT rate from server config, frozen onto the order
    pub vat_rate: f64,
}

#[async_trait]
impl CommandHandler for OpenTableAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Validate input
        if self.table_id.trim().is_empty() {
            return Err(OrderError::Validation("table_id must not be empty".into()));
        }
        if self.guest_count <= 0 {
            return Err(OrderError::Validation(format!(
                "guest_count must be positive, got {}",
                self.guest_count
            )));
        }

        // 2. Allocate sequence number
        let seq = ctx.next_sequence();

        // 3. Create event; currency precision is frozen here from config
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::TableOpened,
            EventPayload::TableOpened {
                table_id: self.table_id.clone(),
                table_name: self.table_name.clone(),
                guest_count: self.guest_count,
                vat_rate: self.vat_rate,
                currency_decimals: ctx.currency.decimal_places,
            },
        );

        Ok(vec![event])
    }
}
