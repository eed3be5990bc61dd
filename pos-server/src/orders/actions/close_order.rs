//! CloseOrder command handler
//!
//! Gates the terminal OPEN -> CLOSED transition on full payment. The
//! sufficiency check runs against the state inside the transaction at
//! close time; a balance that changed since the screen was rendered is
//! re-evaluated here, not trusted from the client.

use async_trait::async_trait;

use crate::orders::money::{is_payment_sufficient, to_decimal, to_f64};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use rust_decimal::Decimal;
use shared::order::{
    EventPayload, OrderEvent, OrderEventType, PaymentMethod, PaymentSummaryItem,
};
use std::collections::BTreeMap;

/// CloseOrder action
#[derive(Debug, Clone)]
pub struct CloseOrderAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for CloseOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 2. Closed is terminal
        if snapshot.is_closed() {
            return Err(OrderError::OrderAlreadyClosed(self.order_id.clone()));
        }

        // 3. Closure guard: the order must be fully paid NOW
        if !is_payment_sufficient(snapshot.paid_amount, snapshot.total) {
            return Err(OrderError::NotFullyPaid {
                paid: snapshot.paid_amount,
                required: snapshot.total,
            });
        }

        // 4. Aggregate the ledger by method for the audit record
        let mut by_method: BTreeMap<String, (PaymentMethod, Decimal)> = BTreeMap::new();
        for payment in &snapshot.payments {
            let entry = by_method
                .entry(payment.method.to_string())
                .or_insert((payment.method, Decimal::ZERO));
            entry.1 += to_decimal(payment.amount);
        }
        let payment_summary: Vec<PaymentSummaryItem> = by_method
            .into_values()
            .map(|(method, amount)| PaymentSummaryItem {
                method,
                amount: to_f64(amount),
            })
            .collect();

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
            OrderEventType::OrderClosed,
            EventPayload::OrderClosed {
                final_total: snapshot.total,
                payment_summary,
            },
        );

        Ok(vec![event])
    }
}
