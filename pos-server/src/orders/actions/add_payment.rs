//! AddPayment command handler
//!
//! Records a payment against the order's outstanding balance. The
//! overpayment guard checks the CURRENT ledger state inside the write
//! transaction, never a client-side snapshot, so two racing partial
//! payments cannot both pass against a stale remaining amount.

use async_trait::async_trait;

use crate::orders::money::{to_decimal, to_f64, MONEY_TOLERANCE};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, PaymentInput};

/// AddPayment action
#[derive(Debug, Clone)]
pub struct AddPaymentAction {
    pub order_id: String,
    pub payment: PaymentInput,
}

#[async_trait]
impl CommandHandler for AddPaymentAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Validate payment input (finite, positive, within bounds)
        crate::orders::money::validate_payment(&self.payment)?;

        // 2. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 3. Validate order status - must be open
        if snapshot.is_closed() {
            return Err(OrderError::OrderAlreadyClosed(self.order_id.clone()));
        }

        // 4. Overpayment guard: reject if amount exceeds remaining
        let remaining = to_decimal(snapshot.total) - to_decimal(snapshot.paid_amount);
        if to_decimal(self.payment.amount) > remaining + MONEY_TOLERANCE {
            return Err(OrderError::Overpayment {
                amount: self.payment.amount,
                remaining: to_f64(remaining),
            });
        }

        // 5. Allocate sequence number
        let seq = ctx.next_sequence();

        // 6. Create event
        let payment_id = uuid::Uuid::new_v4().to_string();
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::PaymentAdded,
            EventPayload::PaymentAdded {
                payment_id,
                method: self.payment.method,
                amount: self.payment.amount,
                note: self.payment.note.clone(),
            },
        );

        Ok(vec![event])
    }
}
