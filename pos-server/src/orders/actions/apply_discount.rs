//! ApplyDiscount command handler
//!
//! Applies a discount spec to an open order. One discount per order:
//! re-application fails instead of compounding. Coupons arrive here
//! already resolved: the manager validates the code with the coupon
//! service before the transaction opens and fills in `coupon_value`.

use async_trait::async_trait;

use crate::orders::money::{
    discount_amount, round_money, to_decimal, to_f64, validate_discount_request, MONEY_TOLERANCE,
};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use rust_decimal::Decimal;
use shared::order::{
    DiscountInfo, DiscountKind, DiscountRequest, EventPayload, OrderEvent, OrderEventType,
};

/// ApplyDiscount action
#[derive(Debug, Clone)]
pub struct ApplyDiscountAction {
    pub order_id: String,
    pub request: DiscountRequest,
    /// Discount amount granted by the coupon service, for Coupon requests
    pub coupon_value: Option<f64>,
}

#[async_trait]
impl CommandHandler for ApplyDiscountAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Validate request shape
        validate_discount_request(&self.request)?;

        if self.request.kind == DiscountKind::Coupon && self.coupon_value.is_none() {
            return Err(OrderError::InvalidCoupon(
                "coupon was not resolved before execution".to_string(),
            ));
        }

        // 2. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 3. Validate order status - must be open
        if snapshot.is_closed() {
            return Err(OrderError::OrderAlreadyClosed(self.order_id.clone()));
        }

        // 4. One discount per order
        if snapshot.discount.is_some() {
            return Err(OrderError::DiscountAlreadyApplied);
        }

        // 5. Compute the discount against the current subtotal
        let decimals = snapshot.currency_decimals;
        let subtotal = to_decimal(snapshot.subtotal);
        let amount = discount_amount(
            self.request.kind,
            self.request.value,
            self.coupon_value,
            subtotal,
            decimals,
        );
        let new_total = round_money((subtotal - amount).max(Decimal::ZERO), decimals);

        // 6. Discounting below the already-paid amount would flip the
        //    order into overpayment; surface it instead of allowing it
        let paid = to_decimal(snapshot.paid_amount);
        if new_total < paid - MONEY_TOLERANCE {
            return Err(OrderError::DiscountBelowPaid {
                paid: snapshot.paid_amount,
                new_total: to_f64(new_total),
            });
        }

        // 7. Allocate sequence number
        let seq = ctx.next_sequence();

        // 8. Create event with the full discount spec
        let discount = DiscountInfo {
            kind: self.request.kind,
            value: self.request.value.or(self.coupon_value),
            coupon_code: self.request.coupon_code.clone(),
            reason: self.request.reason.clone(),
            amount: to_f64(amount),
            applied_at: shared::util::now_millis(),
        };

        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::DiscountApplied,
            EventPayload::DiscountApplied {
                discount,
                subtotal: snapshot.subtotal,
                new_total: to_f64(new_total),
            },
        );

        Ok(vec![event])
    }
}
