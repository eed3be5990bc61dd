//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{OrderCommand, OrderCommandPayload, OrderEvent};

mod add_items;
mod add_payment;
mod apply_discount;
mod close_order;
mod modify_item;
pub mod open_table;
mod rename_round;
mod send_round;

pub use add_items::AddItemsAction;
pub use add_payment::AddPaymentAction;
pub use apply_discount::ApplyDiscountAction;
pub use close_order::CloseOrderAction;
pub use modify_item::ModifyItemAction;
pub use open_table::OpenTableAction;
pub use rename_round::RenameRoundAction;
pub use send_round::SendRoundAction;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    OpenTable(OpenTableAction),
    AddItems(AddItemsAction),
    ModifyItem(ModifyItemAction),
    SendRound(SendRoundAction),
    RenameRound(RenameRoundAction),
    ApplyDiscount(ApplyDiscountAction),
    AddPayment(AddPaymentAction),
    CloseOrder(CloseOrderAction),
}

/// Manual implementation of CommandHandler for CommandAction
#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match self {
            CommandAction::OpenTable(action) => action.execute(ctx, metadata).await,
            CommandAction::AddItems(action) => action.execute(ctx, metadata).await,
            CommandAction::ModifyItem(action) => action.execute(ctx, metadata).await,
            CommandAction::SendRound(action) => action.execute(ctx, metadata).await,
            CommandAction::RenameRound(action) => action.execute(ctx, metadata).await,
            CommandAction::ApplyDiscount(action) => action.execute(ctx, metadata).await,
            CommandAction::AddPayment(action) => action.execute(ctx, metadata).await,
            CommandAction::CloseOrder(action) => action.execute(ctx, metadata).await,
        }
    }
}

/// Convert OrderCommand to CommandAction
///
/// This is the ONLY place with a match on OrderCommandPayload.
impl From<&OrderCommand> for CommandAction {
    fn from(cmd: &OrderCommand) -> Self {
        match &cmd.payload {
            OrderCommandPayload::OpenTable { .. } => {
                // OpenTable is handled by OrdersManager directly: it needs
                // the generated order_id and the table occupancy check.
                unreachable!("OpenTable is dispatched by OrdersManager, not From<&OrderCommand>")
            }
            OrderCommandPayload::AddItems {
                order_id,
                items,
                new_round,
            } => CommandAction::AddItems(AddItemsAction {
                order_id: order_id.clone(),
                items: items.clone(),
                new_round: *new_round,
            }),
            OrderCommandPayload::ModifyItem {
                order_id,
                instance_id,
                changes,
            } => CommandAction::ModifyItem(ModifyItemAction {
                order_id: order_id.clone(),
                instance_id: instance_id.clone(),
                changes: changes.clone(),
            }),
            OrderCommandPayload::SendRound { order_id, round } => {
                CommandAction::SendRound(SendRoundAction {
                    order_id: order_id.clone(),
                    round: *round,
                })
            }
            OrderCommandPayload::RenameRound {
                order_id,
                round,
                label,
            } => CommandAction::RenameRound(RenameRoundAction {
                order_id: order_id.clone(),
                round: *round,
                label: label.clone(),
            }),
            OrderCommandPayload::ApplyDiscount { order_id, request } => {
                // Coupon value resolution happens in OrdersManager before
                // the transaction; here it starts unresolved.
                CommandAction::ApplyDiscount(ApplyDiscountAction {
                    order_id: order_id.clone(),
                    request: request.clone(),
                    coupon_value: None,
                })
            }
            OrderCommandPayload::AddPayment { order_id, payment } => {
                CommandAction::AddPayment(AddPaymentAction {
                    order_id: order_id.clone(),
                    payment: payment.clone(),
                })
            }
            OrderCommandPayload::CloseOrder { order_id } => {
                CommandAction::CloseOrder(CloseOrderAction {
                    order_id: order_id.clone(),
                })
            }
        }
    }
}
