//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles
//! one specific event type. Appliers are PURE functions.

use enum_dispatch::enum_dispatch;

use shared::order::{EventPayload, OrderEvent};

mod discount_applied;
mod item_modified;
mod items_added;
mod order_closed;
mod payment_added;
mod round_renamed;
mod round_sent;
mod table_opened;

pub use discount_applied::DiscountAppliedApplier;
pub use item_modified::ItemModifiedApplier;
pub use items_added::ItemsAddedApplier;
pub use order_closed::OrderClosedApplier;
pub use payment_added::PaymentAddedApplier;
pub use round_renamed::RoundRenamedApplier;
pub use round_sent::RoundSentApplier;
pub use table_opened::TableOpenedApplier;

/// EventAction enum - dispatches to concrete applier implementations
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    TableOpened(TableOpenedApplier),
    OrderClosed(OrderClosedApplier),
    ItemsAdded(ItemsAddedApplier),
    ItemModified(ItemModifiedApplier),
    RoundSent(RoundSentApplier),
    RoundRenamed(RoundRenamedApplier),
    DiscountApplied(DiscountAppliedApplier),
    PaymentAdded(PaymentAddedApplier),
}

/// Convert OrderEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload.
impl From<&OrderEvent> for EventAction {
    fn from(event: &OrderEvent) -> Self {
        match &event.payload {
            EventPayload::TableOpened { .. } => EventAction::TableOpened(TableOpenedApplier),
            EventPayload::OrderClosed { .. } => EventAction::OrderClosed(OrderClosedApplier),
            EventPayload::ItemsAdded { .. } => EventAction::ItemsAdded(ItemsAddedApplier),
            EventPayload::ItemModified { .. } => EventAction::ItemModified(ItemModifiedApplier),
            EventPayload::RoundSent { .. } => EventAction::RoundSent(RoundSentApplier),
            EventPayload::RoundRenamed { .. } => EventAction::RoundRenamed(RoundRenamedApplier),
            EventPayload::DiscountApplied { .. } => {
                EventAction::DiscountApplied(DiscountAppliedApplier)
            }
            EventPayload::PaymentAdded { .. } => EventAction::PaymentAdded(PaymentAddedApplier),
        }
    }
}
