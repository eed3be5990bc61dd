//! Order commands - client requests to modify orders

use super::types::{DiscountRequest, ItemChanges, OrderItemInput, PaymentInput};
use serde::{Deserialize, Serialize};

/// Order command envelope
///
/// `command_id` is the idempotency key: a command processed twice returns
/// a duplicate response instead of re-executing.
///
/// `expected_version` is the optimistic-concurrency token: when set, the
/// command fails with `STALE_VERSION` unless it matches the order's
/// `last_sequence` at execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommand {
    pub command_id: String,
    pub operator_id: String,
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds), preserved for audit
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,
    pub payload: OrderCommandPayload,
}

/// Command payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    OpenTable {
        table_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        table_name: Option<String>,
        guest_count: i32,
    },

    AddItems {
        order_id: String,
        items: Vec<OrderItemInput>,
        /// Start a new round for these items. New items are never moved
        /// to the next round automatically; the caller must ask for it.
        #[serde(default)]
        new_round: bool,
    },

    ModifyItem {
        order_id: String,
        instance_id: String,
        changes: ItemChanges,
    },

    SendRound {
        order_id: String,
        round: u32,
    },

    RenameRound {
        order_id: String,
        round: u32,
        label: String,
    },

    ApplyDiscount {
        order_id: String,
        request: DiscountRequest,
    },

    AddPayment {
        order_id: String,
        payment: PaymentInput,
    },

    CloseOrder {
        order_id: String,
    },
}

impl OrderCommandPayload {
    /// The order an existing-order command targets (None for OpenTable)
    pub fn order_id(&self) -> Option<&str> {
        match self {
            OrderCommandPayload::OpenTable { .. } => None,
            OrderCommandPayload::AddItems { order_id, .. }
            | OrderCommandPayload::ModifyItem { order_id, .. }
            | OrderCommandPayload::SendRound { order_id, .. }
            | OrderCommandPayload::RenameRound { order_id, .. }
            | OrderCommandPayload::ApplyDiscount { order_id, .. }
            | OrderCommandPayload::AddPayment { order_id, .. }
            | OrderCommandPayload::CloseOrder { order_id } => Some(order_id),
        }
    }
}
