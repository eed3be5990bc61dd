//! Order events - immutable facts recorded after command processing

use super::types::{
    DiscountInfo, ItemChanges, OrderItemSnapshot, PaymentMethod, PaymentSummaryItem,
};
use serde::{Deserialize, Serialize};

/// Order event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number (for ordering and replay)
    /// This is the AUTHORITATIVE ordering mechanism for state evolution
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Server timestamp (Unix milliseconds) - AUTHORITATIVE for state evolution
    pub timestamp: i64,
    /// Client timestamp - for audit; may differ from server time due to clock skew
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    /// Operator who triggered this event
    pub operator_id: String,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    /// Command that triggered this event (for audit tracing)
    pub command_id: String,
    /// Event type
    pub event_type: OrderEventType,
    /// Event payload
    pub payload: EventPayload,
}

/// Event type enumeration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    // Lifecycle
    TableOpened,
    OrderClosed,

    // Items and rounds
    ItemsAdded,
    ItemModified,
    RoundSent,
    RoundRenamed,

    // Money
    DiscountApplied,
    PaymentAdded,
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEventType::TableOpened => write!(f, "TABLE_OPENED"),
            OrderEventType::OrderClosed => write!(f, "ORDER_CLOSED"),
            OrderEventType::ItemsAdded => write!(f, "ITEMS_ADDED"),
            OrderEventType::ItemModified => write!(f, "ITEM_MODIFIED"),
            OrderEventType::RoundSent => write!(f, "ROUND_SENT"),
            OrderEventType::RoundRenamed => write!(f, "ROUND_RENAMED"),
            OrderEventType::DiscountApplied => write!(f, "DISCOUNT_APPLIED"),
            OrderEventType::PaymentAdded => write!(f, "PAYMENT_ADDED"),
        }
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Lifecycle ==========
    TableOpened {
        table_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        table_name: Option<String>,
        guest_count: i32,
        /// VAT rate frozen at open
        vat_rate: f64,
        /// Currency minor-unit precision frozen at open
        currency_decimals: u32,
    },

    OrderClosed {
        final_total: f64,
        payment_summary: Vec<PaymentSummaryItem>,
    },

    // ========== Items and Rounds ==========
    ItemsAdded {
        /// Complete snapshots of added items (round already assigned)
        items: Vec<OrderItemSnapshot>,
        /// Round the batch landed in
        round: u32,
    },

    ItemModified {
        instance_id: String,
        changes: ItemChanges,
        /// Previous values for comparison
        previous: ItemChanges,
    },

    RoundSent {
        round: u32,
        /// Items newly marked as sent (already-sent items excluded)
        instance_ids: Vec<String>,
    },

    RoundRenamed {
        round: u32,
        label: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        previous_label: Option<String>,
    },

    // ========== Money ==========
    DiscountApplied {
        discount: DiscountInfo,
        subtotal: f64,
        new_total: f64,
    },

    PaymentAdded {
        payment_id: String,
        method: PaymentMethod,
        amount: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl OrderEvent {
    /// Create a new event; the server timestamp is always set here
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        order_id: String,
        operator_id: String,
        operator_name: String,
        command_id: String,
        client_timestamp: Option<i64>,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id,
            timestamp: chrono::Utc::now().timestamp_millis(),
            client_timestamp,
            operator_id,
            operator_name,
            command_id,
            event_type,
            payload,
        }
    }
}
