//! Order snapshot - computed state from event stream

use super::types::{DiscountInfo, OrderItemSnapshot, PaymentRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Order lifecycle status. `Closed` is terminal; there is no transition
/// back to `Open`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Open,
    Closed,
}

/// Order snapshot - computed from event stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    /// Order ID (assigned by server)
    pub order_id: String,
    /// Owning table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// Table name snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    /// Guest count
    pub guest_count: i32,
    /// Order status
    pub status: OrderStatus,
    /// Items in the order
    pub items: Vec<OrderItemSnapshot>,
    /// Payment records (append-only)
    pub payments: Vec<PaymentRecord>,
    /// Round label overrides, keyed by round number
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub round_labels: BTreeMap<u32, String>,
    /// Sum of item line totals before discount
    pub subtotal: f64,
    /// Applied discount spec, if any. Presence is the
    /// "discount already applied" guard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<DiscountInfo>,
    /// Total amount (subtotal minus discount, clamped at zero)
    pub total: f64,
    /// VAT rate in percent, frozen at open
    pub vat_rate: f64,
    /// Currency minor-unit precision, frozen at open
    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u32,
    /// Amount paid
    #[serde(default)]
    pub paid_amount: f64,
    /// Creation timestamp
    pub created_at: i64,
    /// Last update timestamp
    pub updated_at: i64,
    /// Last applied event sequence; doubles as the optimistic-concurrency
    /// version token
    pub last_sequence: u64,
}

fn default_currency_decimals() -> u32 {
    2
}

impl OrderSnapshot {
    /// Create a new empty order
    pub fn new(order_id: String) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            order_id,
            table_id: None,
            table_name: None,
            guest_count: 1,
            status: OrderStatus::Open,
            items: Vec::new(),
            payments: Vec::new(),
            round_labels: BTreeMap::new(),
            subtotal: 0.0,
            discount: None,
            total: 0.0,
            vat_rate: 0.0,
            currency_decimals: 2,
            paid_amount: 0.0,
            created_at: now,
            updated_at: now,
            last_sequence: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        self.status == OrderStatus::Closed
    }

    /// Remaining amount to pay, floored at 0 for display.
    /// Use `signed_balance` when the raw value matters.
    pub fn remaining_amount(&self) -> f64 {
        (self.total - self.paid_amount).max(0.0)
    }

    /// Raw balance, negative when overpaid. Kept signed so genuine
    /// overpayment bugs stay detectable.
    pub fn signed_balance(&self) -> f64 {
        self.total - self.paid_amount
    }

    pub fn is_fully_paid(&self) -> bool {
        self.paid_amount >= self.total
    }

    /// Label for a round: the stored override, or `"{n}. round"`
    pub fn round_label(&self, round: u32) -> String {
        self.round_labels
            .get(&round)
            .cloned()
            .unwrap_or_else(|| format!("{round}. round"))
    }

    /// Items belonging to a round
    pub fn items_in_round(&self, round: u32) -> impl Iterator<Item = &OrderItemSnapshot> {
        self.items.iter().filter(move |i| i.round == round)
    }
}

impl Default for OrderSnapshot {
    fn default() -> Self {
        Self::new(String::new())
    }
}
