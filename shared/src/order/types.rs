//! Shared types for order event sourcing

use serde::{Deserialize, Serialize};

// ============================================================================
// Payment Method
// ============================================================================

/// Payment method for recorded payments
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    /// Prepaid gift card issued by the store
    GiftCard,
    /// Third-party meal voucher card
    MealVoucher,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "CASH"),
            PaymentMethod::Card => write!(f, "CARD"),
            PaymentMethod::GiftCard => write!(f, "GIFT_CARD"),
            PaymentMethod::MealVoucher => write!(f, "MEAL_VOUCHER"),
        }
    }
}

// ============================================================================
// Order Item Types
// ============================================================================

/// Order item input - for adding items (without instance_id)
///
/// `round` is optional on purpose: absence means "let the engine decide"
/// according to the round assignment policy. The explicit variant is only
/// honored when it does not reorder existing rounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    /// Product ID
    pub product_id: String,
    /// Product name snapshot
    pub name: String,
    /// Quantity
    pub quantity: i32,
    /// Unit price
    pub unit_price: f64,
    /// Explicit round number (must not be below the current round)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    /// Seat/diner assignment for bill splitting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<u32>,
    /// Rush flag for the kitchen
    #[serde(default)]
    pub urgent: bool,
    /// Free-text note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Order item snapshot - complete snapshot for event recording
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemSnapshot {
    /// Instance ID (unique per line)
    pub instance_id: String,
    /// Product ID
    pub product_id: String,
    /// Product name snapshot
    pub name: String,
    /// Quantity
    pub quantity: i32,
    /// Unit price
    pub unit_price: f64,
    /// Line total (computed: unit_price * quantity)
    pub line_total: f64,
    /// Round (course) this item belongs to, always >= 1
    pub round: u32,
    /// Seat/diner assignment for bill splitting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<u32>,
    /// Rush flag for the kitchen
    #[serde(default)]
    pub urgent: bool,
    /// Free-text note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Whether the item has been fired to preparation.
    /// Sent items reject price/quantity modification.
    #[serde(default)]
    pub sent: bool,
    /// Creation timestamp (in-round ordering key)
    pub created_at: i64,
}

/// Item changes for modification (None = no change)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ItemChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ItemChanges {
    /// Whether the change set touches fields frozen after kitchen send
    pub fn touches_frozen_fields(&self) -> bool {
        self.quantity.is_some() || self.unit_price.is_some()
    }
}

// ============================================================================
// Rounds
// ============================================================================

/// A derived course grouping of order items. Never persisted; computed
/// from the item list on demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Round {
    pub number: u32,
    pub label: String,
    pub items: Vec<OrderItemSnapshot>,
}

// ============================================================================
// Payments
// ============================================================================

/// Payment input for recording a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub method: PaymentMethod,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Payment record in snapshot. Append-only: recorded payments are never
/// updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub method: PaymentMethod,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timestamp: i64,
}

/// Payment summary line for a closed order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSummaryItem {
    pub method: PaymentMethod,
    pub amount: f64,
}

// ============================================================================
// Discounts
// ============================================================================

/// Discount type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    Percentage,
    FixedAmount,
    Coupon,
}

/// Discount request against the current order total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRequest {
    pub kind: DiscountKind,
    /// Percentage (0-100] or fixed amount, depending on `kind`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Applied discount stored on the order snapshot.
///
/// The engine stores the discount *spec*; totals are recomputed from it,
/// so re-applying can never compound. Presence of this struct on a
/// snapshot is the "discount already applied" guard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscountInfo {
    pub kind: DiscountKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Computed discount amount at the current subtotal
    pub amount: f64,
    pub applied_at: i64,
}

// ============================================================================
// Split Check
// ============================================================================

/// Derived per-seat cost breakdown entry, read-only.
/// `seat: None` is the distinguished unassigned bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitCheckEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<u32>,
    pub item_count: usize,
    pub person_amount: f64,
}

// ============================================================================
// Command Responses
// ============================================================================

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Order ID affected (new order ID for OpenTable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Operator-facing confirmation (amount recorded, new total,
    /// invoice number) or follow-up notice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, order_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            message: None,
            error: None,
        }
    }

    pub fn success_with_message(
        command_id: String,
        order_id: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            message: None,
            error: Some(error),
        }
    }

    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            order_id: None,
            message: None,
            error: None,
        }
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes (frontend handles localization)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    OrderNotFound,
    OrderAlreadyClosed,
    ItemNotFound,
    ItemAlreadySent,
    RoundNotFound,
    ValidationError,
    Overpayment,
    InvalidCoupon,
    NotFullyPaid,
    DiscountAlreadyApplied,
    DiscountBelowPaid,
    StaleVersion,
    RemoteError,
    InternalError,
    // Storage errors
    StorageFull,
    OutOfMemory,
    StorageCorrupted,
    SystemBusy,
}
