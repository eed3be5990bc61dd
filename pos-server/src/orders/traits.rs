//! Core traits and context for the order command pipeline

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use redb::WriteTransaction;
use std::collections::HashMap;
use thiserror::Error;

use super::money::CurrencyConfig;
use super::storage::OrderStorage;
use shared::order::{OrderEvent, OrderSnapshot};

// enum_dispatch emits the `EventApplier for EventAction` impl at the trait
// definition site, so the enum and its variant types must be in scope here.
use super::appliers::{
    DiscountAppliedApplier, EventAction, ItemModifiedApplier, ItemsAddedApplier,
    OrderClosedApplier, PaymentAddedApplier, RoundRenamedApplier, RoundSentApplier,
    TableOpenedApplier,
};

/// Errors produced while executing a command against an order
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order already closed: {0}")]
    OrderAlreadyClosed(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Item already sent to preparation: {0}")]
    ItemAlreadySent(String),

    #[error("Round {0} has no items")]
    RoundNotFound(u32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Payment amount ({amount:.2}) exceeds remaining unpaid ({remaining:.2})")]
    Overpayment { amount: f64, remaining: f64 },

    #[error("Coupon rejected: {0}")]
    InvalidCoupon(String),

    #[error("Order not fully paid: paid {paid:.2}, required {required:.2}")]
    NotFullyPaid { paid: f64, required: f64 },

    #[error("A discount has already been applied to this order")]
    DiscountAlreadyApplied,

    #[error("Discount would drop total ({new_total:.2}) below paid amount ({paid:.2})")]
    DiscountBelowPaid { paid: f64, new_total: f64 },

    #[error("Stale version: expected {expected}, current {actual}")]
    StaleVersion { expected: u64, actual: u64 },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Metadata accompanying every command execution
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub operator_id: String,
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
}

/// Execution context handed to command handlers.
///
/// Wraps the open write transaction and tracks snapshots modified during
/// this command, so that later reads within the same command observe
/// earlier writes before anything is persisted.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a OrderStorage,
    sequence: u64,
    modified: HashMap<String, OrderSnapshot>,
    /// Minor-unit precision for money rounding in actions
    pub currency: CurrencyConfig,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        txn: &'a WriteTransaction,
        storage: &'a OrderStorage,
        current_sequence: u64,
        currency: CurrencyConfig,
    ) -> Self {
        Self {
            txn,
            storage,
            sequence: current_sequence,
            modified: HashMap::new(),
            currency,
        }
    }

    /// Load a snapshot, preferring uncommitted modifications from this
    /// command over the stored version
    pub fn load_snapshot(&self, order_id: &str) -> Result<OrderSnapshot, OrderError> {
        if let Some(snapshot) = self.modified.get(order_id) {
            return Ok(snapshot.clone());
        }
        self.storage
            .get_snapshot_txn(self.txn, order_id)
            .map_err(|e| OrderError::Storage(e.to_string()))?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    /// Allocate the next global sequence number
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Stage a modified snapshot for persistence at commit
    pub fn save_snapshot(&mut self, snapshot: OrderSnapshot) {
        self.modified.insert(snapshot.order_id.clone(), snapshot);
    }

    /// Snapshots modified during this command
    pub fn modified_snapshots(&self) -> impl Iterator<Item = &OrderSnapshot> {
        self.modified.values()
    }
}

/// A command handler validates a command against current state and
/// produces events. Handlers never mutate snapshots directly.
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError>;
}

/// An event applier folds one event into a snapshot. Appliers are PURE:
/// all validation already happened in the command handler.
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent);
}
