//! OrdersManager - Core command processing and event generation
//!
//! This module handles:
//! - Command validation and processing
//! - Event generation with global sequence numbers
//! - Persistence to redb (transactional)
//! - Snapshot updates
//! - Event broadcasting
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Resolve collaborators (coupon lookup, before the transaction)
//!     ├─ 3. Begin write transaction
//!     ├─ 4. Create CommandContext
//!     ├─ 5. Convert command to action and execute
//!     ├─ 6. Apply events to snapshots via EventApplier
//!     ├─ 7. Persist events and snapshots
//!     ├─ 8. Mark command processed
//!     ├─ 9. Commit transaction
//!     ├─ 10. Broadcast event(s), issue invoice on close (best-effort)
//!     └─ 11. Return response
//! ```

mod error;
pub use error::*;

use super::actions::{ApplyDiscountAction, CommandAction, OpenTableAction};
use super::appliers::EventAction;
use super::money::CurrencyConfig;
use super::reducer::replay;
use super::storage::{OrderStorage, StorageError};
use super::traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier, OrderError};
use crate::collab::{CouponValidator, InvoiceIssuer};
use shared::order::{
    CommandResponse, DiscountKind, EventPayload, OrderCommand, OrderCommandPayload, OrderEvent,
    OrderSnapshot, OrderStatus,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 65536;

/// OrdersManager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect server restarts and trigger full resync.
pub struct OrdersManager {
    storage: OrderStorage,
    event_tx: broadcast::Sender<OrderEvent>,
    /// Server instance epoch - unique ID generated on startup
    epoch: String,
    /// Minor-unit precision frozen onto new orders
    currency: CurrencyConfig,
    /// VAT rate (percent) frozen onto new orders
    vat_rate: f64,
    /// Coupon service, required for COUPON discounts
    coupon_validator: Option<Arc<dyn CouponValidator>>,
    /// Invoice service, consulted after a successful close
    invoice_issuer: Option<Arc<dyn InvoiceIssuer>>,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .field("vat_rate", &self.vat_rate)
            .finish()
    }
}

impl OrdersManager {
    /// Create a new OrdersManager with the given database path
    pub fn new(
        db_path: impl AsRef<Path>,
        vat_rate: f64,
        currency: CurrencyConfig,
    ) -> ManagerResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "OrdersManager started with new epoch");
        Ok(Self {
            storage,
            event_tx,
            epoch,
            currency,
            vat_rate,
            coupon_validator: None,
            invoice_issuer: None,
        })
    }

    /// Create an OrdersManager with existing storage (for testing)
    #[cfg(test)]
    pub fn with_storage(storage: OrderStorage) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        Self {
            storage,
            event_tx,
            epoch,
            currency: CurrencyConfig::default(),
            vat_rate: 21.0,
            coupon_validator: None,
            invoice_issuer: None,
        }
    }

    /// Set the coupon service used to resolve COUPON discounts
    pub fn set_coupon_validator(&mut self, validator: Arc<dyn CouponValidator>) {
        self.coupon_validator = Some(validator);
    }

    /// Set the invoice service consulted when orders close
    pub fn set_invoice_issuer(&mut self, issuer: Arc<dyn InvoiceIssuer>) {
        self.invoice_issuer = Some(issuer);
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    /// Last committed global sequence number. Together with the epoch this
    /// lets clients detect missed events and trigger a resync.
    pub fn current_sequence(&self) -> ManagerResult<u64> {
        Ok(self.storage.get_current_sequence()?)
    }

    /// Load an order snapshot, rebuilding it from the event stream when
    /// the stored snapshot is missing or unreadable. The event stream is
    /// the authoritative record; snapshots are a cache.
    pub fn load_order(&self, order_id: &str) -> ManagerResult<Option<OrderSnapshot>> {
        match self.storage.get_snapshot(order_id) {
            Ok(Some(snapshot)) => return Ok(Some(snapshot)),
            Ok(None) => {}
            Err(StorageError::Serialization(e)) => {
                tracing::warn!(order_id = %order_id, error = %e, "Snapshot unreadable, replaying event stream");
            }
            Err(e) => return Err(e.into()),
        }

        let events = self.storage.get_events_for_order(order_id)?;
        if events.is_empty() {
            return Ok(None);
        }
        tracing::info!(order_id = %order_id, event_count = events.len(), "Rebuilt snapshot from event stream");
        Ok(Some(replay(order_id, &events)))
    }

    /// Execute a command and return the response
    pub async fn execute_command(&self, cmd: OrderCommand) -> CommandResponse {
        let is_close = matches!(cmd.payload, OrderCommandPayload::CloseOrder { .. });
        match self.process_command(cmd.clone()).await {
            Ok((mut response, events)) => {
                let committed_events = !events.is_empty();
                // Broadcast events after successful commit
                for event in events {
                    if self.event_tx.send(event).is_err() {
                        tracing::warn!("Event broadcast failed: no active receivers");
                        break;
                    }
                }
                if is_close && committed_events {
                    self.issue_invoice(&mut response).await;
                }
                response
            }
            Err(err) => CommandResponse::error(cmd.command_id, err.into()),
        }
    }

    /// Issue an invoice for a freshly closed order, best-effort.
    ///
    /// Runs after the closing transaction committed: a failure here is
    /// reported to the operator but never rolls the close back.
    async fn issue_invoice(&self, response: &mut CommandResponse) {
        let Some(issuer) = &self.invoice_issuer else {
            return;
        };
        let Some(order_id) = response.order_id.clone() else {
            return;
        };

        let snapshot = match self.load_order(&order_id) {
            Ok(Some(s)) => s,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Failed to load closed order for invoicing");
                return;
            }
        };

        let note = match issuer.create_invoice(&snapshot).await {
            Ok(number) => {
                tracing::info!(order_id = %order_id, invoice_number = %number, "Invoice issued");
                format!("invoice {number}")
            }
            Err(e) => {
                tracing::warn!(order_id = %order_id, error = %e, "Invoice issuance failed, order stays closed");
                "invoice issuance failed, retry from the closed order".to_string()
            }
        };

        response.message = Some(match response.message.take() {
            Some(m) => format!("{m}; {note}"),
            None => note,
        });
    }

    /// Resolve a COUPON discount with the coupon service, before any
    /// transaction opens. Returns the granted amount.
    async fn resolve_coupon(&self, cmd: &OrderCommand) -> ManagerResult<Option<f64>> {
        let OrderCommandPayload::ApplyDiscount { order_id, request } = &cmd.payload else {
            return Ok(None);
        };
        if request.kind != DiscountKind::Coupon {
            return Ok(None);
        }

        let code = request.coupon_code.as_deref().ok_or_else(|| {
            OrderError::Validation("coupon_code is required for COUPON discounts".to_string())
        })?;
        let validator = self.coupon_validator.as_ref().ok_or_else(|| {
            ManagerError::CouponService("coupon service not configured".to_string())
        })?;

        let order_amount = self
            .load_order(order_id)?
            .map(|s| s.subtotal)
            .unwrap_or(0.0);

        let resolution = validator.validate(code, order_amount).await?;
        tracing::debug!(order_id = %order_id, code = %code, amount = resolution.discount_amount, "Coupon resolved");
        Ok(Some(resolution.discount_amount))
    }

    /// Process command and return response with events
    ///
    /// Uses the action-based architecture:
    /// 1. Convert command to CommandAction
    /// 2. Execute action to generate events
    /// 3. Apply events to snapshots via EventApplier
    /// 4. Persist everything atomically
    async fn process_command(
        &self,
        cmd: OrderCommand,
    ) -> ManagerResult<(CommandResponse, Vec<OrderEvent>)> {
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        // 1. Idempotency check (before transaction)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 2. OpenTable is fetch-or-create: an open order already claiming
        // the table is returned instead of a second one being created
        if let OrderCommandPayload::OpenTable { table_id, .. } = &cmd.payload
            && let Some(existing) = self.storage.find_active_order_for_table(table_id)?
        {
            tracing::info!(table_id = %table_id, order_id = %existing, "Table already open, returning existing order");
            return Ok((
                CommandResponse::success_with_message(
                    cmd.command_id,
                    Some(existing),
                    "table already open",
                ),
                vec![],
            ));
        }

        // 3. Collaborator work happens BEFORE the transaction: redb doesn't
        // allow nested write transactions, and the write transaction must
        // never wait on the network
        let coupon_value = self.resolve_coupon(&cmd).await?;
        let pre_generated_order_id = matches!(cmd.payload, OrderCommandPayload::OpenTable { .. })
            .then(|| uuid::Uuid::new_v4().to_string());

        // 4. Begin write transaction
        let txn = self.storage.begin_write()?;

        // Double-check idempotency within transaction
        if self
            .storage
            .is_command_processed_txn(&txn, &cmd.command_id)?
        {
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // Re-check table occupancy within the transaction: two concurrent
        // opens can both pass the read pre-check; the later writer must
        // still find the order the first one committed
        if let OrderCommandPayload::OpenTable { table_id, .. } = &cmd.payload
            && let Some(existing) = self
                .storage
                .find_active_order_for_table_txn(&txn, table_id)?
        {
            tracing::info!(table_id = %table_id, order_id = %existing, "Table claimed concurrently, returning existing order");
            return Ok((
                CommandResponse::success_with_message(
                    cmd.command_id,
                    Some(existing),
                    "table already open",
                ),
                vec![],
            ));
        }

        // 5. Optimistic concurrency: when the client pinned a version, it
        // must match the order's last applied sequence
        if let Some(expected) = cmd.expected_version
            && let Some(order_id) = cmd.payload.order_id()
            && let Some(snapshot) = self.storage.get_snapshot_txn(&txn, order_id)?
            && snapshot.last_sequence != expected
        {
            return Err(OrderError::StaleVersion {
                expected,
                actual: snapshot.last_sequence,
            }
            .into());
        }

        // 6. Create context and metadata; the sequence counter is read
        //    inside the transaction
        let current_sequence = self.storage.get_sequence_txn(&txn)?;
        let mut ctx = CommandContext::new(&txn, &self.storage, current_sequence, self.currency);
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            operator_id: cmd.operator_id.clone(),
            operator_name: cmd.operator_name.clone(),
            timestamp: cmd.timestamp,
        };

        // 7. Convert to action and execute
        // OpenTable carries the pre-generated order_id and the configured
        // VAT rate; ApplyDiscount carries the resolved coupon amount
        let action: CommandAction = match &cmd.payload {
            OrderCommandPayload::OpenTable {
                table_id,
                table_name,
                guest_count,
            } => {
                let order_id = pre_generated_order_id.clone().ok_or_else(|| {
                    OrderError::Storage("order_id must be pre-generated for OpenTable".to_string())
                })?;
                CommandAction::OpenTable(OpenTableAction {
                    order_id,
                    table_id: table_id.clone(),
                    table_name: table_name.clone(),
                    guest_count: *guest_count,
                    vat_rate: self.vat_rate,
                })
            }
            OrderCommandPayload::ApplyDiscount { order_id, request } => {
                CommandAction::ApplyDiscount(ApplyDiscountAction {
                    order_id: order_id.clone(),
                    request: request.clone(),
                    coupon_value,
                })
            }
            _ => (&cmd).into(),
        };
        let events = action.execute(&mut ctx, &metadata).await?;

        // 8. Apply events to snapshots
        for event in &events {
            let mut snapshot = ctx
                .load_snapshot(&event.order_id)
                .unwrap_or_else(|_| OrderSnapshot::new(event.order_id.clone()));

            let applier: EventAction = event.into();
            applier.apply(&mut snapshot, event);

            ctx.save_snapshot(snapshot);
        }

        // 9. Persist events
        for event in &events {
            self.storage.store_event(&txn, event)?;
        }

        // 10. Persist snapshots and update the active order index
        for snapshot in ctx.modified_snapshots() {
            self.storage.store_snapshot(&txn, snapshot)?;

            match snapshot.status {
                OrderStatus::Open => {
                    self.storage.mark_order_active(&txn, &snapshot.order_id)?;
                }
                OrderStatus::Closed => {
                    self.storage.mark_order_inactive(&txn, &snapshot.order_id)?;
                }
            }
        }

        // 11. Update sequence counter
        let max_sequence = events
            .iter()
            .map(|e| e.sequence)
            .max()
            .unwrap_or(current_sequence);
        if max_sequence > current_sequence {
            self.storage.set_sequence(&txn, max_sequence)?;
        }

        // 12. Mark command processed
        self.storage.mark_command_processed(&txn, &cmd.command_id)?;

        // 13. Build the operator-facing confirmation, then commit
        let message = response_message(&events);
        drop(ctx);
        txn.commit().map_err(StorageError::from)?;

        let order_id = events
            .first()
            .map(|e| e.order_id.clone())
            .or_else(|| cmd.payload.order_id().map(str::to_string));
        tracing::info!(command_id = %cmd.command_id, order_id = ?order_id, event_count = events.len(), "Command processed successfully");

        let response = match message {
            Some(m) => CommandResponse::success_with_message(cmd.command_id, order_id, m),
            None => CommandResponse::success(cmd.command_id, order_id),
        };
        Ok((response, events))
    }
}

/// Key numbers for the operator, derived from the committed events
fn response_message(events: &[OrderEvent]) -> Option<String> {
    events.iter().find_map(|event| match &event.payload {
        EventPayload::PaymentAdded { amount, method, .. } => {
            Some(format!("payment {amount:.2} ({method}) recorded"))
        }
        EventPayload::DiscountApplied {
            discount,
            new_total,
            ..
        } => Some(format!(
            "discount {:.2} applied, new total {:.2}",
            discount.amount, new_total
        )),
        EventPayload::OrderClosed { final_total, .. } => {
            Some(format!("order closed, total {final_total:.2}"))
        }
        _ => None,
    })
}
