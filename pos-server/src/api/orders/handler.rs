//! Order API Handlers
//!
//! Mutating endpoints wrap the request into an `OrderCommand` and hand it
//! to the `OrdersManager`; the HTTP status is derived from the command
//! error code. Query endpoints read snapshots directly.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::orders::{compute_split_check, group_by_round};
use crate::utils::{AppError, AppResult, command_status};
use shared::order::{
    CommandResponse, DiscountRequest, ItemChanges, OrderCommand, OrderCommandPayload,
    OrderItemInput, OrderSnapshot, PaymentInput, PaymentRecord, Round, SplitCheckEntry,
};

/// Command envelope fields shared by every mutating request
#[derive(Debug, Deserialize)]
pub struct CommandEnvelope {
    /// Idempotency key; generated server-side when absent
    #[serde(default)]
    pub command_id: Option<String>,
    pub operator_id: String,
    pub operator_name: String,
    /// Client timestamp (Unix ms); server time when absent
    #[serde(default)]
    pub timestamp: Option<i64>,
    /// Optimistic concurrency token (order's last_sequence)
    #[serde(default)]
    pub expected_version: Option<u64>,
}

impl CommandEnvelope {
    fn into_command(self, payload: OrderCommandPayload) -> OrderCommand {
        OrderCommand {
            command_id: self
                .command_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            operator_id: self.operator_id,
            operator_name: self.operator_name,
            timestamp: self.timestamp.unwrap_or_else(shared::util::now_millis),
            expected_version: self.expected_version,
            payload,
        }
    }
}

// The concrete return type keeps the handlers free of the `&ServerState`
// borrow; `impl IntoResponse` here would capture its lifetime.
async fn run(
    state: &ServerState,
    envelope: CommandEnvelope,
    payload: OrderCommandPayload,
) -> (StatusCode, Json<CommandResponse>) {
    let response = state
        .orders
        .execute_command(envelope.into_command(payload))
        .await;
    (command_status(&response), Json(response))
}

fn load_snapshot(state: &ServerState, order_id: &str) -> AppResult<OrderSnapshot> {
    state
        .orders
        .load_order(order_id)
        .map_err(|e| AppError::storage(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))
}

// ========== Mutations ==========

/// Open-or-get request for a table
#[derive(Debug, Deserialize)]
pub struct OpenTableRequest {
    #[serde(flatten)]
    pub envelope: CommandEnvelope,
    #[serde(default)]
    pub table_name: Option<String>,
    pub guest_count: i32,
}

/// Open an order on a table, or return the one already open
pub async fn open_table(
    State(state): State<ServerState>,
    Path(table_id): Path<String>,
    Json(payload): Json<OpenTableRequest>,
) -> impl IntoResponse {
    run(
        &state,
        payload.envelope,
        OrderCommandPayload::OpenTable {
            table_id,
            table_name: payload.table_name,
            guest_count: payload.guest_count,
        },
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct AddItemsRequest {
    #[serde(flatten)]
    pub envelope: CommandEnvelope,
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub new_round: bool,
}

/// Add items to an order
pub async fn add_items(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AddItemsRequest>,
) -> impl IntoResponse {
    run(
        &state,
        payload.envelope,
        OrderCommandPayload::AddItems {
            order_id: id,
            items: payload.items,
            new_round: payload.new_round,
        },
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct ModifyItemRequest {
    #[serde(flatten)]
    pub envelope: CommandEnvelope,
    #[serde(flatten)]
    pub changes: ItemChanges,
}

/// Modify a single item line
pub async fn modify_item(
    State(state): State<ServerState>,
    Path((id, instance_id)): Path<(String, String)>,
    Json(payload): Json<ModifyItemRequest>,
) -> impl IntoResponse {
    run(
        &state,
        payload.envelope,
        OrderCommandPayload::ModifyItem {
            order_id: id,
            instance_id,
            changes: payload.changes,
        },
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct SendRoundRequest {
    #[serde(flatten)]
    pub envelope: CommandEnvelope,
}

/// Fire a round to preparation
pub async fn send_round(
    State(state): State<ServerState>,
    Path((id, round)): Path<(String, u32)>,
    Json(payload): Json<SendRoundRequest>,
) -> impl IntoResponse {
    run(
        &state,
        payload.envelope,
        OrderCommandPayload::SendRound {
            order_id: id,
            round,
        },
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct RenameRoundRequest {
    #[serde(flatten)]
    pub envelope: CommandEnvelope,
    pub label: String,
}

/// Override the display label of a round
pub async fn rename_round(
    State(state): State<ServerState>,
    Path((id, round)): Path<(String, u32)>,
    Json(payload): Json<RenameRoundRequest>,
) -> impl IntoResponse {
    run(
        &state,
        payload.envelope,
        OrderCommandPayload::RenameRound {
            order_id: id,
            round,
            label: payload.label,
        },
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct ApplyDiscountRequest {
    #[serde(flatten)]
    pub envelope: CommandEnvelope,
    #[serde(flatten)]
    pub request: DiscountRequest,
}

/// Apply a discount (percentage, fixed amount, or coupon)
pub async fn apply_discount(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ApplyDiscountRequest>,
) -> impl IntoResponse {
    run(
        &state,
        payload.envelope,
        OrderCommandPayload::ApplyDiscount {
            order_id: id,
            request: payload.request,
        },
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct AddPaymentRequest {
    #[serde(flatten)]
    pub envelope: CommandEnvelope,
    #[serde(flatten)]
    pub payment: PaymentInput,
}

/// Record a payment against the order
pub async fn add_payment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AddPaymentRequest>,
) -> impl IntoResponse {
    run(
        &state,
        payload.envelope,
        OrderCommandPayload::AddPayment {
            order_id: id,
            payment: payload.payment,
        },
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct CloseOrderRequest {
    #[serde(flatten)]
    pub envelope: CommandEnvelope,
}

/// Close a fully paid order
pub async fn close_order(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CloseOrderRequest>,
) -> impl IntoResponse {
    run(
        &state,
        payload.envelope,
        OrderCommandPayload::CloseOrder { order_id: id },
    )
    .await
}

// ========== Queries ==========

/// List all open orders
pub async fn list_orders(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<OrderSnapshot>>> {
    let orders = state
        .orders
        .storage()
        .get_active_orders()
        .map_err(|e| AppError::storage(e.to_string()))?;
    Ok(Json(orders))
}

/// Get an order snapshot
pub async fn get_order(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderSnapshot>> {
    Ok(Json(load_snapshot(&state, &id)?))
}

/// Get the order grouped into rounds
pub async fn get_rounds(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Round>>> {
    let snapshot = load_snapshot(&state, &id)?;
    Ok(Json(group_by_round(&snapshot)))
}

/// Get the payment ledger
pub async fn list_payments(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<PaymentRecord>>> {
    let snapshot = load_snapshot(&state, &id)?;
    Ok(Json(snapshot.payments))
}

/// Get the per-seat split of the check
pub async fn split_check(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<SplitCheckEntry>>> {
    let snapshot = load_snapshot(&state, &id)?;
    Ok(Json(compute_split_check(
        &snapshot.items,
        snapshot.currency_decimals,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_state(work_dir: &std::path::Path) -> ServerState {
        let config = Config {
            work_dir: work_dir.to_str().unwrap().to_string(),
            http_port: 0,
            vat_rate: 21.0,
            currency_decimals: 2,
            coupon_service_url: None,
            invoice_service_url: None,
            environment: "development".to_string(),
        };
        ServerState::initialize(&config).unwrap()
    }

    fn envelope() -> CommandEnvelope {
        CommandEnvelope {
            command_id: None,
            operator_id: "op-1".to_string(),
            operator_name: "Ana".to_string(),
            timestamp: None,
            expected_version: None,
        }
    }

    #[tokio::test]
    async fn test_run_maps_success_to_ok_with_order_id() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let (status, Json(response)) = run(
            &state,
            envelope(),
            OrderCommandPayload::OpenTable {
                table_id: "T1".to_string(),
                table_name: None,
                guest_count: 2,
            },
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(response.success);
        assert!(response.order_id.is_some());
    }

    #[tokio::test]
    async fn test_run_maps_missing_order_to_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let (status, Json(response)) = run(
            &state,
            envelope(),
            OrderCommandPayload::CloseOrder {
                order_id: "no-such-order".to_string(),
            },
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!response.success);
    }
}
