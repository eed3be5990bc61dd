//! Order API Module
//!
//! Mutations are command submissions processed by the OrdersManager;
//! queries read snapshots from storage.

mod handler;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/tables/{table_id}/open", post(handler::open_table))
        .route("/api/orders", get(handler::list_orders))
        .route("/api/orders/{id}", get(handler::get_order))
        .route("/api/orders/{id}/rounds", get(handler::get_rounds))
        .route("/api/orders/{id}/items", post(handler::add_items))
        .route(
            "/api/orders/{id}/items/{instance_id}",
            patch(handler::modify_item),
        )
        .route(
            "/api/orders/{id}/rounds/{round}/send",
            post(handler::send_round),
        )
        .route(
            "/api/orders/{id}/rounds/{round}/label",
            put(handler::rename_round),
        )
        .route("/api/orders/{id}/discount", post(handler::apply_discount))
        .route(
            "/api/orders/{id}/payments",
            post(handler::add_payment).get(handler::list_payments),
        )
        .route("/api/orders/{id}/split-check", get(handler::split_check))
        .route("/api/orders/{id}/close", post(handler::close_order))
}
