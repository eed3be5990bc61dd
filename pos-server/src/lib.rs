//! POS order engine server
//!
//! Event-sourced order round & split-check payment engine:
//!
//! - **orders**: command processing, event appliers, redb persistence,
//!   round grouping, split-check calculation, money arithmetic
//! - **collab**: external collaborator clients (coupon validation,
//!   invoice issuance)
//! - **api**: axum HTTP surface for the terminal UI
//! - **core**: server state and configuration
//! - **utils**: logging and API error types

pub mod api;
pub mod collab;
pub mod config;
pub mod core;
pub mod orders;
pub mod utils;
