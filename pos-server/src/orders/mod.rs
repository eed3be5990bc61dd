//! Order Event Sourcing Module
//!
//! This module implements the order round & payment engine using event
//! sourcing:
//!
//! - **manager**: Core OrdersManager for command processing and event generation
//! - **storage**: redb-based persistence layer for events, snapshots, and indices
//! - **reducer**: Event replay and snapshot computation
//! - **rounds**: Round grouping and numbering (derived from items)
//! - **split_check**: Per-seat split of the check
//! - **money**: Decimal money arithmetic and validation
//!
//! # Architecture
//!
//! ```text
//! Command → OrdersManager → Event → Storage (redb)
//!                 ↓                      ↓
//!              Broadcast          Snapshot Update
//!                 ↓
//!           All Subscribers
//! ```
//!
//! # Data Flow
//!
//! 1. Client sends OrderCommand via the HTTP API
//! 2. OrdersManager validates and processes command
//! 3. OrderEvent is generated with global sequence
//! 4. Event is persisted to redb (transactional)
//! 5. Snapshot is updated
//! 6. Event is broadcast to all subscribers
//! 7. CommandResponse is returned to client

pub mod actions;
pub mod appliers;
pub mod manager;
pub mod money;
pub mod reducer;
pub mod rounds;
pub mod split_check;
pub mod storage;
pub mod traits;

// Re-exports
pub use manager::OrdersManager;
pub use reducer::{input_to_item, replay};
pub use rounds::group_by_round;
pub use split_check::compute_split_check;
pub use storage::OrderStorage;

// Re-export shared types for convenience
pub use shared::order::{
    CommandError, CommandErrorCode, CommandResponse, EventPayload, OrderCommand,
    OrderCommandPayload, OrderEvent, OrderEventType, OrderSnapshot, OrderStatus,
};
