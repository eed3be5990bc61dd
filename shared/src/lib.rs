//! Shared types for the POS order engine
//!
//! Common types used across crates: order commands, events, snapshots,
//! and the derived round/split-check views.

pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
