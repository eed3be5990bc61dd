//! Core module - server state

pub mod state;

pub use state::ServerState;
