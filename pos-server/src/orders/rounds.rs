//! Round grouping - partitioning items into ordered course buckets
//!
//! Rounds are derived, never persisted: grouping is recomputed from the
//! item list on every query. Only label overrides live on the snapshot.

use shared::order::{OrderItemSnapshot, OrderSnapshot, Round};

/// Normalize an optional round number at the grouping boundary.
/// Items carry `round: u32` once stored; this handles command input.
pub fn normalize_round(round: Option<u32>) -> u32 {
    round.unwrap_or(1).max(1)
}

/// Partition items into rounds, ascending by round number, items within
/// a round ascending by creation time. Pure and stable: the same input
/// always yields the same output.
pub fn group_by_round(snapshot: &OrderSnapshot) -> Vec<Round> {
    let mut rounds: Vec<Round> = Vec::new();

    let mut sorted: Vec<&OrderItemSnapshot> = snapshot.items.iter().collect();
    sorted.sort_by(|a, b| {
        a.round
            .cmp(&b.round)
            .then(a.created_at.cmp(&b.created_at))
    });

    for item in sorted {
        match rounds.last_mut() {
            Some(round) if round.number == item.round => round.items.push(item.clone()),
            _ => rounds.push(Round {
                number: item.round,
                label: snapshot.round_label(item.round),
                items: vec![item.clone()],
            }),
        }
    }

    rounds
}

/// Next round number: max over existing items plus one, or 1 for an
/// empty order. New items do NOT advance rounds automatically; callers
/// opt in with the `new_round` flag on AddItems.
pub fn next_round_number(items: &[OrderItemSnapshot]) -> u32 {
    items.iter().map(|i| i.round).max().map_or(1, |max| max + 1)
}

/// Highest existing round number, or 1 for an empty order. This is the
/// default target for items added without an explicit round.
pub fn current_round_number(items: &[OrderItemSnapshot]) -> u32 {
    items.iter().map(|i| i.round).max().unwrap_or(1)
}

/// Whether any item belongs to the given round. Renames of empty rounds
/// are rejected to avoid orphaned label metadata.
pub fn round_exists(snapshot: &OrderSnapshot, round: u32) -> bool {
    snapshot.items.iter().any(|i| i.round == round)
}
