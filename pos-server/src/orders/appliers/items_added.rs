//! ItemsAdded event applier
//!
//! Appends the item snapshots recorded in the event and recalculates
//! order totals. Round assignment already happened in the action; the
//! payload carries complete item snapshots.

use crate::orders::money;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemsAdded applier
pub struct ItemsAddedApplier;

impl EventApplier for ItemsAddedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemsAdded { items, .. } = &event.payload {
            snapshot.items.extend(items.iter().cloned());
            money::recalculate_totals(snapshot);

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}
