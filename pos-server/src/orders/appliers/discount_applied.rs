//! DiscountApplied event applier
//!
//! Stores the discount spec on the snapshot and recalculates totals from
//! it. Because the spec (not a pre-computed total) is stored, replaying
//! the event or recalculating later never compounds the discount.

use crate::orders::money;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// DiscountApplied applier
pub struct DiscountAppliedApplier;

impl EventApplier for DiscountAppliedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::DiscountApplied { discount, .. } = &event.payload {
            snapshot.discount = Some(discount.clone());
            money::recalculate_totals(snapshot);

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}
