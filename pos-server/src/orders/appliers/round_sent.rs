//! RoundSent event applier
//!
//! Marks the recorded item instances as fired to preparation. Sent items
//! reject further price/quantity modification.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// RoundSent applier
pub struct RoundSentApplier;

impl EventApplier for RoundSentApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::RoundSent { instance_ids, .. } = &event.payload {
            for item in snapshot.items.iter_mut() {
                if instance_ids.contains(&item.instance_id) {
                    item.sent = true;
                }
            }

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}
