//! RoundRenamed event applier
//!
//! Stores the label override for a round number. Item membership is
//! never touched by a rename.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// RoundRenamed applier
pub struct RoundRenamedApplier;

impl EventApplier for RoundRenamedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::RoundRenamed { round, label, .. } = &event.payload {
            snapshot.round_labels.insert(*round, label.clone());

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}
