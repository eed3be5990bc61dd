//! ItemModified event applier
//!
//! Applies field changes to a single item and recalculates totals when
//! the change affects money.

use crate::orders::money::{self, line_total};
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemModified applier
pub struct ItemModifiedApplier;

impl EventApplier for ItemModifiedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemModified {
            instance_id,
            changes,
            ..
        } = &event.payload
        {
            let decimals = snapshot.currency_decimals;
            let mut money_changed = false;

            if let Some(item) = snapshot
                .items
                .iter_mut()
                .find(|i| i.instance_id == *instance_id)
            {
                if let Some(quantity) = changes.quantity {
                    item.quantity = quantity;
                    money_changed = true;
                }
                if let Some(unit_price) = changes.unit_price {
                    item.unit_price = unit_price;
                    money_changed = true;
                }
                if let Some(seat) = changes.seat {
                    item.seat = Some(seat);
                }
                if let Some(urgent) = changes.urgent {
                    item.urgent = urgent;
                }
                if let Some(ref note) = changes.note {
                    item.note = Some(note.clone());
                }

                if money_changed {
                    item.line_total = line_total(item.quantity, item.unit_price, decimals);
                }
            }

            if money_changed {
                money::recalculate_totals(snapshot);
            }

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}
