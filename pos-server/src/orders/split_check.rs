//! Split-check calculation - per-seat bill breakdown
//!
//! Read-only and advisory: the breakdown is computed fresh on every
//! query and never persisted. Payment recording operates against the
//! order-level balance, not per-seat amounts; a caller paying "this
//! seat's share" passes that seat's amount to the payment endpoint.

use crate::orders::money::{round_money, to_decimal, to_f64};
use rust_decimal::Decimal;
use shared::order::{OrderItemSnapshot, SplitCheckEntry};
use std::collections::BTreeMap;

/// Group items by seat assignment. Items without a seat land in a
/// distinct unassigned bucket, appended after all seat entries. The
/// entry amounts always sum to the pre-discount item subtotal.
pub fn compute_split_check(items: &[OrderItemSnapshot], decimal_places: u32) -> Vec<SplitCheckEntry> {
    let mut seats: BTreeMap<u32, (usize, Decimal)> = BTreeMap::new();
    let mut unassigned: Option<(usize, Decimal)> = None;

    for item in items {
        let total = to_decimal(item.line_total);
        match item.seat {
            Some(seat) => {
                let entry = seats.entry(seat).or_insert((0, Decimal::ZERO));
                entry.0 += 1;
                entry.1 += total;
            }
            None => {
                let entry = unassigned.get_or_insert((0, Decimal::ZERO));
                entry.0 += 1;
                entry.1 += total;
            }
        }
    }

    let mut entries: Vec<SplitCheckEntry> = seats
        .into_iter()
        .map(|(seat, (count, amount))| SplitCheckEntry {
            seat: Some(seat),
            item_count: count,
            person_amount: to_f64(round_money(amount, decimal_places)),
        })
        .collect();

    if let Some((count, amount)) = unassigned {
        entries.push(SplitCheckEntry {
            seat: None,
            item_count: count,
            person_amount: to_f64(round_money(amount, decimal_places)),
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(seat: Option<u32>, line_total: f64) -> OrderItemSnapshot {
        OrderItemSnapshot {
            instance_id: uuid::Uuid::new_v4().to_string(),
            product_id: "p1".to_string(),
            name: "Test".to_string(),
            quantity: 1,
            unit_price: line_total,
            line_total,
            round: 1,
            seat,
            urgent: false,
            note: None,
            sent: false,
            created_at: 0,
        }
    }

    #[test]
    fn test_split_check_sums_to_subtotal_with_unassigned_bucket() {
        // seat 1: 2000, seat 2: 3000, unassigned: 500
        let items = vec![
            item(Some(1), 2000.0),
            item(Some(2), 3000.0),
            item(None, 500.0),
        ];
        let entries = compute_split_check(&items, 2);

        assert_eq!(entries.len(), 3);
        let sum: f64 = entries.iter().map(|e| e.person_amount).sum();
        assert_eq!(sum, 5500.0);

        let unassigned: Vec<_> = entries.iter().filter(|e| e.seat.is_none()).collect();
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].item_count, 1);
        assert_eq!(unassigned[0].person_amount, 500.0);
    }

    #[test]
    fn test_split_check_unassigned_entry_comes_last() {
        let items = vec![item(None, 5.0), item(Some(3), 10.0), item(Some(1), 7.0)];
        let entries = compute_split_check(&items, 2);
        assert_eq!(entries[0].seat, Some(1));
        assert_eq!(entries[1].seat, Some(3));
        assert_eq!(entries[2].seat, None);
    }

    #[test]
    fn test_split_check_counts_items_per_seat() {
        let items = vec![
            item(Some(1), 4.0),
            item(Some(1), 6.0),
            item(Some(2), 9.0),
        ];
        let entries = compute_split_check(&items, 2);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].item_count, 2);
        assert_eq!(entries[0].person_amount, 10.0);
        assert_eq!(entries[1].item_count, 1);
    }

    #[test]
    fn test_split_check_empty_order() {
        let entries = compute_split_check(&[], 2);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_split_check_never_merges_unassigned_into_a_seat() {
        // A real seat 0 and the unassigned bucket stay distinct
        let items = vec![item(Some(0), 12.0), item(None, 8.0)];
        let entries = compute_split_check(&items, 2);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].seat, Some(0));
        assert_eq!(entries[0].person_amount, 12.0);
        assert_eq!(entries[1].seat, None);
        assert_eq!(entries[1].person_amount, 8.0);
    }
}
