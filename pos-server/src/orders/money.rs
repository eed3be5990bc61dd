//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` for storage/serialization. Rounding precision comes from the
//! order's currency configuration (frozen at table open), never from a
//! hard-coded constant, so zero-decimal currencies work unchanged.

use crate::orders::traits::OrderError;
use rust_decimal::prelude::*;
use shared::order::{
    DiscountKind, DiscountRequest, ItemChanges, OrderItemInput, OrderSnapshot, PaymentInput,
};

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price per item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: i32 = 9999;
/// Maximum allowed payment amount
const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

/// Currency minor-unit precision
#[derive(Debug, Clone, Copy)]
pub struct CurrencyConfig {
    /// Number of decimal places for monetary rounding (2 for EUR/USD,
    /// 0 for zero-decimal currencies)
    pub decimal_places: u32,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self { decimal_places: 2 }
    }
}

/// Convert f64 to Decimal (non-finite values become zero; inputs are
/// validated before any arithmetic, so this is a conversion, not a check)
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal back to f64 for storage/serialization
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Round to the currency's minor-unit precision, half away from zero
pub fn round_money(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Line total for an item: quantity × unit_price, rounded
pub fn line_total(quantity: i32, unit_price: f64, decimal_places: u32) -> f64 {
    let total = Decimal::from(quantity) * to_decimal(unit_price);
    to_f64(round_money(total, decimal_places))
}

/// Payment sufficiency check with money tolerance
pub fn is_payment_sufficient(paid: f64, total: f64) -> bool {
    to_decimal(paid) >= to_decimal(total) - MONEY_TOLERANCE
}

/// VAT portion of a VAT-inclusive total, for display
pub fn vat_amount(total: f64, vat_rate: f64, decimal_places: u32) -> f64 {
    if vat_rate <= 0.0 {
        return 0.0;
    }
    let total = to_decimal(total);
    let rate = to_decimal(vat_rate);
    let vat = total * rate / (Decimal::ONE_HUNDRED + rate);
    to_f64(round_money(vat, decimal_places))
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(OrderError::Validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate an OrderItemInput before processing
pub fn validate_item(item: &OrderItemInput) -> Result<(), OrderError> {
    if item.name.trim().is_empty() {
        return Err(OrderError::Validation("item name must not be empty".into()));
    }

    require_finite(item.unit_price, "unit_price")?;
    if item.unit_price < 0.0 {
        return Err(OrderError::Validation(format!(
            "unit_price must be non-negative, got {}",
            item.unit_price
        )));
    }
    if item.unit_price > MAX_PRICE {
        return Err(OrderError::Validation(format!(
            "unit_price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, item.unit_price
        )));
    }

    if item.quantity <= 0 {
        return Err(OrderError::Validation(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(OrderError::Validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, item.quantity
        )));
    }

    if let Some(round) = item.round
        && round == 0
    {
        return Err(OrderError::Validation(
            "round numbers start at 1".to_string(),
        ));
    }

    Ok(())
}

/// Validate item changes (from ModifyItem command)
pub fn validate_item_changes(changes: &ItemChanges) -> Result<(), OrderError> {
    if let Some(q) = changes.quantity {
        if q <= 0 {
            return Err(OrderError::Validation(format!(
                "quantity must be positive, got {}",
                q
            )));
        }
        if q > MAX_QUANTITY {
            return Err(OrderError::Validation(format!(
                "quantity exceeds maximum allowed ({}), got {}",
                MAX_QUANTITY, q
            )));
        }
    }

    if let Some(p) = changes.unit_price {
        require_finite(p, "unit_price")?;
        if p < 0.0 {
            return Err(OrderError::Validation(format!(
                "unit_price must be non-negative, got {}",
                p
            )));
        }
        if p > MAX_PRICE {
            return Err(OrderError::Validation(format!(
                "unit_price exceeds maximum allowed ({}), got {}",
                MAX_PRICE, p
            )));
        }
    }

    Ok(())
}

/// Validate a PaymentInput before processing
pub fn validate_payment(payment: &PaymentInput) -> Result<(), OrderError> {
    require_finite(payment.amount, "payment amount")?;
    if payment.amount <= 0.0 {
        return Err(OrderError::Validation(format!(
            "payment amount must be positive, got {}",
            payment.amount
        )));
    }
    if payment.amount > MAX_PAYMENT_AMOUNT {
        return Err(OrderError::Validation(format!(
            "payment amount exceeds maximum allowed ({}), got {}",
            MAX_PAYMENT_AMOUNT, payment.amount
        )));
    }
    Ok(())
}

/// Validate the shape of a discount request
pub fn validate_discount_request(request: &DiscountRequest) -> Result<(), OrderError> {
    match request.kind {
        DiscountKind::Percentage => {
            let value = request.value.ok_or_else(|| {
                OrderError::Validation("percentage discount requires a value".to_string())
            })?;
            require_finite(value, "discount value")?;
            if !(0.0 < value && value <= 100.0) {
                return Err(OrderError::Validation(format!(
                    "discount percentage must be in (0, 100], got {}",
                    value
                )));
            }
        }
        DiscountKind::FixedAmount => {
            let value = request.value.ok_or_else(|| {
                OrderError::Validation("fixed amount discount requires a value".to_string())
            })?;
            require_finite(value, "discount value")?;
            if value <= 0.0 {
                return Err(OrderError::Validation(format!(
                    "discount amount must be positive, got {}",
                    value
                )));
            }
        }
        DiscountKind::Coupon => {
            let code_ok = request
                .coupon_code
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty());
            if !code_ok {
                return Err(OrderError::Validation(
                    "coupon discount requires a coupon code".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Discount amount for a given base, never exceeding the base.
///
/// `coupon_value` is the amount resolved by the coupon validator and only
/// read for `Coupon` discounts.
pub fn discount_amount(
    kind: DiscountKind,
    value: Option<f64>,
    coupon_value: Option<f64>,
    base: Decimal,
    decimal_places: u32,
) -> Decimal {
    let raw = match kind {
        DiscountKind::Percentage => {
            base * to_decimal(value.unwrap_or(0.0)) / Decimal::ONE_HUNDRED
        }
        DiscountKind::FixedAmount => to_decimal(value.unwrap_or(0.0)),
        DiscountKind::Coupon => to_decimal(coupon_value.unwrap_or(0.0)),
    };
    round_money(raw.min(base).max(Decimal::ZERO), decimal_places)
}

/// Recalculate subtotal, discount amount, and total from the item list
/// and the stored discount spec.
///
/// The discount spec (not a pre-computed total) is the source of truth:
/// a percentage discount is re-derived against the current subtotal, so
/// items added after discounting keep the totals consistent and repeated
/// recalculation never compounds.
pub fn recalculate_totals(snapshot: &mut OrderSnapshot) {
    let dp = snapshot.currency_decimals;

    let mut subtotal = Decimal::ZERO;
    for item in &snapshot.items {
        subtotal += to_decimal(item.line_total);
    }
    let subtotal = round_money(subtotal, dp);
    snapshot.subtotal = to_f64(subtotal);

    let discount_dec = match &snapshot.discount {
        Some(info) => discount_amount(info.kind, info.value, Some(info.amount), subtotal, dp),
        None => Decimal::ZERO,
    };
    if let Some(info) = &mut snapshot.discount {
        info.amount = to_f64(discount_dec);
    }

    let total = (subtotal - discount_dec).max(Decimal::ZERO);
    snapshot.total = to_f64(round_money(total, dp));
}
