//! Price bound parsing and rand formatting.
//!
//! Bounds arrive as formatted currency strings (`"R 15,000"`). Every
//! non-digit character is stripped before the remainder is read as a whole
//! number. A bound with no digits, or too many to represent, degrades to `0`.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::selection::is_unconstrained_value;

/// Parses a formatted price bound. Returns `None` when the bound is
/// unconstrained (`"Any"` or blank).
#[must_use]
pub fn parse_price_bound(raw: &str) -> Option<Decimal> {
    if is_unconstrained_value(raw) {
        return None;
    }

    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        tracing::warn!(bound = raw, "price bound has no digits, treating as 0");
        return Some(Decimal::ZERO);
    }

    match Decimal::from_str(&digits) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(bound = raw, error = %e, "price bound out of range, treating as 0");
            Some(Decimal::ZERO)
        }
    }
}

/// Formats an amount the way bounds are written in the storefront:
/// `R 15,000`. Cents are rounded half away from zero.
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let whole = rounded.abs().to_u128().unwrap_or_default().to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-R {grouped}")
    } else {
        format!("R {grouped}")
    }
}
