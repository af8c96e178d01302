//! Money utilities using rust_decimal for precision
//!
//! Amounts are exact `Decimal` values end to end. The store keeps them as
//! decimal TEXT, so nothing here rounds: fractional cents survive every
//! round trip and every sum.

use rust_decimal::prelude::*;

/// Percent divisor for commission rates
const PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// Treat a missing amount as zero
#[inline]
pub fn or_zero(value: Option<Decimal>) -> Decimal {
    value.unwrap_or(Decimal::ZERO)
}

/// Canonical text form stored in money columns
///
/// Trailing zeros are stripped so `10.50` and `10.5` store identically.
pub fn to_stored(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Parse a money column
///
/// `NULL` stays `None`. Text that is not a decimal is logged and treated as
/// missing (zero for every sum) rather than failing the whole read.
pub fn from_stored(value: Option<&str>, column: &str) -> Option<Decimal> {
    let text = value?.trim();
    if text.is_empty() {
        return None;
    }
    match Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)) {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::error!(column, value = text, error = %e, "Unparseable money value, treating as missing");
            None
        }
    }
}

/// Commission on an owed amount at a percentage rate
///
/// `commission(1000, 27) == 270`. No rounding is applied; presentation
/// decides how many places to show.
pub fn commission(owed: Decimal, rate_percent: Decimal) -> Decimal {
    owed * rate_percent / PERCENT
}
