//! Fixed-point price and quantity utilities.
//!
//! ## Overview
//!
//! Prices and quantities are stored as u64 scaled by 10^8. Book arithmetic
//! (comparisons, fills) stays in integers; anything that multiplies a price
//! by a quantity goes through `rust_decimal` so the ledger never sees a float.
//!
//! ## Examples
//!
//! ```
//! use matchcore::types::price::{to_fixed, from_fixed};
//!
//! let price = to_fixed("50000.12345678").unwrap();
//! assert_eq!(price, 5_000_012_345_678);
//! assert_eq!(from_fixed(price), "50000.12345678");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Scaling factor for fixed-point arithmetic: 10^8
pub const SCALE: u64 = 100_000_000;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to fixed-point u64
///
/// Returns `None` if parsing fails or the value is negative or out of range.
///
/// # Example
///
/// ```
/// use matchcore::types::price::to_fixed;
///
/// assert_eq!(to_fixed("1.0"), Some(100_000_000));
/// assert_eq!(to_fixed("0.00000001"), Some(1));
/// assert_eq!(to_fixed("-1"), None);
/// ```
pub fn to_fixed(s: &str) -> Option<u64> {
    let decimal = Decimal::from_str(s).ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a Decimal to fixed-point u64, rounding to 8 places
///
/// Returns `None` if the value is negative or out of range.
pub fn decimal_to_fixed(d: Decimal) -> Option<u64> {
    if d.is_sign_negative() && !d.is_zero() {
        return None;
    }
    let scaled = d.checked_mul(Decimal::from(SCALE))?;
    scaled.round_dp(0).to_u64()
}

/// Convert fixed-point u64 to a Decimal
pub fn fixed_to_decimal(value: u64) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

/// Convert fixed-point u64 to a string with 8 decimal places
///
/// ```
/// use matchcore::types::price::from_fixed;
///
/// assert_eq!(from_fixed(100_000_000), "1.00000000");
/// ```
pub fn from_fixed(value: u64) -> String {
    format!("{:.8}", fixed_to_decimal(value))
}

/// `price × quantity` for two fixed-point values, in real units
pub fn notional(price: u64, quantity: u64) -> Decimal {
    fixed_to_decimal(price) * fixed_to_decimal(quantity)
}

/// Mid price of two fixed-point prices, rounded down to the tick
pub fn mid(bid: u64, ask: u64) -> u64 {
    bid / 2 + ask / 2 + (bid % 2 + ask % 2) / 2
}

// ============================================================================
// Unit Tests
// ============================================================================
