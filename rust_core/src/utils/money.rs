//! Price rounding helpers.
//!
//! Quotes are carried as `f64` dollars; every value that leaves the crate is
//! rounded to the nearest cent so the `change` / `changePercent` relation holds
//! to two decimals regardless of which provider produced it.

/// Round a dollar amount to the nearest cent
#[inline]
pub fn round_to_cents(dollars: f64) -> f64 {
    (dollars * 100.0).round() / 100.0
}

/// Percentage move of `change` relative to `reference`.
///
/// A non-positive reference has no meaningful percentage and yields 0.
#[inline]
pub fn percent_change(change: f64, reference: f64) -> f64 {
    if reference <= 0.0 {
        return 0.0;
    }
    change / reference * 100.0
}
