use crate::error::{AppError, AppResult};

/// Resolve the rate to snapshot into a new booking. A vehicle without a
/// positive per-day rate cannot be booked; that is the broker's
/// misconfiguration, not the renter's, so it gets its own error category.
pub fn snapshot_rate(price_per_day: Option<f64>) -> AppResult<f64> {
    match price_per_day {
        Some(rate) if rate > 0.0 => Ok(rate),
        _ => Err(AppError::MisconfiguredListing(
            "Vehicle has no valid per-day rate".to_string(),
        )),
    }
}

/// Total rental price: days * rate. Computed once at creation and frozen.
pub fn total_price(price_per_day: f64, days: i64) -> f64 {
    days as f64 * price_per_day
}
