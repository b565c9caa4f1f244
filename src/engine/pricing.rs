use chrono::{NaiveDate, NaiveTime};

use crate::model::Money;

// ── Pricing rules ─────────────────────────────────────────────────
//
// The one place duration and total arithmetic lives. The quote endpoint
// and the tests both go through here, so the estimate a client sees and
// the numbers this crate asserts on cannot drift apart.

/// Price estimate for a prospective booking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quote {
    Hourly { hours: u32, total: Money },
    Daily { days: u32, total: Money },
}

/// Whole hours billed for a time range: the fractional span rounded up,
/// never negative.
pub fn billable_hours(start: NaiveTime, end: NaiveTime) -> u32 {
    let span_minutes = end.signed_duration_since(start).num_minutes();
    if span_minutes <= 0 {
        return 0;
    }
    (span_minutes as u64).div_ceil(60) as u32
}

/// Whole days billed for a closed date range — both endpoint dates count,
/// and a same-day range still bills one day.
pub fn billable_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let diff = end.signed_duration_since(start).num_days();
    (diff + 1).max(1) as u32
}

/// Hourly totals round up to the next whole currency unit.
pub fn hourly_total(hours: u32, rate: Money) -> Money {
    (f64::from(hours) * rate).ceil()
}

pub fn daily_total(days: u32, rate: Money) -> Money {
    f64::from(days) * rate
}
